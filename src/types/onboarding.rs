#![allow(missing_docs)]
//! Composite onboarding submission types.
//!
//! The payload is assembled from a validated draft by
//! [`assemble_payload`](crate::draft::submit::assemble_payload); its
//! top-level keys double as the first segment of every draft field path.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::enums::*;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Request body for `POST /onboarding`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingPayload {
    pub investment: InvestmentPayload,
    pub customer_profile: CustomerProfilePayload,
    pub portfolio_account: PortfolioAccountPayload,
    pub demat_account: Option<DematAccountPayload>,
    pub bank_account: Option<BankAccountPayload>,
    pub internal_mapping: InternalMappingPayload,
    pub holders: Vec<HolderPayload>,
    pub nominees: Vec<NomineePayload>,
    pub kyc_documents: Vec<KycDocumentRef>,
    pub drawdown: Option<DrawdownPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPayload {
    pub product_id: String,
    pub amc_id: String,
    pub scheme_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub capital_commitment: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inception_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investor_code: Option<String>,
    pub residential_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAccountPayload {
    pub holding_mode: HoldingMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DematAccountPayload {
    pub depository: Depository,
    pub dp_id: String,
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<String>,
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalMappingPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_manager_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianPayload {
    pub name: String,
    pub relationship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderPayload {
    pub name: String,
    pub pan: String,
    pub dob: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    pub address: AddressPayload,
    pub is_minor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian: Option<GuardianPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NomineePayload {
    pub name: String,
    pub relationship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    pub is_minor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian: Option<GuardianPayload>,
}

/// A KYC document already uploaded, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KycDocumentRef {
    pub holder_index: usize,
    pub document_type: DocumentType,
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownPayload {
    pub schedule: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_due_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Acknowledgement returned once the application is created.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingReceipt {
    pub id: String,
    pub investment_id: Option<String>,
    pub status: Option<String>,
}
