#![allow(missing_docs)]
//! The in-progress onboarding application.
//!
//! Every editable value is held as form text; parsing happens in
//! [`validate`](super::validate) and [`submit`](super::submit). An empty
//! string means "not entered".

use std::collections::BTreeMap;

use crate::types::enums::{AccountType, DocumentType, HoldingMode};
use crate::types::kyc::UploadedDocument;

/// Key of a KYC document slot.
pub type SlotKey = (usize, DocumentType);

#[derive(Debug, Clone, PartialEq)]
pub struct DraftApplication {
    pub investment: InvestmentTerms,
    pub customer_profile: CustomerProfile,
    pub holding_mode: HoldingMode,
    /// `holders[0]` is the primary holder; never empty.
    pub holders: Vec<Holder>,
    pub nominees: Vec<Nominee>,
    pub bank: BankSnapshot,
    pub demat: DematDetails,
    pub internal_mapping: InternalMapping,
    pub kyc_documents: BTreeMap<SlotKey, UploadedDocument>,
    pub drawdown: DrawdownTerms,
}

impl Default for DraftApplication {
    fn default() -> Self {
        Self {
            investment: InvestmentTerms::default(),
            customer_profile: CustomerProfile::default(),
            holding_mode: HoldingMode::SINGLE,
            holders: vec![Holder::default()],
            nominees: Vec::new(),
            bank: BankSnapshot::default(),
            demat: DematDetails::default(),
            internal_mapping: InternalMapping::default(),
            kyc_documents: BTreeMap::new(),
            drawdown: DrawdownTerms::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvestmentTerms {
    pub product_id: String,
    pub amc_id: String,
    pub scheme_id: String,
    pub currency: String,
    pub capital_commitment: String,
    pub fee_structure: String,
    pub inception_date: String,
}

/// Investor-level fields, distinct from any holder's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerProfile {
    pub investor_code: String,
    /// Set only by a successful primary resolution.
    pub investor_id: Option<String>,
    pub residential_status: String,
    pub sub_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guardian {
    pub name: String,
    pub pan: String,
    pub relationship: String,
    pub dob: String,
    pub mobile: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Holder {
    pub name: String,
    pub pan: String,
    pub dob: String,
    pub gender: String,
    pub email: String,
    pub mobile: String,
    pub address: Address,
    pub is_minor: bool,
    /// Kept while `is_minor` is off; only submitted when it is on.
    pub guardian: Guardian,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nominee {
    pub name: String,
    pub relationship: String,
    pub pan: String,
    pub dob: String,
    pub percentage: String,
    pub is_minor: bool,
    pub guardian: Guardian,
}

/// Denormalized copy of a selected bank account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankSnapshot {
    pub bank_account_id: Option<String>,
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub account_type: Option<AccountType>,
}

impl BankSnapshot {
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DematDetails {
    pub depository: String,
    pub dp_id: String,
    pub client_id: String,
}

impl DematDetails {
    pub fn is_blank(&self) -> bool {
        self.depository.is_empty() && self.dp_id.is_empty() && self.client_id.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternalMapping {
    pub relationship_manager_id: String,
    pub branch_code: String,
}

/// Capital-call terms; only submitted for drawdown products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawdownTerms {
    pub schedule: String,
    pub amount: String,
    pub percentage: String,
    pub first_due_date: String,
}

impl DraftApplication {
    /// Identifier the given holder is resolved by: the investor code for the
    /// primary holder, the PAN for joint holders.
    pub fn identity_key(&self, holder_index: usize) -> Option<&str> {
        if holder_index == 0 {
            Some(self.customer_profile.investor_code.trim())
        } else {
            self.holders.get(holder_index).map(|h| h.pan.trim())
        }
    }
}
