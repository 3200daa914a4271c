#![allow(missing_docs)]
//! Portfolio holdings types: listing, in-place update and bulk creation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::enums::SecurityType;
use crate::types::lenient_decimal;

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

/// A persisted holding of an investment's portfolio snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(alias = "id")]
    pub holding_id: String,
    #[serde(default)]
    pub isin_code: String,
    pub security_type: Option<SecurityType>,
    /// Percent of the portfolio; `None` when the server value did not parse.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub portfolio_weightage: Option<Decimal>,
    pub market_list_id: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub category: Option<String>,
}

/// Response of `GET /investments/{id}/holdings`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsSnapshot {
    pub holdings_as_on_date: Option<NaiveDate>,
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

// ---------------------------------------------------------------------------
// Update existing
// ---------------------------------------------------------------------------

/// One changed holding in an update request. Only edited fields are sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingUpdate {
    pub holding_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isin_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_type: Option<SecurityType>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub portfolio_weightage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_list_id: Option<String>,
}

/// Request body for `PUT /investments/{id}/holdings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHoldingsRequest {
    pub holdings_as_on_date: NaiveDate,
    pub holdings: Vec<HoldingUpdate>,
}

// ---------------------------------------------------------------------------
// Bulk create
// ---------------------------------------------------------------------------

/// A new holding to persist. `market_list_id` is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHoldingPayload {
    pub isin_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_type: Option<SecurityType>,
    #[serde(with = "rust_decimal::serde::float")]
    pub portfolio_weightage: Decimal,
    pub market_list_id: String,
}

/// Request body for `POST /investments/{id}/holdings/bulk`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateHoldingsRequest {
    pub holdings_as_on_date: NaiveDate,
    pub holdings: Vec<NewHoldingPayload>,
}
