#![allow(missing_docs)]
//! Security reference ("market list") types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical metadata for an instrument, keyed by ISIN.
///
/// Returned by `GET /market-list/by-isin/{isin}` and by the create/update
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    pub id: String,
    #[serde(alias = "isinCode")]
    pub isin: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub category_id: Option<String>,
    #[serde(alias = "categoryName")]
    pub category: Option<String>,
}

/// Request body for creating or updating a reference entry.
///
/// Used by `POST /market-list` and `PUT /market-list/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntryRequest {
    pub isin: String,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub as_on_date: NaiveDate,
}
