#![allow(missing_docs)]
//! Investor and holder lookup types.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Person snapshot
// ---------------------------------------------------------------------------

/// A postal address attached to a party record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(alias = "pinCode", alias = "zip")]
    pub pincode: Option<String>,
    pub country: Option<String>,
}

/// A party record as returned by the identity endpoints.
///
/// Returned by `GET /holders/by-pan/{pan}` and nested as `primaryPerson` in
/// the investor lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSnapshot {
    pub id: Option<String>,
    #[serde(alias = "fullName")]
    pub name: Option<String>,
    #[serde(alias = "panNumber")]
    pub pan: Option<String>,
    #[serde(alias = "dateOfBirth")]
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "mobileNumber", alias = "phone")]
    pub mobile: Option<String>,
    #[serde(default)]
    pub addresses: Vec<AddressRecord>,
    #[serde(default)]
    pub is_minor: bool,
    pub guardian_name: Option<String>,
    pub guardian_pan: Option<String>,
    pub guardian_relationship: Option<String>,
    pub guardian_dob: Option<String>,
    pub guardian_mobile: Option<String>,
}

// ---------------------------------------------------------------------------
// Investor lookup
// ---------------------------------------------------------------------------

/// Investor-level record returned by `GET /investors/by-unique-id/{code}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorRecord {
    pub id: String,
    pub residential_status: Option<String>,
    pub sub_status: Option<String>,
    pub myalt_code: Option<String>,
    pub primary_person: Option<PersonSnapshot>,
}
