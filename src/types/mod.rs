//! Request and response types for the back-office API.
//!
//! This module contains the strongly-typed structs used for serializing
//! requests and deserializing responses across every endpoint the onboarding
//! core consumes.
//!
//! ## Organization
//!
//! - [`enums`]: Shared enumerations (holding mode, document types, etc.)
//! - [`investor`]: Investor and holder lookups, person snapshots
//! - [`bank`]: Investor-scoped bank accounts
//! - [`market_list`]: Security reference entries
//! - [`holdings`]: Holdings listing, update and bulk-create types
//! - [`kyc`]: KYC document upload responses
//! - [`onboarding`]: The composite onboarding submission payload
//!
//! All enums are re-exported at the module root via `pub use enums::*`.

pub mod bank;
pub mod enums;
pub mod holdings;
pub mod investor;
pub mod kyc;
pub mod market_list;
pub mod onboarding;

pub use enums::*;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// The `{ "data": ... }` envelope most endpoints wrap their payload in.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Deserialize a percentage that may arrive as a JSON number, a numeric
/// string, or garbage. Anything unparsable becomes `None`.
pub(crate) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => Decimal::try_from(n).ok(),
        Some(Raw::Text(s)) => s.trim().parse::<Decimal>().ok(),
        Some(Raw::Other(_)) | None => None,
    })
}
