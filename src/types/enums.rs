//! Shared enum types that map directly to back-office API string values.
//!
//! Variant names use `SCREAMING_SNAKE_CASE` to match the JSON wire format
//! expected by the API, so we suppress the Rust naming convention lint.
#![allow(non_camel_case_types)]

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Holding Mode
// ---------------------------------------------------------------------------

/// How an investment account is held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldingMode {
    /// Exactly one holder.
    #[default]
    SINGLE,
    /// One primary and up to two joint holders.
    JOINT,
}

impl HoldingMode {
    /// Maximum number of holders this mode permits.
    pub fn max_holders(self) -> usize {
        match self {
            Self::SINGLE => 1,
            Self::JOINT => crate::constants::MAX_JOINT_HOLDERS,
        }
    }
}

// ---------------------------------------------------------------------------
// Document Type
// ---------------------------------------------------------------------------

/// KYC document slot type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    PAN,
    ADDRESS_PROOF,
    BANK_PROOF,
    OTHERS,
}

impl DocumentType {
    /// Every slot type, in display order.
    pub const ALL: [DocumentType; 4] = [Self::PAN, Self::ADDRESS_PROOF, Self::BANK_PROOF, Self::OTHERS];

    /// Map a server `documentType` value onto a slot.
    ///
    /// Matching ignores case and any non-alphanumeric characters, so
    /// `"addressProof"`, `"ADDRESS_PROOF"` and `"address-proof"` all land in
    /// [`ADDRESS_PROOF`](Self::ADDRESS_PROOF). Unrecognized values fall back
    /// to [`OTHERS`](Self::OTHERS) and are logged.
    pub fn from_server(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "pan" => Self::PAN,
            "addressproof" => Self::ADDRESS_PROOF,
            "bankproof" => Self::BANK_PROOF,
            "others" => Self::OTHERS,
            _ => {
                tracing::warn!(document_type = raw, "unrecognized document type, filing under OTHERS");
                Self::OTHERS
            }
        }
    }

    /// The value sent to the server for this slot.
    pub fn as_server_str(self) -> &'static str {
        match self {
            Self::PAN => "pan",
            Self::ADDRESS_PROOF => "addressProof",
            Self::BANK_PROOF => "bankProof",
            Self::OTHERS => "others",
        }
    }

    /// Segment used in field paths (`kycDocuments.0.PAN`).
    pub fn path_key(self) -> &'static str {
        match self {
            Self::PAN => "PAN",
            Self::ADDRESS_PROOF => "ADDRESS_PROOF",
            Self::BANK_PROOF => "BANK_PROOF",
            Self::OTHERS => "OTHERS",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_key())
    }
}

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    MALE,
    FEMALE,
    OTHER,
}

impl Gender {
    /// Lenient parse used when normalizing party records.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Some(Self::MALE),
            "F" | "FEMALE" => Some(Self::FEMALE),
            "O" | "OTHER" | "OTHERS" | "TRANSGENDER" => Some(Self::OTHER),
            _ => None,
        }
    }

    /// Wire value, also used as the draft's form text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MALE => "MALE",
            Self::FEMALE => "FEMALE",
            Self::OTHER => "OTHER",
        }
    }
}

// ---------------------------------------------------------------------------
// Bank Account Type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    SAVINGS,
    CURRENT,
    NRE,
    NRO,
}

// ---------------------------------------------------------------------------
// Depository
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Depository {
    NSDL,
    CDSL,
}

impl Depository {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NSDL" => Some(Self::NSDL),
            "CDSL" => Some(Self::CDSL),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Security Type
// ---------------------------------------------------------------------------

/// Instrument class of a portfolio holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityType {
    EQUITY,
    DEBT,
    MUTUAL_FUND,
    ETF,
    OTHER,
}
