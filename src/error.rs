//! Error types for the `wealth-onboard` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, OnboardError>`.
//!
//! [`OnboardError`] covers:
//! - **Validation errors**: field-path-scoped, block only their section
//! - **Weightage exceeded**: holdings allocation above 100 %
//! - **Unresolved references**: staged holdings without a market-list link
//! - **Partial batch failures**: some KYC documents were rejected
//! - **Identity not found**: a lookup missed (non-fatal)
//! - **Submission rejected**: server-side validation on final submit
//! - **Transport errors**: HTTP, status, JSON and URL failures

use std::fmt;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::kyc::FailedDocument;

/// A single field-level error reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorBody {
    /// Payload path of the offending field (e.g. `holders[0].pan`).
    #[serde(alias = "path")]
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

/// Error response returned by the back-office API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Application error code (e.g. "VALIDATION_FAILED").
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable summary.
    #[serde(default)]
    pub message: Option<String>,
    /// Field-level errors, if the server attributed any.
    #[serde(default)]
    pub errors: Vec<FieldErrorBody>,
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.code.as_deref().unwrap_or("UNKNOWN"),
            self.message.as_deref().unwrap_or("No message"),
        )?;
        if !self.errors.is_empty() {
            write!(f, " ({} field errors)", self.errors.len())?;
        }
        Ok(())
    }
}

/// All possible errors produced by the onboarding core and its client.
#[derive(Debug, thiserror::Error)]
pub enum OnboardError {
    /// One or more draft fields failed validation.
    #[error("validation failed on {} field(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<(String, String)>),

    /// Existing plus staged holdings allocate more than 100 %.
    #[error("total allocation {allocated:.2}% exceeds 100%")]
    WeightageExceeded {
        /// Combined stock and new weightage, rounded to 2 dp.
        allocated: Decimal,
    },

    /// Staged holdings, or persisted holdings with a replaced ISIN, have no
    /// linked security reference entry.
    #[error("{} holding(s) lack a security reference: {}", .isins.len(), .isins.join(", "))]
    UnresolvedReference {
        /// Internal row ids of the offending staged rows.
        row_ids: Vec<u64>,
        /// Persisted holdings whose replacement ISIN is unlinked.
        holding_ids: Vec<String>,
        /// The ISINs typed on those rows, staged rows first.
        isins: Vec<String>,
    },

    /// Some documents of a KYC batch were rejected.
    #[error("{} of {total} KYC document(s) failed", .failed.len())]
    PartialBatchFailure {
        /// Number of documents submitted.
        total: usize,
        /// Rejected documents with their reasons.
        failed: Vec<FailedDocument>,
    },

    /// No party record matches the identifier.
    #[error("no record found for {0}")]
    IdentityNotFound(String),

    /// The server rejected the final onboarding submission.
    #[error("submission rejected: {0}")]
    SubmissionRejected(ApiErrorBody),

    /// An error response returned by the REST API.
    #[error("API error: {0}")]
    Api(ApiErrorBody),

    /// The server returned an unexpected HTTP status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The response body text.
        body: String,
    },

    /// A network or transport-level error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to deserialize a JSON response body.
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error building or parsing a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The caller provided an invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl OnboardError {
    /// Whether the error came from the transport rather than from a rule.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Api(_) | Self::HttpStatus { .. } | Self::Http(_) | Self::Json(_) | Self::Url(_)
        )
    }
}

fn summarize(errors: &[(String, String)]) -> String {
    errors
        .iter()
        .map(|(path, msg)| format!("{path}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OnboardError>;
