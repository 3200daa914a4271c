//! Constants for the back-office onboarding API and the wizard rules.
//!
//! Contains the default base URL, environment variable names, holder and
//! allocation limits, and the product whitelists used by the cascade rules.
//! These are used internally by [`BackofficeClient`](crate::client::BackofficeClient)
//! and the draft reducer, but are also exported for advanced usage.

// ---------------------------------------------------------------------------
// Base URLs and environment
// ---------------------------------------------------------------------------

/// Default base URL for the back-office REST API.
pub const API_BASE_URL: &str = "http://localhost:8080/api";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "BACKOFFICE_BASE_URL";

/// Environment variable holding the bearer token.
pub const ENV_ACCESS_TOKEN: &str = "BACKOFFICE_ACCESS_TOKEN";

/// Environment variable overriding the request timeout (seconds).
pub const ENV_TIMEOUT_SECS: &str = "BACKOFFICE_TIMEOUT_SECS";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Draft limits
// ---------------------------------------------------------------------------

/// Maximum number of holders on a `JOINT` application.
pub const MAX_JOINT_HOLDERS: usize = 3;

/// Date format used by every date field in the draft and on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Products that require `capitalCommitment` and `currency`.
///
/// Selecting any other product clears both fields.
pub const COMMITMENT_PRODUCTS: &[&str] = &["AIF", "PE", "VC"];

/// Products that carry drawdown (capital-call) terms.
pub const DRAWDOWN_PRODUCTS: &[&str] = &["AIF", "PE"];

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

/// Full allocation of a portfolio snapshot, in percent.
pub const FULL_ALLOCATION: i64 = 100;

/// Decimal places kept for every weightage and every weightage sum.
pub const WEIGHTAGE_SCALE: u32 = 2;

/// Minimum ISIN length before a reference lookup is attempted.
pub const MIN_ISIN_LOOKUP_LEN: usize = 3;
