//! # wealth-onboard
//!
//! Client-side core of a wealth-management back office: the multi-step
//! onboarding wizard for a new investment and the holdings reconciliation
//! of an investment's portfolio snapshot.
//!
//! - [`draft`]: the draft application, its reducer, validation and submission
//! - [`identity`]: investor and holder resolution by unique code or PAN
//! - [`holdings`]: weightage reconciliation and security reference linking
//! - [`kyc`]: batch KYC document intake with partial-failure handling
//! - [`api`] / [`client`]: the REST client behind the [`gateway`] traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use wealth_onboard::BackofficeClient;
//! use wealth_onboard::draft::{DraftAction, Wizard};
//!
//! #[tokio::main]
//! async fn main() -> wealth_onboard::Result<()> {
//!     let client = BackofficeClient::new("your-access-token")?;
//!     let mut wizard = Wizard::default();
//!     wizard.dispatch(DraftAction::SetField {
//!         path: "customerProfile.investorCode".into(),
//!         value: "MA0001".into(),
//!     });
//!     wizard.resolve_holder(&client, 0).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod constants;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod holdings;
pub mod identity;
pub mod kyc;
pub mod types;

/// Re-export the main client type at crate root for convenience.
pub use client::BackofficeClient;
/// Re-export the error type and Result alias.
pub use error::{OnboardError, Result};
