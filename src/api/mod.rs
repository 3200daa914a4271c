//! REST API endpoint implementations.
//!
//! Each sub-module adds high-level `async` methods to
//! [`BackofficeClient`](crate::client::BackofficeClient) via `impl` blocks.
//! All methods handle JSON serialization, HTTP transport, and error mapping
//! automatically.
//!
//! ## Usage
//!
//! ```no_run
//! use wealth_onboard::BackofficeClient;
//!
//! # #[tokio::main]
//! # async fn main() -> wealth_onboard::Result<()> {
//! let client = BackofficeClient::new("token")?;
//! let investor = client.get_investor_by_unique_id("MA0001").await?;
//! let reference = client.lookup_by_isin("INE002A01018").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Endpoints | Description |
//! |---|---|---|
//! | [`investors`] | 2 | Investor and holder identity lookups |
//! | [`bank_accounts`] | 1 | Investor-scoped bank accounts |
//! | [`market_list`] | 3 | Security reference lookup, create, update |
//! | [`holdings`] | 3 | Holdings snapshot, update, bulk create |
//! | [`kyc`] | 2 | Single and batch KYC uploads |
//! | [`onboarding`] | 1 | Final application submission |

pub mod bank_accounts;
pub mod holdings;
pub mod investors;
pub mod kyc;
pub mod market_list;
pub mod onboarding;
