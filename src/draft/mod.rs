//! Draft aggregate for the onboarding wizard.
//!
//! The draft is modelled as explicit state driven by tagged actions:
//!
//! - [`model`]: the draft application itself
//! - [`field`]: field paths, sections and the cascade table
//! - [`action`]: [`DraftAction`] and the transition function
//! - [`validate`]: field rules, as a pure selector
//! - [`submit`]: payload assembly and server-error mapping
//! - [`wizard`]: [`Wizard`], derived section status and async helpers
//!
//! ```
//! use wealth_onboard::draft::{DraftAction, Wizard};
//!
//! let mut wizard = Wizard::default();
//! wizard.dispatch(DraftAction::SetField {
//!     path: "investment.productId".into(),
//!     value: "PMS".into(),
//! });
//! assert_eq!(wizard.draft().investment.product_id, "PMS");
//! ```

pub mod action;
pub mod field;
pub mod model;
pub mod submit;
pub mod validate;
pub mod wizard;

pub use action::DraftAction;
pub use field::{FieldValue, Section};
pub use model::DraftApplication;
pub use wizard::{HolderKey, IdentityRequest, LeaveDecision, Phase, SectionStatus, Wizard};
