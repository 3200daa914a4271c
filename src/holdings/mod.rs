//! Holdings reconciliation for an investment's portfolio snapshot.
//!
//! - [`reconcile`]: weightage parsing, rounding and the allocation summary
//! - [`linker`]: ISIN to market-list reference resolution for holding rows
//! - [`editor`]: [`HoldingsEditor`], tying both to the two save operations
//!
//! ```
//! use chrono::NaiveDate;
//! use wealth_onboard::holdings::{HoldingField, HoldingsAction, HoldingsEditor, HoldingsEffect};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
//! let mut editor = HoldingsEditor::new("inv-1", date, Vec::new());
//! let HoldingsEffect::Staged(row_id) = editor.dispatch(HoldingsAction::StageHolding) else {
//!     unreachable!()
//! };
//! editor.dispatch(HoldingsAction::EditStaged {
//!     row_id,
//!     field: HoldingField::Weightage("60".into()),
//! });
//! assert_eq!(editor.summary().cash_equivalent.to_string(), "40.00");
//! ```

pub mod editor;
pub mod linker;
pub mod reconcile;

pub use editor::{HoldingEdit, HoldingField, HoldingsAction, HoldingsEditor, HoldingsEffect};
pub use linker::{LinkState, LinkedReference, LookupTarget, LookupTicket, ReferenceDetails, RowId, SecurityLinker, StagedHolding};
pub use reconcile::{WeightageSummary, summarize};
