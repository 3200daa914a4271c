//! Portfolio weightage arithmetic.
//!
//! Every weightage and every sum is rounded to [`WEIGHTAGE_SCALE`] decimal
//! places (half away from zero) before it is compared, so a sum that drifts
//! past 100 by less than half a hundredth still reads as 100.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{FULL_ALLOCATION, WEIGHTAGE_SCALE};
use crate::error::{OnboardError, Result};

/// Round to [`WEIGHTAGE_SCALE`] places and carry exactly that scale, so
/// `60` and `60.004` both display as `60.00`.
pub fn round_weightage(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(WEIGHTAGE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(WEIGHTAGE_SCALE);
    rounded
}

/// Parse a typed weightage. `None` for empty, non-numeric or negative input.
pub fn parse_weightage(raw: &str) -> Option<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|w| *w >= Decimal::ZERO)
        .map(round_weightage)
}

/// Parse-or-zero rule used for every sum.
pub fn weightage_or_zero(raw: &str) -> Decimal {
    parse_weightage(raw).unwrap_or(Decimal::ZERO)
}

/// Allocation of one portfolio snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightageSummary {
    /// Existing holdings, with in-progress edits applied.
    pub stock: Decimal,
    /// Staged, not yet persisted holdings.
    pub new: Decimal,
    /// `max(0, 100 − (stock + new))`; never entered directly.
    pub cash_equivalent: Decimal,
    /// `stock + new + cash_equivalent`; above 100 only when over-allocated.
    pub total: Decimal,
}

impl WeightageSummary {
    pub fn allocated(&self) -> Decimal {
        round_weightage(self.stock + self.new)
    }

    pub fn is_over_allocated(&self) -> bool {
        self.allocated() > Decimal::from(FULL_ALLOCATION)
    }

    /// Fails with [`OnboardError::WeightageExceeded`] when over-allocated.
    pub fn check(&self) -> Result<()> {
        if self.is_over_allocated() {
            return Err(OnboardError::WeightageExceeded {
                allocated: self.allocated(),
            });
        }
        Ok(())
    }
}

/// Compute the allocation of existing and staged weightages.
pub fn summarize<E, S>(existing: E, staged: S) -> WeightageSummary
where
    E: IntoIterator<Item = Decimal>,
    S: IntoIterator<Item = Decimal>,
{
    let stock = round_weightage(existing.into_iter().sum());
    let new = round_weightage(staged.into_iter().sum());
    let full = Decimal::from(FULL_ALLOCATION);
    let cash_equivalent = round_weightage((full - (stock + new)).max(Decimal::ZERO));

    WeightageSummary {
        stock,
        new,
        cash_equivalent,
        total: round_weightage(stock + new + cash_equivalent),
    }
}
