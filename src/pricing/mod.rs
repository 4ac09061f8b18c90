//! Pricing module - the deterministic unit-economics engine.
//!
//! # Key Concepts
//! - Fees: per-channel marketplace fee formulas, all affine in price
//! - Cost: materials + labor + overhead, resolved against a price into profit
//! - Solver: closed-form inversion of the profit equation for a target margin
//! - Materials: bill-of-materials totals feeding the materials cost
//! - Monitor: evaluation of reported market prices for tracked materials
//! - Record: timestamped snapshot handed to persistence
//!
//! Everything here is pure and synchronous. Nothing is cached; every result
//! is recomputed from its inputs.

pub mod cost;
pub mod fees;
pub mod materials;
pub mod monitor;
pub mod record;
pub mod solver;

pub use cost::{calculate, CostBreakdown, CostInputs, PricingResult};
pub use fees::{compare_fees, AmazonCategory, Channel, FeeComparison, FeeSchedule};
pub use materials::{MaterialBill, MaterialLine};
pub use monitor::{evaluate_price_check, PriceCheck, PriceMovement, TrackedMaterial};
pub use record::PricingRecord;
pub use solver::{psychological_price, solve_optimal_price, OptimalPrice, DEFAULT_TARGET_MARGIN};

/// Errors raised by the deterministic engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    /// A cost input, price or margin was negative, NaN or infinite.
    #[error("invalid input `{field}`: {reason}")]
    Input { field: &'static str, reason: String },

    /// No finite positive price reaches the target margin on this channel.
    #[error(
        "no price reaches a {target_margin}% margin on {channel}: fee rate {fee_rate} leaves nothing to solve for"
    )]
    UnsolvablePrice {
        channel: &'static str,
        target_margin: f64,
        fee_rate: f64,
    },
}

impl PricingError {
    /// Stable machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::Input { .. } => "invalid_input",
            PricingError::UnsolvablePrice { .. } => "unsolvable_price",
        }
    }

    pub(crate) fn input(field: &'static str, reason: impl Into<String>) -> Self {
        PricingError::Input {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject a derived amount that overflowed to infinity or NaN.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, PricingError> {
    if !value.is_finite() {
        return Err(PricingError::input(field, "result is out of range"));
    }
    Ok(value)
}

/// Reject negative and non-finite amounts.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, PricingError> {
    if !value.is_finite() {
        return Err(PricingError::input(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(PricingError::input(
            field,
            format!("must not be negative (got {})", value),
        ));
    }
    Ok(value)
}
