//! Closed-form optimal price solver.
//!
//! With an affine fee `fee(p) = f0 + k*p` the margin equation can be inverted
//! directly: `p = base_cost / (1 - target/100 - k)`.

use serde::Serialize;

use super::{Channel, CostInputs, PricingError, PricingResult};

/// Margin target used when the caller does not name one.
pub const DEFAULT_TARGET_MARGIN: f64 = 50.0;

/// A solved price and the economics at the price actually quoted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalPrice {
    pub target_margin: f64,
    /// Proportional part of the channel fee used in the solve.
    pub fee_rate: f64,
    /// Closed-form solution before any rounding.
    pub raw_price: f64,
    /// `raw_price` after the psychological `.99` adjustment.
    pub price: f64,
    /// Unit economics evaluated at `price`.
    pub result: PricingResult,
}

/// Solve for the price that yields `target_margin` percent on `channel`.
pub fn solve_optimal_price(
    inputs: &CostInputs,
    channel: Channel,
    target_margin: f64,
) -> Result<OptimalPrice, PricingError> {
    if !target_margin.is_finite() {
        return Err(PricingError::input(
            "target_margin",
            "must be a finite number",
        ));
    }
    if target_margin >= 100.0 {
        return Err(PricingError::input(
            "target_margin",
            format!("must be below 100 (got {})", target_margin),
        ));
    }

    let breakdown = inputs.breakdown()?;
    let base_cost = breakdown.materials_cost + breakdown.labor_cost + breakdown.overhead_cost;
    let fee_rate = channel.schedule().rate;

    let denominator = 1.0 - target_margin / 100.0 - fee_rate;
    if denominator <= 0.0 {
        return Err(PricingError::UnsolvablePrice {
            channel: channel.id(),
            target_margin,
            fee_rate,
        });
    }

    let raw_price = base_cost / denominator;
    let price = psychological_price(raw_price);
    let result = breakdown.resolve(channel, price)?;

    tracing::debug!(
        channel = channel.id(),
        target_margin,
        raw_price,
        price,
        "Solved optimal price"
    );

    Ok(OptimalPrice {
        target_margin,
        fee_rate,
        raw_price,
        price,
        result,
    })
}

/// Tolerance under which a price counts as a whole number.
const WHOLE_EPSILON: f64 = 1e-9;

/// Round a price up to the next whole unit and drop a cent (`41.20 -> 41.99`).
///
/// Float noise such as `84.00000000000003` is snapped to the whole number
/// first so it does not push the price up a full unit. A zero price stays 0.
pub fn psychological_price(price: f64) -> f64 {
    let whole = price.round();
    let settled = if (price - whole).abs() < WHOLE_EPSILON {
        whole
    } else {
        price
    };
    if settled <= 0.0 {
        return 0.0;
    }
    settled.ceil() - 0.01
}
