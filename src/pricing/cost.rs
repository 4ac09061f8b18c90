//! Cost aggregation and profit resolution.

use serde::{Deserialize, Serialize};

use super::{ensure_finite, ensure_non_negative, Channel, PricingError};

/// Raw cost inputs for one unit of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub materials_cost: f64,
    pub labor_hours: f64,
    /// Hourly labor rate.
    pub labor_rate: f64,
    /// Overhead as a percentage of materials + labor (20 means 20%).
    pub overhead_percentage: f64,
}

impl CostInputs {
    /// Check every field is finite and non-negative.
    pub fn validate(&self) -> Result<(), PricingError> {
        ensure_non_negative("materials_cost", self.materials_cost)?;
        ensure_non_negative("labor_hours", self.labor_hours)?;
        ensure_non_negative("labor_rate", self.labor_rate)?;
        ensure_non_negative("overhead_percentage", self.overhead_percentage)?;
        Ok(())
    }

    /// Aggregate the inputs into a cost breakdown.
    pub fn breakdown(&self) -> Result<CostBreakdown, PricingError> {
        self.validate()?;

        let labor_cost = ensure_finite("labor_cost", self.labor_hours * self.labor_rate)?;
        // Overhead applies to materials + labor, never to the total.
        let subtotal = self.materials_cost + labor_cost;
        let overhead_cost =
            ensure_finite("overhead_cost", subtotal * (self.overhead_percentage / 100.0))?;

        Ok(CostBreakdown {
            materials_cost: self.materials_cost,
            labor_cost,
            overhead_cost,
            total_cost: ensure_finite("total_cost", subtotal + overhead_cost)?,
        })
    }
}

/// Per-unit cost before any sale happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub materials_cost: f64,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    pub total_cost: f64,
}

impl CostBreakdown {
    /// Resolve profit and margin for a sale at `price` on `channel`.
    pub fn resolve(&self, channel: Channel, price: f64) -> Result<PricingResult, PricingError> {
        ensure_non_negative("selling_price", price)?;

        let marketplace_fee = ensure_finite("marketplace_fee", channel.fee(price))?;
        let profit = ensure_finite("profit", price - self.total_cost - marketplace_fee)?;
        let profit_margin = if price > 0.0 {
            ensure_finite("profit_margin", profit / price * 100.0)?
        } else {
            0.0
        };

        Ok(PricingResult {
            labor_cost: self.labor_cost,
            overhead_cost: self.overhead_cost,
            total_cost: self.total_cost,
            marketplace_fee,
            profit,
            profit_margin,
        })
    }
}

/// Unit economics for one product, channel and price.
///
/// Always produced whole by [`calculate`]; there is no way to update a field
/// in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingResult {
    pub labor_cost: f64,
    pub overhead_cost: f64,
    pub total_cost: f64,
    pub marketplace_fee: f64,
    pub profit: f64,
    /// Profit as a percentage of price; 0 when the price is 0.
    pub profit_margin: f64,
}

/// Compute the full unit-economics breakdown.
pub fn calculate(
    inputs: &CostInputs,
    channel: Channel,
    price: f64,
) -> Result<PricingResult, PricingError> {
    inputs.breakdown()?.resolve(channel, price)
}
