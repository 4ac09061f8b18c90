//! Price monitoring for tracked materials.
//!
//! A reported market price raises an alert when it moves more than 10% from
//! the recorded price, and replaces the recorded price when it moves more
//! than 5%.

use serde::{Deserialize, Serialize};

use super::{ensure_non_negative, PricingError};

const ALERT_THRESHOLD: f64 = 0.10;
const UPDATE_THRESHOLD: f64 = 0.05;

/// A material whose supplier price is being watched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedMaterial {
    pub name: String,
    pub category: String,
    pub current_price: f64,
    /// Price the maker is waiting for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMovement {
    PriceDrop,
    PriceIncrease,
    Unchanged,
}

/// Outcome of comparing a reported price against the recorded one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceCheck {
    pub material_name: String,
    pub previous_price: f64,
    pub new_price: f64,
    pub price_difference: f64,
    pub movement: PriceMovement,
    pub is_alert: bool,
    pub should_update: bool,
    pub target_reached: bool,
}

/// Evaluate a freshly reported price for a tracked material.
pub fn evaluate_price_check(
    material: &TrackedMaterial,
    new_price: f64,
) -> Result<PriceCheck, PricingError> {
    let previous = ensure_non_negative("current_price", material.current_price)?;
    let new_price = ensure_non_negative("new_price", new_price)?;
    if let Some(target) = material.target_price {
        ensure_non_negative("target_price", target)?;
    }

    let difference = new_price - previous;
    let movement = if difference < 0.0 {
        PriceMovement::PriceDrop
    } else if difference > 0.0 {
        PriceMovement::PriceIncrease
    } else {
        PriceMovement::Unchanged
    };

    Ok(PriceCheck {
        material_name: material.name.clone(),
        previous_price: previous,
        new_price,
        price_difference: difference,
        movement,
        is_alert: difference.abs() > previous * ALERT_THRESHOLD,
        should_update: difference.abs() > previous * UPDATE_THRESHOLD,
        target_reached: material
            .target_price
            .map_or(false, |target| target > 0.0 && new_price <= target),
    })
}
