//! Timestamped pricing snapshots for the persistence layer.

use serde::Serialize;
use uuid::Uuid;

use super::{calculate, Channel, CostInputs, PricingError, PricingResult};

/// A computed result together with what produced it and when.
///
/// The record is built in one step from validated inputs, so a stored record
/// never holds a half-computed result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingRecord {
    pub id: Uuid,
    pub channel: Channel,
    pub inputs: CostInputs,
    pub selling_price: f64,
    pub result: PricingResult,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

impl PricingRecord {
    /// Compute the result and stamp it with a fresh id and the current time.
    pub fn capture(
        inputs: CostInputs,
        channel: Channel,
        selling_price: f64,
    ) -> Result<Self, PricingError> {
        let result = calculate(&inputs, channel, selling_price)?;
        Ok(Self {
            id: Uuid::new_v4(),
            channel,
            inputs,
            selling_price,
            result,
            recorded_at: chrono::Utc::now(),
        })
    }
}
