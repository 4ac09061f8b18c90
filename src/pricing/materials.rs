//! Bill of materials.

use serde::{Deserialize, Serialize};

use super::{ensure_non_negative, PricingError};

/// One material used to make a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub name: String,
    pub quantity: f64,
    /// Unit the quantity is measured in ("piece", "oz", ...).
    #[serde(default = "default_unit")]
    pub unit: String,
    pub cost_per_unit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

fn default_unit() -> String {
    "piece".to_string()
}

impl MaterialLine {
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.name.trim().is_empty() {
            return Err(PricingError::input("name", "material name is required"));
        }
        ensure_non_negative("quantity", self.quantity)?;
        ensure_non_negative("cost_per_unit", self.cost_per_unit)?;
        Ok(())
    }

    pub fn total_cost(&self) -> f64 {
        self.quantity * self.cost_per_unit
    }
}

/// Validated materials with their combined cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialBill {
    pub lines: Vec<MaterialLine>,
    pub total_cost: f64,
}

impl MaterialBill {
    /// Validate every line and sum their totals.
    pub fn new(lines: Vec<MaterialLine>) -> Result<Self, PricingError> {
        for line in &lines {
            line.validate()?;
        }
        let total_cost = lines.iter().map(MaterialLine::total_cost).sum();
        Ok(Self { lines, total_cost })
    }

    /// One line per material, as fed to advisory prompts.
    pub fn summary(&self) -> String {
        self.lines
            .iter()
            .map(|m| {
                format!(
                    "{}: {} {} at ${}/{} = ${}",
                    m.name,
                    m.quantity,
                    m.unit,
                    m.cost_per_unit,
                    m.unit,
                    m.total_cost()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
