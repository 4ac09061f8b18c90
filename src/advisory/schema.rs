//! Expected JSON shapes for advisory replies, and the validator that
//! enforces them.
//!
//! A reply is accepted whole or rejected whole. Missing fields, wrongly typed
//! fields, negative amounts and inverted ranges are all parse errors; nothing
//! is filled in with a default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A reply did not match the schema it was asked for.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{schema} reply rejected: {reason}")]
pub struct SchemaError {
    pub schema: &'static str,
    pub reason: String,
}

/// A typed advisory reply with a literal description of its JSON shape.
pub trait AdvisorySchema: DeserializeOwned {
    const NAME: &'static str;

    /// JSON shape embedded verbatim in the prompt.
    const SHAPE: &'static str;

    /// Semantic checks beyond what the types enforce.
    fn check(&self) -> Result<(), String>;
}

/// Parse raw model output into `T`.
pub fn parse_response<T: AdvisorySchema>(raw: &str) -> Result<T, SchemaError> {
    let reject = |reason: String| SchemaError {
        schema: T::NAME,
        reason,
    };

    let json = extract_json_object(raw).ok_or_else(|| reject("no JSON object in reply".into()))?;
    let parsed: T = serde_json::from_str(json).map_err(|e| reject(e.to_string()))?;
    parsed.check().map_err(reject)?;
    Ok(parsed)
}

/// Locate the JSON object in a reply.
///
/// Models often wrap the object in a Markdown fence or a sentence of prose;
/// only the outermost `{ ... }` span is kept.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn amount(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("`{}` must be a non-negative number, got {}", field, value));
    }
    Ok(())
}

fn non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("`{}` must not be empty", field));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Competitive pricing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Competitive pricing advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorySuggestion {
    pub suggestions: Vec<String>,
    pub price_range: PriceRange,
    pub insights: Vec<String>,
}

impl AdvisorySchema for AdvisorySuggestion {
    const NAME: &'static str = "competitive pricing";
    const SHAPE: &'static str = r#"{
  "suggestions": ["string", "string", "string"],
  "priceRange": { "min": number, "max": number, "average": number },
  "insights": ["string", "string"]
}"#;

    fn check(&self) -> Result<(), String> {
        let range = &self.price_range;
        amount("priceRange.min", range.min)?;
        amount("priceRange.max", range.max)?;
        amount("priceRange.average", range.average)?;
        if range.min > range.max {
            return Err(format!("priceRange.min {} exceeds max {}", range.min, range.max));
        }
        if range.average < range.min || range.average > range.max {
            return Err(format!(
                "priceRange.average {} lies outside [{}, {}]",
                range.average, range.min, range.max
            ));
        }
        if self.suggestions.is_empty() {
            return Err("`suggestions` must not be empty".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Material price discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSuggestion {
    pub supplier: String,
    pub price: f64,
    pub savings: f64,
    pub quality_notes: String,
    pub shipping_notes: String,
}

/// Cheaper suppliers for a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPriceAdvice {
    pub found_better_price: bool,
    pub suggestions: Vec<SupplierSuggestion>,
    pub total_potential_savings: f64,
}

impl AdvisorySchema for MaterialPriceAdvice {
    const NAME: &'static str = "material price discovery";
    const SHAPE: &'static str = r#"{
  "foundBetterPrice": boolean,
  "suggestions": [
    {
      "supplier": "string",
      "price": number,
      "savings": number,
      "qualityNotes": "string",
      "shippingNotes": "string"
    }
  ],
  "totalPotentialSavings": number
}"#;

    fn check(&self) -> Result<(), String> {
        amount("totalPotentialSavings", self.total_potential_savings)?;
        for (i, s) in self.suggestions.iter().enumerate() {
            non_empty(&format!("suggestions[{}].supplier", i), &s.supplier)?;
            amount(&format!("suggestions[{}].price", i), s.price)?;
            amount(&format!("suggestions[{}].savings", i), s.savings)?;
        }
        if self.found_better_price && self.suggestions.is_empty() {
            return Err("foundBetterPrice is true but no suggestions were given".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Natural-language input parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Structured reading of a free-text material request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInput {
    pub quantity: f64,
    pub product_type: String,
    pub matched_product_id: Option<String>,
    pub dimensions: Option<String>,
    pub confidence: Confidence,
}

impl AdvisorySchema for ParsedInput {
    const NAME: &'static str = "input parsing";
    const SHAPE: &'static str = r#"{
  "quantity": number,
  "productType": "string",
  "matchedProductId": "string or null",
  "dimensions": "string or null",
  "confidence": "high" | "medium" | "low"
}"#;

    fn check(&self) -> Result<(), String> {
        amount("quantity", self.quantity)?;
        non_empty("productType", &self.product_type)
    }
}

// ---------------------------------------------------------------------------
// Market price check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRange {
    pub min: f64,
    pub max: f64,
}

/// Current market price for a tracked material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPriceReport {
    pub current_price: f64,
    pub price_range: MarketRange,
    pub suppliers: Vec<String>,
    pub notes: String,
}

impl AdvisorySchema for MarketPriceReport {
    const NAME: &'static str = "market price check";
    const SHAPE: &'static str = r#"{
  "currentPrice": number,
  "priceRange": { "min": number, "max": number },
  "suppliers": ["string", "string"],
  "notes": "string"
}"#;

    fn check(&self) -> Result<(), String> {
        amount("currentPrice", self.current_price)?;
        amount("priceRange.min", self.price_range.min)?;
        amount("priceRange.max", self.price_range.max)?;
        if self.price_range.min > self.price_range.max {
            return Err(format!(
                "priceRange.min {} exceeds max {}",
                self.price_range.min, self.price_range.max
            ));
        }
        Ok(())
    }
}
