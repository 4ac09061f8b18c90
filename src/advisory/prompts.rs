//! Prompt builders for each advisory use case.
//!
//! Every prompt ends with the literal JSON shape the validator will hold the
//! reply to, taken from the same [`AdvisorySchema::SHAPE`] constant.

use serde::{Deserialize, Serialize};

use super::schema::{
    AdvisorySchema, AdvisorySuggestion, MarketPriceReport, MaterialPriceAdvice, ParsedInput,
};

/// A `(system, user)` prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn json_instruction<T: AdvisorySchema>() -> String {
    format!(
        "Return ONLY a JSON object in this exact format, with every field present:\n{}",
        T::SHAPE
    )
}

/// Inputs for competitive pricing advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitivePricingParams {
    /// Lowest price that still covers costs, computed by the pricing engine.
    pub minimum_price: f64,
    pub product_description: String,
    pub craft_category: String,
    /// One line per material, if the caller has a bill of materials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<String>,
}

pub fn competitive_pricing(params: &CompetitivePricingParams) -> Prompt {
    let system = "You are a market analyst and pricing expert for handmade goods. \
Analyze the current market on Etsy and Shopify for the given product category and \
give pricing recommendations in JSON format."
        .to_string();

    let materials = params
        .materials
        .as_deref()
        .map(|m| format!("\nMaterials used:\n{}\n", m))
        .unwrap_or_default();

    let user = format!(
        "Based on a minimum retail price of ${:.2} for a {} in the {} category, analyze the current market.\n{}\n\
Please provide:\n\
1. 3 specific suggestions to improve pricing or reduce material costs\n\
2. Estimated market price range for comparable products\n\
3. Competitive analysis insights\n\n{}",
        params.minimum_price,
        params.product_description,
        params.craft_category,
        materials,
        json_instruction::<AdvisorySuggestion>()
    );

    Prompt { system, user }
}

/// Inputs for material price discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPriceParams {
    pub material_name: String,
    pub current_supplier: String,
    pub current_price: f64,
    pub unit_type: String,
}

pub fn material_prices(params: &MaterialPriceParams) -> Prompt {
    let system = "You are a procurement specialist helping handmade creators find better \
material prices. Search for alternative suppliers and compare prices."
        .to_string();

    let user = format!(
        "Find better prices for this material:\n\
- Material: {}\n\
- Current Supplier: {}\n\
- Current Price: ${} per {}\n\n\
Search for alternative suppliers and provide:\n\
1. Suggested suppliers with better prices\n\
2. Price comparison\n\
3. Potential savings\n\
4. Quality considerations\n\
5. Shipping cost factors\n\n{}",
        params.material_name,
        params.current_supplier,
        params.current_price,
        params.unit_type,
        json_instruction::<MaterialPriceAdvice>()
    );

    Prompt { system, user }
}

/// A product the user has saved, offered as a match candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProduct {
    pub id: String,
    pub product_name: String,
    pub craft_category: String,
}

/// Inputs for natural-language parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseInputParams {
    pub user_input: String,
    #[serde(default)]
    pub saved_products: Vec<SavedProduct>,
}

pub fn parse_input(params: &ParseInputParams) -> Prompt {
    let system = "You are an AI assistant helping users calculate material quantities. \
Parse the user's natural language input and match it with their saved products."
        .to_string();

    let products = if params.saved_products.is_empty() {
        "(none)".to_string()
    } else {
        params
            .saved_products
            .iter()
            .map(|p| format!("- [{}] {} ({})", p.id, p.product_name, p.craft_category))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let user = format!(
        "User input: \"{}\"\n\n\
User's saved products:\n{}\n\n\
Parse the input and return:\n\
1. Quantity requested\n\
2. Product type/name\n\
3. Matched product id from saved products (if any, else null)\n\
4. Dimensions (if provided, else null)\n\n{}",
        params.user_input,
        products,
        json_instruction::<ParsedInput>()
    );

    Prompt { system, user }
}

/// Inputs for a market price lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPriceParams {
    pub material_name: String,
    pub category: String,
}

pub fn market_price(params: &MarketPriceParams) -> Prompt {
    let system = "You are a market researcher tracking supply prices for handmade creators."
        .to_string();

    let user = format!(
        "Find the current market price for \"{}\" in the {} category.\n\
Include typical suppliers and the price range.\n\n{}",
        params.material_name,
        params.category,
        json_instruction::<MarketPriceReport>()
    );

    Prompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_competitive_prompt_embeds_shape_and_floor() {
        let prompt = competitive_pricing(&CompetitivePricingParams {
            minimum_price: 42.0,
            product_description: "soy candle".to_string(),
            craft_category: "Candles & Soap".to_string(),
            materials: Some("Wax: 2 piece at $3.5/piece = $7".to_string()),
        });
        assert!(prompt.user.contains("$42.00"));
        assert!(prompt.user.contains("soy candle"));
        assert!(prompt.user.contains("Wax: 2 piece"));
        assert!(prompt.user.contains(AdvisorySuggestion::SHAPE));
        assert!(prompt.system.contains("handmade"));
    }

    #[test]
    fn test_material_prompt() {
        let prompt = material_prices(&MaterialPriceParams {
            material_name: "Sterling wire".to_string(),
            current_supplier: "Rio Grande".to_string(),
            current_price: 1.25,
            unit_type: "foot".to_string(),
        });
        assert!(prompt.user.contains("Current Price: $1.25 per foot"));
        assert!(prompt.user.contains(MaterialPriceAdvice::SHAPE));
    }

    #[test]
    fn test_parse_prompt_lists_products() {
        let prompt = parse_input(&ParseInputParams {
            user_input: "twelve 8oz candles".to_string(),
            saved_products: vec![SavedProduct {
                id: "p-1".to_string(),
                product_name: "Lavender candle".to_string(),
                craft_category: "Candles & Soap".to_string(),
            }],
        });
        assert!(prompt.user.contains("- [p-1] Lavender candle (Candles & Soap)"));
        assert!(prompt.user.contains(ParsedInput::SHAPE));

        let empty = parse_input(&ParseInputParams {
            user_input: "x".to_string(),
            saved_products: Vec::new(),
        });
        assert!(empty.user.contains("(none)"));
    }

    #[test]
    fn test_market_prompt() {
        let prompt = market_price(&MarketPriceParams {
            material_name: "Soy wax".to_string(),
            category: "Candles & Soap".to_string(),
        });
        assert!(prompt.user.contains("\"Soy wax\""));
        assert!(prompt.user.contains(MarketPriceReport::SHAPE));
    }
}
