//! Advisory module - qualitative AI guidance on top of the pricing engine.
//!
//! # Key Concepts
//! - Use case: one kind of question (competitive pricing, material prices,
//!   input parsing, market price check), each with its own prompt and schema
//! - Validation: every reply is parsed against its schema before a caller
//!   sees it
//! - Entitlement: advisory calls cost money and are only made for entitled
//!   callers
//!
//! This layer knows nothing about costs or margins. Callers compute those
//! first and merge the advice into their own output.

pub mod prompts;
pub mod schema;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::llm::{AiResponse, FallbackChain, FallbackError, ProviderId};
use prompts::Prompt;
pub use prompts::{
    CompetitivePricingParams, MarketPriceParams, MaterialPriceParams, ParseInputParams,
    SavedProduct,
};
pub use schema::{
    parse_response, AdvisorySchema, AdvisorySuggestion, Confidence, MarketPriceReport,
    MaterialPriceAdvice, ParsedInput, SchemaError,
};

/// Why an advisory call produced no usable advice.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdvisoryError {
    #[error("advisory features require an active subscription")]
    NotEntitled,

    #[error("invalid advisory request: {0}")]
    InvalidRequest(String),

    /// No provider answered.
    #[error(transparent)]
    Providers(#[from] FallbackError),

    /// A provider answered, but not in the requested shape.
    #[error("{provider} returned unusable advice: {source}")]
    ResponseParse {
        provider: ProviderId,
        #[source]
        source: SchemaError,
    },
}

impl AdvisoryError {
    /// Stable machine-readable name, so callers can tell "no advice" from
    /// "unusable advice".
    pub fn kind(&self) -> &'static str {
        match self {
            AdvisoryError::NotEntitled => "not_entitled",
            AdvisoryError::InvalidRequest(_) => "invalid_request",
            AdvisoryError::Providers(FallbackError::AllProvidersFailed { .. }) => {
                "all_providers_failed"
            }
            AdvisoryError::ResponseParse { .. } => "response_parse",
        }
    }
}

/// Validated advice and the provider that gave it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice<T> {
    pub data: T,
    pub provider: ProviderId,
}

impl<T> From<Result<Advice<T>, AdvisoryError>> for AiResponse<T> {
    fn from(result: Result<Advice<T>, AdvisoryError>) -> Self {
        match result {
            Ok(advice) => AiResponse::ok(advice.data, advice.provider),
            Err(e) => AiResponse::failed(e.to_string()),
        }
    }
}

/// One advisory question, tagged by use case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "use_case", content = "params", rename_all = "snake_case")]
pub enum AdvisoryRequest {
    CompetitivePricing(CompetitivePricingParams),
    MaterialPrices(MaterialPriceParams),
    ParseInput(ParseInputParams),
    MarketPrice(MarketPriceParams),
}

/// Validated answer to an [`AdvisoryRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdvisoryOutcome {
    CompetitivePricing(AdvisorySuggestion),
    MaterialPrices(MaterialPriceAdvice),
    ParseInput(ParsedInput),
    MarketPrice(MarketPriceReport),
}

/// Entry point for all advisory use cases.
#[derive(Clone)]
pub struct Advisor {
    chain: Arc<FallbackChain>,
}

impl Advisor {
    pub fn new(chain: Arc<FallbackChain>) -> Self {
        Self { chain }
    }

    /// Provider at each tier of the underlying chain.
    pub fn providers(&self) -> [ProviderId; 3] {
        self.chain.providers()
    }

    /// Competitive pricing advice for a product with a known cost floor.
    pub async fn competitive_pricing(
        &self,
        entitled: bool,
        params: &CompetitivePricingParams,
    ) -> Result<Advice<AdvisorySuggestion>, AdvisoryError> {
        check_entitled(entitled)?;
        check_amount("minimum_price", params.minimum_price)?;
        check_text("product_description", &params.product_description)?;
        check_text("craft_category", &params.craft_category)?;
        self.ask(prompts::competitive_pricing(params)).await
    }

    /// Cheaper suppliers for one material.
    pub async fn material_prices(
        &self,
        entitled: bool,
        params: &MaterialPriceParams,
    ) -> Result<Advice<MaterialPriceAdvice>, AdvisoryError> {
        check_entitled(entitled)?;
        check_text("material_name", &params.material_name)?;
        check_amount("current_price", params.current_price)?;
        self.ask(prompts::material_prices(params)).await
    }

    /// Turn a free-text request into quantity, product and dimensions.
    ///
    /// A match against a product id the user never saved is rejected.
    pub async fn parse_input(
        &self,
        entitled: bool,
        params: &ParseInputParams,
    ) -> Result<Advice<ParsedInput>, AdvisoryError> {
        check_entitled(entitled)?;
        check_text("user_input", &params.user_input)?;

        let advice: Advice<ParsedInput> = self.ask(prompts::parse_input(params)).await?;
        if let Some(id) = &advice.data.matched_product_id {
            if !params.saved_products.iter().any(|p| &p.id == id) {
                return Err(AdvisoryError::ResponseParse {
                    provider: advice.provider,
                    source: SchemaError {
                        schema: ParsedInput::NAME,
                        reason: format!("matchedProductId `{}` is not a saved product", id),
                    },
                });
            }
        }
        Ok(advice)
    }

    /// Current market price for a tracked material.
    pub async fn market_price(
        &self,
        entitled: bool,
        params: &MarketPriceParams,
    ) -> Result<Advice<MarketPriceReport>, AdvisoryError> {
        check_entitled(entitled)?;
        check_text("material_name", &params.material_name)?;
        self.ask(prompts::market_price(params)).await
    }

    /// Dispatch any use case.
    pub async fn call_advisory(
        &self,
        entitled: bool,
        request: &AdvisoryRequest,
    ) -> Result<Advice<AdvisoryOutcome>, AdvisoryError> {
        fn wrap<T>(
            advice: Advice<T>,
            f: impl FnOnce(T) -> AdvisoryOutcome,
        ) -> Advice<AdvisoryOutcome> {
            Advice {
                data: f(advice.data),
                provider: advice.provider,
            }
        }

        Ok(match request {
            AdvisoryRequest::CompetitivePricing(p) => wrap(
                self.competitive_pricing(entitled, p).await?,
                AdvisoryOutcome::CompetitivePricing,
            ),
            AdvisoryRequest::MaterialPrices(p) => wrap(
                self.material_prices(entitled, p).await?,
                AdvisoryOutcome::MaterialPrices,
            ),
            AdvisoryRequest::ParseInput(p) => wrap(
                self.parse_input(entitled, p).await?,
                AdvisoryOutcome::ParseInput,
            ),
            AdvisoryRequest::MarketPrice(p) => wrap(
                self.market_price(entitled, p).await?,
                AdvisoryOutcome::MarketPrice,
            ),
        })
    }

    async fn ask<T: AdvisorySchema>(&self, prompt: Prompt) -> Result<Advice<T>, AdvisoryError> {
        let completion = self.chain.complete(&prompt.user, &prompt.system).await?;

        match parse_response::<T>(&completion.text) {
            Ok(data) => Ok(Advice {
                data,
                provider: completion.provider,
            }),
            Err(source) => {
                tracing::warn!(
                    provider = %completion.provider,
                    schema = T::NAME,
                    "Discarding advisory reply: {}",
                    source.reason
                );
                Err(AdvisoryError::ResponseParse {
                    provider: completion.provider,
                    source,
                })
            }
        }
    }
}

fn check_entitled(entitled: bool) -> Result<(), AdvisoryError> {
    if entitled {
        Ok(())
    } else {
        Err(AdvisoryError::NotEntitled)
    }
}

fn check_text(field: &str, value: &str) -> Result<(), AdvisoryError> {
    if value.trim().is_empty() {
        return Err(AdvisoryError::InvalidRequest(format!("`{}` is required", field)));
    }
    Ok(())
}

fn check_amount(field: &str, value: f64) -> Result<(), AdvisoryError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AdvisoryError::InvalidRequest(format!(
            "`{}` must be a non-negative number",
            field
        )));
    }
    Ok(())
}
