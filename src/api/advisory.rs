//! API endpoints for AI pricing advice.
//!
//! Every response carries the `{success, data?, error?, provider?}` envelope.
//! Failures add a `kind` tag so callers can tell a missing entitlement from
//! an exhausted provider chain or an unusable reply.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::advisory::{
    Advice, AdvisoryError, AdvisoryOutcome, AdvisoryRequest, AdvisorySuggestion,
    CompetitivePricingParams, MarketPriceParams, MarketPriceReport, MaterialPriceAdvice,
    MaterialPriceParams, ParseInputParams, ParsedInput,
};
use crate::llm::AiResponse;
use crate::pricing::{
    calculate, solve_optimal_price, Channel, CostInputs, MaterialBill, MaterialLine,
    OptimalPrice, PricingError, PricingResult, DEFAULT_TARGET_MARGIN,
};

use super::routes::AppState;

/// Header set by the billing layer in front of this service.
pub const ENTITLEMENT_HEADER: &str = "x-entitled";

/// Create the advisory API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(dispatch))
        .route("/competitive", post(competitive))
        .route("/materials", post(materials))
        .route("/parse", post(parse))
        .route("/market-price", post(market_price))
}

/// Advisory envelope plus the failure kind, when there is one.
#[derive(Debug, Serialize)]
pub struct AdvisoryEnvelope<T> {
    #[serde(flatten)]
    pub response: AiResponse<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl<T> AdvisoryEnvelope<T> {
    fn failed(kind: &'static str, error: impl Into<String>) -> Self {
        Self {
            response: AiResponse::failed(error),
            kind: Some(kind),
        }
    }
}

impl<T> From<Result<Advice<T>, AdvisoryError>> for AdvisoryEnvelope<T> {
    fn from(result: Result<Advice<T>, AdvisoryError>) -> Self {
        match result {
            Ok(advice) => Self {
                response: AiResponse::ok(advice.data, advice.provider),
                kind: None,
            },
            Err(e) => Self::failed(e.kind(), e.to_string()),
        }
    }
}

type Reply<T> = (StatusCode, Json<AdvisoryEnvelope<T>>);

fn status_for(e: &AdvisoryError) -> StatusCode {
    match e {
        AdvisoryError::NotEntitled => StatusCode::FORBIDDEN,
        AdvisoryError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdvisoryError::Providers(_) | AdvisoryError::ResponseParse { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

fn reply<T>(result: Result<Advice<T>, AdvisoryError>) -> Reply<T> {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(e),
    };
    (status, Json(result.into()))
}

fn reject<T>(e: AdvisoryError) -> Reply<T> {
    reply(Err(e))
}

fn reject_pricing<T>(e: PricingError) -> Reply<T> {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(AdvisoryEnvelope::failed(e.kind(), e.to_string())),
    )
}

fn entitled(headers: &HeaderMap) -> bool {
    headers
        .get(ENTITLEMENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AdvisoryRequest>,
) -> Reply<AdvisoryOutcome> {
    reply(state.advisor.call_advisory(entitled(&headers), &req).await)
}

async fn materials(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MaterialPriceParams>,
) -> Reply<MaterialPriceAdvice> {
    reply(state.advisor.material_prices(entitled(&headers), &req).await)
}

async fn parse(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ParseInputParams>,
) -> Reply<ParsedInput> {
    reply(state.advisor.parse_input(entitled(&headers), &req).await)
}

async fn market_price(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MarketPriceParams>,
) -> Reply<MarketPriceReport> {
    reply(state.advisor.market_price(entitled(&headers), &req).await)
}

/// Cost inputs plus the product context the advice is about.
#[derive(Debug, Deserialize)]
pub struct CompetitiveRequest {
    #[serde(flatten)]
    pub inputs: CostInputs,
    #[serde(flatten)]
    pub channel: Channel,
    #[serde(default)]
    pub target_margin: Option<f64>,
    pub product_description: String,
    pub craft_category: String,
    /// Listed in the prompt; `materials_cost` stays authoritative for the math.
    #[serde(default)]
    pub materials: Vec<MaterialLine>,
}

/// Deterministic pricing merged with the advice given for it.
#[derive(Debug, Serialize)]
pub struct CompetitiveResponse {
    pub pricing: OptimalPrice,
    pub advice: AdvisoryEnvelope<AdvisorySuggestion>,
    /// Unit economics if the product sold at the reported market average.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_market_average: Option<PricingResult>,
}

/// The engine prices the product first; the advisor only comments on it.
/// A failed advisory call still returns the computed price.
async fn competitive(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CompetitiveRequest>,
) -> Result<Json<CompetitiveResponse>, Reply<AdvisorySuggestion>> {
    let is_entitled = entitled(&headers);
    if !is_entitled {
        return Err(reject(AdvisoryError::NotEntitled));
    }

    let target = req.target_margin.unwrap_or(DEFAULT_TARGET_MARGIN);
    let pricing =
        solve_optimal_price(&req.inputs, req.channel, target).map_err(reject_pricing)?;

    let materials = if req.materials.is_empty() {
        None
    } else {
        Some(MaterialBill::new(req.materials).map_err(reject_pricing)?.summary())
    };

    let params = CompetitivePricingParams {
        minimum_price: pricing.price,
        product_description: req.product_description,
        craft_category: req.craft_category,
        materials,
    };
    let result = state.advisor.competitive_pricing(is_entitled, &params).await;

    let at_market_average = match &result {
        Ok(advice) => calculate(&req.inputs, req.channel, advice.data.price_range.average).ok(),
        Err(e) => {
            tracing::warn!(kind = e.kind(), "Competitive advice unavailable: {}", e);
            None
        }
    };

    Ok(Json(CompetitiveResponse {
        pricing,
        advice: result.into(),
        at_market_average,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{FallbackError, ProviderId};

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AdvisoryError::NotEntitled), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&AdvisoryError::InvalidRequest("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&AdvisoryError::Providers(FallbackError::AllProvidersFailed {
                attempts: Vec::new()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_envelope_carries_kind() {
        let result: Result<Advice<String>, AdvisoryError> = Err(AdvisoryError::NotEntitled);
        let failed = AdvisoryEnvelope::from(result);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["kind"], "not_entitled");

        let result: Result<Advice<String>, AdvisoryError> = Ok(Advice {
            data: "fine".to_string(),
            provider: ProviderId::OpenAi,
        });
        let ok = AdvisoryEnvelope::from(result);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "data": "fine", "provider": "openai"})
        );
    }

    #[test]
    fn test_entitlement_header() {
        let mut headers = HeaderMap::new();
        assert!(!entitled(&headers));
        headers.insert(ENTITLEMENT_HEADER, "TRUE".parse().unwrap());
        assert!(entitled(&headers));
        headers.insert(ENTITLEMENT_HEADER, "no".parse().unwrap());
        assert!(!entitled(&headers));
    }
}
