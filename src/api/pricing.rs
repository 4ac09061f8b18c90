//! API endpoints for the deterministic pricing engine.

use std::sync::Arc;

use axum::{http::StatusCode, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::pricing::{
    self, compare_fees, evaluate_price_check, solve_optimal_price, AmazonCategory, Channel,
    CostInputs, FeeComparison, MaterialBill, MaterialLine, OptimalPrice, PriceCheck,
    PricingError, PricingRecord, PricingResult, TrackedMaterial, DEFAULT_TARGET_MARGIN,
};

use super::routes::AppState;

/// Create the pricing API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/calculate", post(calculate))
        .route("/optimal", post(optimal))
        .route("/fees", post(fees))
        .route("/record", post(record))
        .route("/materials/total", post(materials_total))
        .route("/monitor/evaluate", post(monitor_evaluate))
}

/// Cost inputs, channel and the price being evaluated.
///
/// The channel is given inline, e.g. `"channel": "amazon", "category": "jewelry"`.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    #[serde(flatten)]
    pub inputs: CostInputs,
    #[serde(flatten)]
    pub channel: Channel,
    pub selling_price: f64,
}

#[derive(Debug, Deserialize)]
pub struct OptimalRequest {
    #[serde(flatten)]
    pub inputs: CostInputs,
    #[serde(flatten)]
    pub channel: Channel,
    /// Percent; 50 when omitted.
    #[serde(default)]
    pub target_margin: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FeesRequest {
    pub price: f64,
    #[serde(default)]
    pub category: AmazonCategory,
}

#[derive(Debug, Deserialize)]
pub struct MaterialsRequest {
    pub materials: Vec<MaterialLine>,
}

#[derive(Debug, Serialize)]
pub struct MaterialsResponse {
    #[serde(flatten)]
    pub bill: MaterialBill,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct MonitorRequest {
    pub material: TrackedMaterial,
    pub new_price: f64,
}

pub(crate) fn unprocessable(e: PricingError) -> (StatusCode, String) {
    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
}

async fn calculate(
    Json(req): Json<CalculateRequest>,
) -> Result<Json<PricingResult>, (StatusCode, String)> {
    pricing::calculate(&req.inputs, req.channel, req.selling_price)
        .map(Json)
        .map_err(unprocessable)
}

async fn optimal(
    Json(req): Json<OptimalRequest>,
) -> Result<Json<OptimalPrice>, (StatusCode, String)> {
    let target = req.target_margin.unwrap_or(DEFAULT_TARGET_MARGIN);
    solve_optimal_price(&req.inputs, req.channel, target)
        .map(Json)
        .map_err(|e| {
            tracing::debug!(channel = req.channel.id(), "Optimal price rejected: {}", e);
            unprocessable(e)
        })
}

async fn fees(Json(req): Json<FeesRequest>) -> Result<Json<FeeComparison>, (StatusCode, String)> {
    if !req.price.is_finite() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "`price` must be a finite number".to_string(),
        ));
    }
    Ok(Json(compare_fees(req.price, req.category)))
}

async fn record(
    Json(req): Json<CalculateRequest>,
) -> Result<Json<PricingRecord>, (StatusCode, String)> {
    let record = PricingRecord::capture(req.inputs, req.channel, req.selling_price)
        .map_err(unprocessable)?;
    tracing::info!(
        record_id = %record.id,
        channel = record.channel.id(),
        "Captured pricing record"
    );
    Ok(Json(record))
}

async fn materials_total(
    Json(req): Json<MaterialsRequest>,
) -> Result<Json<MaterialsResponse>, (StatusCode, String)> {
    let bill = MaterialBill::new(req.materials).map_err(unprocessable)?;
    let summary = bill.summary();
    Ok(Json(MaterialsResponse { bill, summary }))
}

async fn monitor_evaluate(
    Json(req): Json<MonitorRequest>,
) -> Result<Json<PriceCheck>, (StatusCode, String)> {
    let check = evaluate_price_check(&req.material, req.new_price).map_err(unprocessable)?;
    if check.is_alert {
        tracing::info!(
            material = %check.material_name,
            previous = check.previous_price,
            new = check.new_price,
            "Material price moved past the alert threshold"
        );
    }
    Ok(Json(check))
}
