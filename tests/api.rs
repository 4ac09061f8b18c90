use std::sync::Arc;

use async_trait::async_trait;
use craftmargin::advisory::Advisor;
use craftmargin::api::{router, AppState};
use craftmargin::llm::{Completion, FallbackChain, ProviderAdapter, ProviderError, ProviderId};
use craftmargin::Config;
use reqwest::StatusCode;
use serde_json::{json, Value};

const EPS: f64 = 1e-6;

/// Provider double: answers with a fixed reply, or fails with a 503.
struct Scripted {
    id: ProviderId,
    reply: Option<&'static str>,
}

#[async_trait]
impl ProviderAdapter for Scripted {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn call(&self, _prompt: &str, _system: &str) -> Result<Completion, ProviderError> {
        match self.reply {
            Some(text) => Ok(Completion {
                text: text.to_string(),
                provider: self.id,
            }),
            None => Err(ProviderError::Status {
                provider: self.id,
                status: 503,
                message: "overloaded".to_string(),
            }),
        }
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Tiers 1 and 2 always fail; tier 3 answers with `tier3_reply`, if any.
    async fn spawn(tier3_reply: Option<&'static str>) -> Self {
        let chain = FallbackChain::new(
            Arc::new(Scripted {
                id: ProviderId::DeepSeek,
                reply: None,
            }),
            Arc::new(Scripted {
                id: ProviderId::Gemini,
                reply: None,
            }),
            Arc::new(Scripted {
                id: ProviderId::OpenAi,
                reply: tier3_reply,
            }),
        );
        let state = Arc::new(AppState::new(
            Config::default(),
            Advisor::new(Arc::new(chain)),
        ));
        let app = router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn post(&self, path: &str, body: Value, entitled: bool) -> (StatusCode, Value) {
        let mut req = reqwest::Client::new()
            .post(format!("{}{}", self.base_url, path))
            .json(&body);
        if entitled {
            req = req.header("x-entitled", "true");
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        let text = res.text().await.unwrap();
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn candle_inputs() -> Value {
    // 20 materials + 2h at 15/h, 20% overhead => total cost 60
    json!({
        "materials_cost": 20.0,
        "labor_hours": 2.0,
        "labor_rate": 15.0,
        "overhead_percentage": 20.0,
    })
}

fn with(mut base: Value, extra: Value) -> Value {
    let obj = base.as_object_mut().unwrap();
    for (k, v) in extra.as_object().unwrap() {
        obj.insert(k.clone(), v.clone());
    }
    base
}

fn num(v: &Value) -> f64 {
    v.as_f64().unwrap_or_else(|| panic!("not a number: {}", v))
}

const GOOD_SUGGESTION: &str = r#"Sure! Here is the analysis:
```json
{
  "suggestions": ["Buy wax in bulk", "Offer a 3-pack", "Reuse jars"],
  "priceRange": { "min": 100, "max": 160, "average": 130 },
  "insights": ["Premium soy candles sell well above $100"]
}
```"#;

#[tokio::test]
async fn health_reports_provider_order() {
    let srv = TestServer::spawn(None).await;
    let res = reqwest::get(format!("{}/api/health", srv.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["providers"], json!(["deepseek", "gemini", "openai"]));
    assert_eq!(body["providers_configured"], 0);
}

#[tokio::test]
async fn calculate_on_etsy() {
    let srv = TestServer::spawn(None).await;
    let body = json!({
        "materials_cost": 5.0,
        "labor_hours": 0.5,
        "labor_rate": 10.0,
        "overhead_percentage": 0.0,
        "channel": "etsy",
        "selling_price": 20.0,
    });
    let (status, result) = srv.post("/api/pricing/calculate", body, false).await;

    assert_eq!(status, StatusCode::OK);
    assert!((num(&result["total_cost"]) - 10.0).abs() < EPS);
    assert!((num(&result["marketplace_fee"]) - 5.10).abs() < EPS);
    assert!((num(&result["profit"]) - 4.90).abs() < EPS);
    assert!((num(&result["profit_margin"]) - 24.5).abs() < EPS);
}

#[tokio::test]
async fn calculate_rejects_negative_input() {
    let srv = TestServer::spawn(None).await;
    let body = with(
        candle_inputs(),
        json!({"materials_cost": -1.0, "channel": "none", "selling_price": 10.0}),
    );
    let (status, msg) = srv.post("/api/pricing/calculate", body, false).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(msg.as_str().unwrap().contains("materials_cost"));
}

#[tokio::test]
async fn optimal_price_direct_sale() {
    let srv = TestServer::spawn(None).await;
    let body = with(candle_inputs(), json!({"channel": "none"}));
    let (status, solved) = srv.post("/api/pricing/optimal", body, false).await;

    assert_eq!(status, StatusCode::OK);
    assert!((num(&solved["target_margin"]) - 50.0).abs() < EPS);
    assert!((num(&solved["raw_price"]) - 120.0).abs() < EPS);
    assert!((num(&solved["price"]) - 119.99).abs() < EPS);
}

#[tokio::test]
async fn optimal_price_unsolvable_on_amazon_jewelry() {
    let srv = TestServer::spawn(None).await;
    let body = with(
        candle_inputs(),
        json!({"channel": "amazon", "category": "jewelry", "target_margin": 79.0}),
    );
    let (status, _) = srv.post("/api/pricing/optimal", body, false).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn fee_comparison() {
    let srv = TestServer::spawn(None).await;
    let (status, fees) = srv
        .post("/api/pricing/fees", json!({"price": 20.0}), false)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!((num(&fees["etsy"]) - 5.10).abs() < EPS);

    let (_, zero) = srv
        .post("/api/pricing/fees", json!({"price": 0.0}), false)
        .await;
    assert_eq!(num(&zero["amazon"]), 0.0);
}

#[tokio::test]
async fn record_has_id_and_timestamp() {
    let srv = TestServer::spawn(None).await;
    let body = with(
        candle_inputs(),
        json!({"channel": "shopify", "selling_price": 100.0}),
    );
    let (status, record) = srv.post("/api/pricing/record", body, false).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["channel"]["channel"], "shopify");
    assert!(record["id"].as_str().is_some());
    assert!(record["recorded_at"].as_str().is_some());
}

#[tokio::test]
async fn materials_total_and_monitor() {
    let srv = TestServer::spawn(None).await;
    let (status, bill) = srv
        .post(
            "/api/pricing/materials/total",
            json!({"materials": [
                {"name": "Soy wax", "quantity": 2.0, "unit": "lb", "cost_per_unit": 4.5},
                {"name": "Wick", "quantity": 1.0, "cost_per_unit": 0.25}
            ]}),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!((num(&bill["total_cost"]) - 9.25).abs() < EPS);

    let (status, check) = srv
        .post(
            "/api/pricing/monitor/evaluate",
            json!({
                "material": {"name": "Soy wax", "category": "Candles", "current_price": 10.0},
                "new_price": 8.5
            }),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["movement"], "price_drop");
    assert_eq!(check["is_alert"], true);
}

#[tokio::test]
async fn competitive_advice_falls_back_to_tier3() {
    let srv = TestServer::spawn(Some(GOOD_SUGGESTION)).await;
    let body = with(
        candle_inputs(),
        json!({
            "channel": "none",
            "product_description": "8oz soy candle",
            "craft_category": "Candles & Soap",
        }),
    );
    let (status, merged) = srv.post("/api/advisory/competitive", body, true).await;

    assert_eq!(status, StatusCode::OK);
    assert!((num(&merged["pricing"]["price"]) - 119.99).abs() < EPS);
    assert_eq!(merged["advice"]["success"], true);
    assert_eq!(merged["advice"]["provider"], "openai");
    assert_eq!(merged["advice"]["data"]["priceRange"]["average"], 130.0);
    assert!((num(&merged["at_market_average"]["profit"]) - 70.0).abs() < EPS);
}

#[tokio::test]
async fn competitive_keeps_pricing_when_advice_fails() {
    let srv = TestServer::spawn(None).await;
    let body = with(
        candle_inputs(),
        json!({
            "channel": "none",
            "product_description": "8oz soy candle",
            "craft_category": "Candles & Soap",
        }),
    );
    let (status, merged) = srv.post("/api/advisory/competitive", body, true).await;

    assert_eq!(status, StatusCode::OK);
    assert!((num(&merged["pricing"]["price"]) - 119.99).abs() < EPS);
    assert_eq!(merged["advice"]["success"], false);
    assert_eq!(merged["advice"]["kind"], "all_providers_failed");
    assert!(merged.get("at_market_average").is_none());
}

#[tokio::test]
async fn advisory_requires_entitlement() {
    let srv = TestServer::spawn(Some(GOOD_SUGGESTION)).await;
    let body = json!({"material_name": "Soy wax", "category": "Candles"});
    let (status, reply) = srv.post("/api/advisory/market-price", body, false).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(reply["success"], false);
    assert_eq!(reply["kind"], "not_entitled");
}

#[tokio::test]
async fn advisory_rejects_malformed_reply() {
    let srv = TestServer::spawn(Some("I think soy wax costs about $4 a pound.")).await;
    let body = json!({"material_name": "Soy wax", "category": "Candles"});
    let (status, reply) = srv.post("/api/advisory/market-price", body, true).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply["success"], false);
    assert_eq!(reply["kind"], "response_parse");
    assert!(reply.get("data").is_none());
}

#[tokio::test]
async fn advisory_all_providers_failed() {
    let srv = TestServer::spawn(None).await;
    let body = json!({
        "material_name": "Sterling wire",
        "current_supplier": "Rio Grande",
        "current_price": 1.25,
        "unit_type": "foot",
    });
    let (status, reply) = srv.post("/api/advisory/materials", body, true).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply["kind"], "all_providers_failed");
    assert_eq!(reply["error"], "all providers failed");
}

#[tokio::test]
async fn tagged_dispatch() {
    let srv = TestServer::spawn(Some(
        r#"{"quantity": 12, "productType": "candle", "matchedProductId": null, "dimensions": null, "confidence": "high"}"#,
    ))
    .await;
    let body = json!({
        "use_case": "parse_input",
        "params": {"user_input": "twelve candles", "saved_products": []}
    });
    let (status, reply) = srv.post("/api/advisory", body, true).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["provider"], "openai");
    assert_eq!(reply["data"]["quantity"], 12.0);
}
