//! Router assembly and server bootstrap.

use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::advisory::Advisor;
use crate::config::Config;
use crate::llm::{FallbackChain, ProviderId};

use super::{advisory, pricing};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Gated access to the provider chain
    pub advisor: Advisor,
}

impl AppState {
    pub fn new(config: Config, advisor: Advisor) -> Self {
        Self { config, advisor }
    }
}

/// Build the full router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/pricing", pricing::routes())
        .nest("/api/advisory", advisory::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let chain = FallbackChain::from_credentials(&config.credentials, config.provider_timeout)
        .context("Failed to build provider HTTP client")?;

    let configured = config.credentials.configured_count();
    if configured == 0 {
        tracing::warn!("No provider API keys configured; advisory calls will fail");
    } else {
        tracing::info!(
            configured,
            timeout_secs = config.provider_timeout.as_secs(),
            "Provider chain ready: {:?}",
            chain.providers()
        );
    }

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, Advisor::new(Arc::new(chain))));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Providers in fallback order
    pub providers: [ProviderId; 3],
    pub providers_configured: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers: state.advisor.providers(),
        providers_configured: state.config.credentials.configured_count(),
    })
}
