//! Health check endpoint

use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub model: String,
    pub dim: usize,
    pub cache_enabled: bool,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub timestamp: String,
}

/// Liveness only: the provider is not called, and a disabled cache still reports healthy.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let gateway = &state.gateway;
    let metrics = gateway.metrics();

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "embedding-gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: gateway.model().name().to_string(),
        dim: gateway.dimension(),
        cache_enabled: gateway.cache_enabled(),
        cache_hits: metrics.cache_hits.get(),
        cache_misses: metrics.cache_misses.get(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
