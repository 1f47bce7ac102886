//! HTTP endpoints for the embedding gateway

pub mod embed;
pub mod health;
pub mod metrics;


pub use embed::{embed, embed_batch, ErrorResponse};
pub use health::health_check;
pub use metrics::export_metrics;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// `GET /health` also answers `HEAD`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(export_metrics))
        .route("/embed", post(embed))
        .route("/embed/batch", post(embed_batch))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
