//! Embedding endpoints

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

use crate::core::GatewayError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmbedBatchRequest {
    /// `null` entries are embedded like empty strings.
    #[serde(default)]
    pub texts: Vec<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embedding: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EmbedBatchResponse {
    pub embeddings: Vec<Option<Vec<f32>>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl From<GatewayError> for ErrorResponse {
    fn from(err: GatewayError) -> Self {
        let error = match &err {
            GatewayError::ProviderTimeout(_) => "provider_timeout",
            GatewayError::Provider(_) => "provider_failed",
            _ => "internal_error",
        };
        ErrorResponse {
            error: error.to_string(),
            message: err.to_string(),
        }
    }
}

fn api_error(err: GatewayError) -> ApiError {
    let status = match &err {
        GatewayError::ProviderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        GatewayError::Provider(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::from(err)))
}

pub async fn embed(
    State(state): State<AppState>,
    Json(request): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let text = request.text.unwrap_or_default();

    let resolved = state.gateway.resolve_one(&text).await.map_err(api_error)?;

    Ok(Json(match resolved {
        Some(resolved) => EmbedResponse {
            cached: Some(resolved.cached()),
            embedding: Some(resolved.vector),
        },
        None => EmbedResponse {
            embedding: None,
            cached: None,
        },
    }))
}

pub async fn embed_batch(
    State(state): State<AppState>,
    Json(request): Json<EmbedBatchRequest>,
) -> Result<Json<EmbedBatchResponse>, ApiError> {
    tracing::debug!("Batch embedding request with {} texts", request.texts.len());

    let texts: Vec<String> = request
        .texts
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    let embeddings = state
        .gateway
        .resolve_batch(&texts)
        .await
        .map_err(api_error)?;

    Ok(Json(EmbedBatchResponse { embeddings }))
}
