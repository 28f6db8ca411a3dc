//! Liveness and Prometheus exposition handlers.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use prometheus::TextEncoder;
use serde_json::json;

use super::error::ApiError;
use super::AppState;

/// `GET /health`: process liveness.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `GET /metrics`: Prometheus text exposition of the probe instruments.
pub async fn metrics_exposition(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let body = encoder
        .encode_to_string(&state.metrics.gather())
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
