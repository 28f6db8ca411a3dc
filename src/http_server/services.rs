//! Handlers for service registration and removal.
//!
//! Registration and removal keep the scheduler in lockstep with storage: a
//! created service gets its probe timer before the response is returned, and
//! deletion cancels the timer before rows are removed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::error::ApiError;
use super::AppState;
use crate::models::{NewService, Service};

/// `POST /services`: registers a service and schedules its probe timer.
pub async fn create_service(
    State(state): State<AppState>,
    Json(payload): Json<NewService>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.interval_seconds <= 0 {
        return Err(ApiError::UnprocessableEntity(
            "interval_seconds must be positive".to_string(),
        ));
    }
    if payload.timeout_seconds <= 0 {
        return Err(ApiError::UnprocessableEntity("timeout_seconds must be positive".to_string()));
    }

    let service = state.repo.insert_service(payload).await?;
    state.scheduler.register(service.clone());

    Ok((StatusCode::CREATED, Json(service)))
}

/// `GET /services`: lists all registered services.
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.repo.list_services().await?))
}

/// `GET /services/{id}`: fetches one service.
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Service>, ApiError> {
    let service = state
        .repo
        .get_service(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;
    Ok(Json(service))
}

/// `DELETE /services/{id}`: cancels the probe timer and removes the service
/// together with its check history.
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .repo
        .get_service(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

    state.scheduler.deregister(id);
    state.repo.delete_service(id).await?;

    Ok(Json(json!({ "ok": true })))
}
