//! Handlers for check history and aggregated service metrics.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::models::{Check, CheckStatus};

fn default_limit() -> i64 {
    50
}

/// Query parameters for the check history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of checks to return, newest first.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// `GET /services/{id}/checks`: recent checks, newest first.
pub async fn list_checks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Check>>, ApiError> {
    state
        .repo
        .get_service(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

    Ok(Json(state.repo.recent_checks(id, params.limit).await?))
}

/// Aggregated view over a service's last 24 hours of checks. Percentiles and
/// window rates come from the most recent check's persisted snapshot; the
/// average is computed over the raw latencies in range.
#[derive(Debug, Serialize)]
pub struct ServiceMetricsSummary {
    /// Identity of the service.
    pub service_id: i64,
    /// Name of the service.
    pub service_name: String,
    /// Status of the most recent check.
    pub current_status: CheckStatus,
    /// Mean of all recorded latencies in the 24 h range.
    pub avg_response_time_ms: f64,
    /// Latest persisted p95 latency.
    pub p95_response_time_ms: f64,
    /// Latest persisted p99 latency.
    pub p99_response_time_ms: f64,
    /// Latest persisted error rate.
    pub error_rate_percent: f64,
    /// Latest persisted uptime percentage.
    pub uptime_percent_24h: f64,
    /// Latest persisted request rate.
    pub request_rate_rpm: f64,
    /// Latest persisted throughput.
    pub throughput_rps: f64,
    /// Latest persisted Apdex score.
    pub apdex_score: f64,
    /// Number of checks in the 24 h range.
    pub checks_count: usize,
    /// Timestamp of the most recent check.
    pub last_check_timestamp: DateTime<Utc>,
}

/// `GET /services/{id}/metrics`: aggregated metrics for the last 24 hours.
pub async fn metrics_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ServiceMetricsSummary>, ApiError> {
    let service = state
        .repo
        .get_service(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

    let since = Utc::now() - chrono::Duration::hours(24);
    let checks = state.repo.checks_since(id, since).await?;

    // checks are ordered oldest first, so the last entry is the latest.
    let Some(latest) = checks.last() else {
        return Err(ApiError::NotFound("No check data available".to_string()));
    };

    let response_times: Vec<f64> = checks.iter().filter_map(|c| c.response_time_ms).collect();
    let avg_response_time_ms = if response_times.is_empty() {
        0.0
    } else {
        response_times.iter().sum::<f64>() / response_times.len() as f64
    };

    Ok(Json(ServiceMetricsSummary {
        service_id: service.id,
        service_name: service.name,
        current_status: latest.status,
        avg_response_time_ms,
        p95_response_time_ms: latest.latency_p95_ms.unwrap_or(0.0),
        p99_response_time_ms: latest.latency_p99_ms.unwrap_or(0.0),
        error_rate_percent: latest.error_rate_percent.unwrap_or(0.0),
        uptime_percent_24h: latest.uptime_percent.unwrap_or(0.0),
        request_rate_rpm: latest.request_rate_rpm.unwrap_or(0.0),
        throughput_rps: latest.throughput_rps.unwrap_or(0.0),
        apdex_score: latest.apdex_score.unwrap_or(0.0),
        checks_count: checks.len(),
        last_check_timestamp: latest.timestamp,
    }))
}
