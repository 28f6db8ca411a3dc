//! This module defines the `Check` structure, the immutable outcome of a
//! single probe, together with the snapshot of the rolling metrics window
//! computed at check time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::engine::window::WindowMetrics;

/// Classification of a single probe outcome.
///
/// `Down` means the request never completed (timeout, refused connection, DNS
/// failure); the other variants classify the HTTP status code of a completed
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Request completed with a status below 400.
    Ok,
    /// Request completed with a 4xx status.
    Warn,
    /// Request completed with a 5xx status.
    Error,
    /// Request did not complete at all.
    Down,
}

impl CheckStatus {
    /// Whether this outcome counts against the service's error rate.
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Warn | CheckStatus::Error | CheckStatus::Down)
    }

    /// Lowercase wire representation, matching the stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Error => "error",
            CheckStatus::Down => "down",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted result of one probe. Rows are append-only and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Check {
    /// Unique identifier, assigned by the database on insert.
    #[serde(default)]
    pub id: i64,

    /// The service this probe targeted.
    pub service_id: i64,

    /// When the probe ran.
    pub timestamp: DateTime<Utc>,

    /// Outcome classification.
    pub status: CheckStatus,

    /// Wall-clock latency of the request in milliseconds. Absent when the
    /// request never completed.
    pub response_time_ms: Option<f64>,

    /// Transport error description for `down` outcomes.
    pub error: Option<String>,

    /// Median latency over the trailing window at check time.
    pub latency_p50_ms: Option<f64>,

    /// 95th-percentile latency over the trailing window at check time.
    pub latency_p95_ms: Option<f64>,

    /// 99th-percentile latency over the trailing window at check time.
    pub latency_p99_ms: Option<f64>,

    /// Probes per minute over the trailing window.
    pub request_rate_rpm: Option<f64>,

    /// Percentage of failed probes over the trailing window.
    pub error_rate_percent: Option<f64>,

    /// Percentage of successful probes over the trailing window.
    pub uptime_percent: Option<f64>,

    /// Probes per second over the trailing window.
    pub throughput_rps: Option<f64>,

    /// Application Performance Index over the trailing window, in `[0, 1]`.
    pub apdex_score: Option<f64>,
}

impl Check {
    /// Builds an unpersisted check from a probe outcome and the metrics window
    /// computed immediately beforehand. The id is assigned on insert.
    pub fn from_probe(
        service_id: i64,
        status: CheckStatus,
        response_time_ms: Option<f64>,
        error: Option<String>,
        window: WindowMetrics,
    ) -> Self {
        Self {
            id: 0,
            service_id,
            timestamp: Utc::now(),
            status,
            response_time_ms,
            error,
            latency_p50_ms: window.latency_p50_ms,
            latency_p95_ms: window.latency_p95_ms,
            latency_p99_ms: window.latency_p99_ms,
            request_rate_rpm: window.request_rate_rpm,
            error_rate_percent: window.error_rate_percent,
            uptime_percent: window.uptime_percent,
            throughput_rps: window.throughput_rps,
            apdex_score: window.apdex_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_failure_classification() {
        assert!(!CheckStatus::Ok.is_failure());
        assert!(CheckStatus::Warn.is_failure());
        assert!(CheckStatus::Error.is_failure());
        assert!(CheckStatus::Down.is_failure());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(CheckStatus::Down).unwrap(), "down");
        assert_eq!(CheckStatus::Error.to_string(), "error");
    }

    #[test]
    fn from_probe_attaches_window_snapshot() {
        let window = WindowMetrics { apdex_score: Some(0.75), ..Default::default() };
        let check = Check::from_probe(
            7,
            CheckStatus::Down,
            None,
            Some("connection refused".to_string()),
            window,
        );

        assert_eq!(check.id, 0);
        assert_eq!(check.service_id, 7);
        assert_eq!(check.status, CheckStatus::Down);
        assert!(check.response_time_ms.is_none());
        assert_eq!(check.apdex_score, Some(0.75));
        assert_eq!(check.error.as_deref(), Some("connection refused"));
    }
}
