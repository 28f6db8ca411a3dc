//! Rolling SRE metrics over a trailing window of checks.
//!
//! `WindowMetrics::compute` is a pure projection over the checks persisted for
//! one service within the trailing window. It is recomputed from the current
//! history on every probe, so the snapshot attached to a check always agrees
//! with what is in storage at evaluation time.

use serde::{Deserialize, Serialize};

use crate::models::{Check, CheckStatus};

/// Latency at or below which a request counts as "satisfied" for Apdex.
/// Requests up to four times this threshold count as "tolerating".
pub const APDEX_THRESHOLD_MS: f64 = 1000.0;

/// Derived reliability metrics for one service over a trailing window.
///
/// Every field is `None` when the window contains no checks at all. The Apdex
/// score distinguishes that case from a window that has checks but no
/// successful latencies: the former is `None`, the latter `Some(0.0)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    /// Median latency of successful checks, in milliseconds.
    pub latency_p50_ms: Option<f64>,
    /// 95th-percentile latency of successful checks, in milliseconds.
    pub latency_p95_ms: Option<f64>,
    /// 99th-percentile latency of successful checks, in milliseconds.
    pub latency_p99_ms: Option<f64>,
    /// Checks per minute over the window.
    pub request_rate_rpm: Option<f64>,
    /// Percentage of checks that failed (`warn`, `error` or `down`).
    pub error_rate_percent: Option<f64>,
    /// Percentage of checks that succeeded.
    pub uptime_percent: Option<f64>,
    /// Checks per second over the window.
    pub throughput_rps: Option<f64>,
    /// Application Performance Index in `[0, 1]`.
    pub apdex_score: Option<f64>,
}

impl WindowMetrics {
    /// Computes the metrics for `checks`, the time-ordered history of one
    /// service within a trailing window of `window_minutes`.
    pub fn compute(checks: &[Check], window_minutes: u64) -> Self {
        if checks.is_empty() {
            return Self::default();
        }

        // Successful latencies, ascending, for the percentile and Apdex math.
        let mut response_times: Vec<f64> = checks
            .iter()
            .filter(|c| c.status == CheckStatus::Ok)
            .filter_map(|c| c.response_time_ms)
            .collect();
        response_times.sort_by(|a, b| a.total_cmp(b));

        let total = checks.len();
        let failed = checks.iter().filter(|c| c.status.is_failure()).count();
        let error_rate_percent = failed as f64 / total as f64 * 100.0;

        let request_rate_rpm = total as f64 / window_minutes as f64;

        Self {
            latency_p50_ms: nearest_rank(&response_times, 50),
            latency_p95_ms: nearest_rank(&response_times, 95),
            latency_p99_ms: nearest_rank(&response_times, 99),
            request_rate_rpm: Some(request_rate_rpm),
            error_rate_percent: Some(error_rate_percent),
            uptime_percent: Some(100.0 - error_rate_percent),
            throughput_rps: Some(request_rate_rpm / 60.0),
            apdex_score: Some(apdex(&response_times)),
        }
    }
}

/// Nearest-rank percentile: picks the value at index `floor(p/100 * len)`,
/// clamped to the last element. No interpolation.
fn nearest_rank(sorted: &[f64], percentile: usize) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = sorted.len() * percentile / 100;
    Some(sorted[idx.min(sorted.len() - 1)])
}

/// Apdex over the successful latencies: `(satisfied + tolerating / 2) / n`,
/// capped at 1.0. Zero when no successful latency exists.
fn apdex(response_times: &[f64]) -> f64 {
    if response_times.is_empty() {
        return 0.0;
    }
    let satisfied =
        response_times.iter().filter(|&&rt| rt <= APDEX_THRESHOLD_MS).count() as f64;
    let tolerating = response_times
        .iter()
        .filter(|&&rt| rt > APDEX_THRESHOLD_MS && rt <= 4.0 * APDEX_THRESHOLD_MS)
        .count() as f64;
    let score = (satisfied + tolerating / 2.0) / response_times.len() as f64;
    score.min(1.0)
}
