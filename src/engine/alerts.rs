//! Alert decision policy and the deduplicating alert gate.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::dedup::DedupStore;
use crate::models::{Check, CheckStatus, Service};
use crate::notification::NotificationService;

/// Error rate above which a check triggers an alert, in percent.
pub const ERROR_RATE_ALERT_THRESHOLD: f64 = 5.0;

/// Apdex score below which a check triggers an alert.
pub const APDEX_ALERT_FLOOR: f64 = 0.8;

/// Why a check triggered an alert. At most one reason is reported per check,
/// picked in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertReason {
    /// The probe failed outright or the endpoint returned a server error.
    Failure {
        /// The failing status, `down` or `error`.
        status: CheckStatus,
        /// Transport error captured for `down` outcomes.
        error: Option<String>,
    },
    /// The probe completed but took longer than the configured threshold.
    HighLatency {
        /// Measured latency in milliseconds.
        response_time_ms: f64,
        /// Configured threshold in milliseconds.
        threshold_ms: u64,
    },
    /// The trailing window's error rate breached the fixed threshold.
    HighErrorRate {
        /// Measured error rate in percent.
        error_rate_percent: f64,
    },
    /// The trailing window's Apdex score fell below the fixed floor.
    PoorApdex {
        /// Measured Apdex score.
        apdex_score: f64,
    },
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertReason::Failure { status, error: Some(error) } => {
                write!(f, "status={} error={}", status, error)
            }
            AlertReason::Failure { status, error: None } => write!(f, "status={}", status),
            AlertReason::HighLatency { response_time_ms, threshold_ms } => {
                write!(f, "high_latency={:.0}ms (threshold={}ms)", response_time_ms, threshold_ms)
            }
            AlertReason::HighErrorRate { error_rate_percent } => {
                write!(f, "error_rate={:.2}% (threshold={}%)", error_rate_percent, ERROR_RATE_ALERT_THRESHOLD)
            }
            AlertReason::PoorApdex { apdex_score } => {
                write!(f, "poor_apdex={:.2} (threshold={})", apdex_score, APDEX_ALERT_FLOOR)
            }
        }
    }
}

/// Decides whether a completed check warrants an alert.
///
/// Conditions are evaluated in strict priority order and the first match
/// wins, so a `down` check reports its failure even when the window's error
/// rate or Apdex is also breached.
pub fn evaluate(check: &Check, latency_threshold: Duration) -> Option<AlertReason> {
    if matches!(check.status, CheckStatus::Down | CheckStatus::Error) {
        return Some(AlertReason::Failure { status: check.status, error: check.error.clone() });
    }

    let threshold_ms = latency_threshold.as_millis() as u64;
    if let Some(rt) = check.response_time_ms {
        if rt > threshold_ms as f64 {
            return Some(AlertReason::HighLatency { response_time_ms: rt, threshold_ms });
        }
    }

    if let Some(rate) = check.error_rate_percent {
        if rate > ERROR_RATE_ALERT_THRESHOLD {
            return Some(AlertReason::HighErrorRate { error_rate_percent: rate });
        }
    }

    if let Some(apdex) = check.apdex_score {
        if apdex < APDEX_ALERT_FLOOR {
            return Some(AlertReason::PoorApdex { apdex_score: apdex });
        }
    }

    None
}

/// Applies the alert policy to completed checks and forwards admitted alerts
/// to the notifier.
///
/// One suppression key per service: two different reasons for the same
/// service inside one cooldown window still collapse into one notification.
/// Failures in the dedup store or the notifier are logged and discarded; they
/// never propagate into the probe pipeline.
pub struct AlertGate {
    /// TTL marker store enforcing the per-service cooldown.
    dedup: Arc<dyn DedupStore>,
    /// Outbound notification channel.
    notifier: Arc<NotificationService>,
    /// Latency above which a completed probe alerts.
    latency_threshold: Duration,
    /// Suppression window applied after an admitted alert.
    cooldown: Duration,
}

impl AlertGate {
    /// Creates a new gate.
    pub fn new(
        dedup: Arc<dyn DedupStore>,
        notifier: Arc<NotificationService>,
        latency_threshold: Duration,
        cooldown: Duration,
    ) -> Self {
        Self { dedup, notifier, latency_threshold, cooldown }
    }

    /// Evaluates one completed check and, when admitted by the dedup gate,
    /// sends the notification.
    pub async fn process_check(&self, service: &Service, check: &Check) {
        let Some(reason) = evaluate(check, self.latency_threshold) else {
            return;
        };

        let key = format!("alert_dedupe:{}", service.id);
        match self.dedup.set_if_absent(&key, self.cooldown).await {
            Ok(true) => {
                let message = format!("Service {} alert: {}", service.name, reason);
                if let Err(e) = self.notifier.notify(&message).await {
                    tracing::error!(
                        service_id = service.id,
                        error = %e,
                        "Failed to send alert notification."
                    );
                }
            }
            Ok(false) => {
                tracing::info!(
                    service_id = service.id,
                    reason = %reason,
                    "Alert suppressed within cooldown window."
                );
            }
            Err(e) => {
                tracing::error!(
                    service_id = service.id,
                    error = %e,
                    "Dedup store unavailable, alert skipped."
                );
            }
        }
    }
}
