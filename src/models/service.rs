//! This module defines the `Service` structure, a registered endpoint that is
//! probed on its own recurring timer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;

/// A registered service whose endpoint is probed at a fixed interval.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    /// Unique identifier, assigned by the database on registration.
    #[serde(default)]
    pub id: i64,

    /// Human-readable name, used as the label on emitted metrics.
    pub name: String,

    /// The endpoint URL probed by the executor.
    pub url: String,

    /// Seconds between consecutive probes. The scheduler enforces a floor of
    /// five seconds regardless of this value.
    pub interval_seconds: i64,

    /// Per-probe request timeout in seconds.
    pub timeout_seconds: i64,

    /// Timestamp when the service was registered.
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Provides a default timestamp for serde deserialization
fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

fn default_interval_seconds() -> i64 {
    60
}

fn default_timeout_seconds() -> i64 {
    10
}

/// Registration payload for a new service.
///
/// The URL is parsed eagerly so malformed endpoints are rejected before a row
/// is created or a timer scheduled.
#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    /// Human-readable name.
    pub name: String,

    /// Endpoint to probe.
    pub url: Url,

    /// Seconds between probes.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: i64,

    /// Per-probe request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_service_applies_defaults() {
        let payload: NewService = serde_json::from_value(serde_json::json!({
            "name": "billing",
            "url": "https://billing.internal/health",
        }))
        .unwrap();

        assert_eq!(payload.name, "billing");
        assert_eq!(payload.interval_seconds, 60);
        assert_eq!(payload.timeout_seconds, 10);
    }

    #[test]
    fn new_service_rejects_invalid_url() {
        let result: Result<NewService, _> = serde_json::from_value(serde_json::json!({
            "name": "broken",
            "url": "not a url",
        }));

        assert!(result.is_err());
    }
}
