//! Builders for test fixtures, shared by unit and integration tests.

use chrono::{DateTime, Utc};

use crate::models::{Check, CheckStatus, Service};

/// Builder for `Service` fixtures.
pub struct ServiceBuilder {
    service: Service,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceBuilder {
    /// Starts from a minimal healthy-looking service.
    pub fn new() -> Self {
        Self {
            service: Service {
                id: 1,
                name: "test-service".to_string(),
                url: "http://localhost:8080/health".to_string(),
                interval_seconds: 60,
                timeout_seconds: 10,
                created_at: Utc::now(),
            },
        }
    }

    /// Sets the service id.
    pub fn id(mut self, id: i64) -> Self {
        self.service.id = id;
        self
    }

    /// Sets the service name.
    pub fn name(mut self, name: &str) -> Self {
        self.service.name = name.to_string();
        self
    }

    /// Sets the probed endpoint URL.
    pub fn url(mut self, url: &str) -> Self {
        self.service.url = url.to_string();
        self
    }

    /// Sets the probe interval in seconds.
    pub fn interval_seconds(mut self, secs: i64) -> Self {
        self.service.interval_seconds = secs;
        self
    }

    /// Sets the per-probe timeout in seconds.
    pub fn timeout_seconds(mut self, secs: i64) -> Self {
        self.service.timeout_seconds = secs;
        self
    }

    /// Builds the `Service`.
    pub fn build(self) -> Service {
        self.service
    }
}

/// Builder for `Check` fixtures. Metric snapshot fields default to absent.
pub struct CheckBuilder {
    check: Check,
}

impl Default for CheckBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckBuilder {
    /// Starts from a bare `ok` check without latency or snapshot fields.
    pub fn new() -> Self {
        Self {
            check: Check {
                id: 0,
                service_id: 1,
                timestamp: Utc::now(),
                status: CheckStatus::Ok,
                response_time_ms: None,
                error: None,
                latency_p50_ms: None,
                latency_p95_ms: None,
                latency_p99_ms: None,
                request_rate_rpm: None,
                error_rate_percent: None,
                uptime_percent: None,
                throughput_rps: None,
                apdex_score: None,
            },
        }
    }

    /// Sets the owning service id.
    pub fn service_id(mut self, id: i64) -> Self {
        self.check.service_id = id;
        self
    }

    /// Sets the probe timestamp.
    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.check.timestamp = at;
        self
    }

    /// Sets the outcome classification.
    pub fn status(mut self, status: CheckStatus) -> Self {
        self.check.status = status;
        self
    }

    /// Sets the measured latency.
    pub fn response_time_ms(mut self, ms: f64) -> Self {
        self.check.response_time_ms = Some(ms);
        self
    }

    /// Sets the captured transport error.
    pub fn error(mut self, error: &str) -> Self {
        self.check.error = Some(error.to_string());
        self
    }

    /// Sets the window error rate snapshot.
    pub fn error_rate_percent(mut self, rate: f64) -> Self {
        self.check.error_rate_percent = Some(rate);
        self
    }

    /// Sets the window uptime snapshot.
    pub fn uptime_percent(mut self, uptime: f64) -> Self {
        self.check.uptime_percent = Some(uptime);
        self
    }

    /// Sets the window Apdex snapshot.
    pub fn apdex_score(mut self, score: f64) -> Self {
        self.check.apdex_score = Some(score);
        self
    }

    /// Builds the `Check`.
    pub fn build(self) -> Check {
        self.check
    }
}
