//! Compact event payload published to the event stream after each probe.

use serde::{Deserialize, Serialize};

use crate::models::{Check, CheckStatus, Service};

/// The record published for every completed check. Deliberately small: just
/// enough for downstream consumers to track status and headline SRE numbers
/// without querying the check history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckEvent {
    /// Identity of the probed service.
    pub service_id: i64,

    /// Name of the probed service.
    pub service_name: String,

    /// Outcome classification of the probe.
    pub status: CheckStatus,

    /// Measured latency in milliseconds, when the probe completed.
    pub response_time_ms: Option<f64>,

    /// Apdex score of the trailing window at check time.
    pub apdex_score: Option<f64>,

    /// Error rate of the trailing window at check time.
    pub error_rate_percent: Option<f64>,
}

impl CheckEvent {
    /// Builds the event for a persisted check.
    pub fn new(service: &Service, check: &Check) -> Self {
        Self {
            service_id: service.id,
            service_name: service.name.clone(),
            status: check.status,
            response_time_ms: check.response_time_ms,
            apdex_score: check.apdex_score,
            error_rate_percent: check.error_rate_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{CheckBuilder, ServiceBuilder};

    #[test]
    fn event_mirrors_check_fields() {
        let service = ServiceBuilder::new().id(3).name("payments").build();
        let check = CheckBuilder::new()
            .service_id(3)
            .status(CheckStatus::Error)
            .response_time_ms(412.0)
            .apdex_score(0.9)
            .error_rate_percent(12.5)
            .build();

        let event = CheckEvent::new(&service, &check);

        assert_eq!(event.service_id, 3);
        assert_eq!(event.service_name, "payments");
        assert_eq!(event.status, CheckStatus::Error);
        assert_eq!(event.response_time_ms, Some(412.0));
        assert_eq!(event.apdex_score, Some(0.9));
        assert_eq!(event.error_rate_percent, Some(12.5));
    }
}
