//! Prometheus instrumentation for probe outcomes.

use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
};

use crate::models::CheckStatus;

/// Counters and histograms observed once per probe, plus the registry backing
/// the text exposition endpoint.
pub struct ProbeMetrics {
    registry: Registry,
    checks_total: IntCounterVec,
    response_time: HistogramVec,
}

impl ProbeMetrics {
    /// Creates the registry and registers the probe instruments on it.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let checks_total = IntCounterVec::new(
            Opts::new("pulse_checks_total", "Total health check attempts"),
            &["service", "status"],
        )?;
        let response_time = HistogramVec::new(
            HistogramOpts::new(
                "pulse_check_response_seconds",
                "Response time for health checks (s)",
            ),
            &["service"],
        )?;

        registry.register(Box::new(checks_total.clone()))?;
        registry.register(Box::new(response_time.clone()))?;

        Ok(Self { registry, checks_total, response_time })
    }

    /// Records one probe outcome. Infallible by construction, so the probe
    /// pipeline can call it unconditionally.
    pub fn observe(&self, service: &str, status: CheckStatus, response_time_ms: Option<f64>) {
        self.checks_total.with_label_values(&[service, status.as_str()]).inc();
        if let Some(rt_ms) = response_time_ms {
            self.response_time.with_label_values(&[service]).observe(rt_ms / 1000.0);
        }
    }

    /// Gathers the current metric families for text exposition.
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_increments_counter_and_histogram() {
        let metrics = ProbeMetrics::new().unwrap();

        metrics.observe("api", CheckStatus::Ok, Some(250.0));
        metrics.observe("api", CheckStatus::Down, None);

        let families = metrics.gather();
        let counter = families
            .iter()
            .find(|f| f.get_name() == "pulse_checks_total")
            .expect("counter family registered");
        let total: u64 =
            counter.get_metric().iter().map(|m| m.get_counter().get_value() as u64).sum();
        assert_eq!(total, 2);

        let histogram = families
            .iter()
            .find(|f| f.get_name() == "pulse_check_response_seconds")
            .expect("histogram family registered");
        // Only the completed probe carries a latency observation.
        let samples: u64 =
            histogram.get_metric().iter().map(|m| m.get_histogram().get_sample_count()).sum();
        assert_eq!(samples, 1);
    }
}
