//! The probe executor: performs one outbound request per invocation,
//! classifies the outcome, and persists a self-describing check record.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::engine::window::WindowMetrics;
use crate::metrics::ProbeMetrics;
use crate::models::{Check, CheckEvent, CheckStatus, Service};
use crate::persistence::error::PersistenceError;
use crate::persistence::traits::AppRepository;
use crate::publisher::EventPublisher;

/// Executes probes and persists their results.
///
/// Each invocation issues a single `GET` with the service's configured
/// timeout, computes the trailing metrics window from the history currently
/// in storage, and writes one fully-populated check row. The Prometheus
/// observation and the event publish are best-effort; their failure is logged
/// and never surfaces to the caller.
pub struct ProbeExecutor {
    /// Check history store; also the source for window computation.
    repo: Arc<dyn AppRepository>,
    /// Shared client for outbound probes. Timeouts are applied per request.
    client: reqwest::Client,
    /// Sink for compact per-check events.
    publisher: Arc<dyn EventPublisher>,
    /// Prometheus instruments observed once per probe.
    metrics: Arc<ProbeMetrics>,
    /// Size of the trailing metrics window.
    window_minutes: u64,
    /// Topic check events are published to.
    event_topic: String,
}

impl ProbeExecutor {
    /// Creates a new executor over the given collaborators.
    pub fn new(
        repo: Arc<dyn AppRepository>,
        publisher: Arc<dyn EventPublisher>,
        metrics: Arc<ProbeMetrics>,
        window_minutes: u64,
        event_topic: String,
    ) -> Self {
        Self { repo, client: reqwest::Client::new(), publisher, metrics, window_minutes, event_topic }
    }

    /// Runs one probe against `service` and returns the persisted check.
    ///
    /// An unreachable endpoint is a `down` check, not an error; `Err` is
    /// returned only when the check itself cannot be read from or written to
    /// storage.
    #[tracing::instrument(skip(self, service), fields(service_id = service.id, service_name = %service.name), level = "debug")]
    pub async fn execute(&self, service: &Service) -> Result<Check, PersistenceError> {
        let timeout = Duration::from_secs(service.timeout_seconds.max(0) as u64);
        let started = Instant::now();

        let (status, response_time_ms, error) =
            match self.client.get(&service.url).timeout(timeout).send().await {
                Ok(response) => {
                    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                    (classify(response.status()), Some(elapsed_ms), None)
                }
                Err(e) => {
                    tracing::warn!(service_name = %service.name, error = %e, "Probe failed to complete.");
                    (CheckStatus::Down, None, Some(e.to_string()))
                }
            };

        // Snapshot the trailing window from what is in storage right now, so
        // the persisted row is self-describing for later read paths.
        let since = Utc::now() - chrono::Duration::minutes(self.window_minutes as i64);
        let history = self.repo.checks_since(service.id, since).await?;
        let window = WindowMetrics::compute(&history, self.window_minutes);

        let check = self
            .repo
            .insert_check(Check::from_probe(service.id, status, response_time_ms, error, window))
            .await?;

        self.metrics.observe(&service.name, check.status, check.response_time_ms);
        self.publish_event(service, &check).await;

        Ok(check)
    }

    /// Publishes the compact event for a persisted check. Failures are logged
    /// and swallowed.
    async fn publish_event(&self, service: &Service, check: &Check) {
        let event = CheckEvent::new(service, check);
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(service_id = service.id, error = %e, "Failed to encode check event.");
                return;
            }
        };

        if let Err(e) =
            self.publisher.publish(&self.event_topic, &service.id.to_string(), &payload).await
        {
            tracing::error!(service_id = service.id, error = %e, "Failed to publish check event.");
        }
    }
}

/// Maps an HTTP status code onto a check outcome.
fn classify(status: reqwest::StatusCode) -> CheckStatus {
    if status.as_u16() >= 500 {
        CheckStatus::Error
    } else if status.as_u16() >= 400 {
        CheckStatus::Warn
    } else {
        CheckStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::traits::MockAppRepository;
    use crate::publisher::MockEventPublisher;
    use crate::test_helpers::ServiceBuilder;

    fn executor_with(
        repo: MockAppRepository,
        publisher: MockEventPublisher,
    ) -> ProbeExecutor {
        ProbeExecutor::new(
            Arc::new(repo),
            Arc::new(publisher),
            Arc::new(ProbeMetrics::new().unwrap()),
            60,
            "health_checks".to_string(),
        )
    }

    fn echoing_repo() -> MockAppRepository {
        let mut repo = MockAppRepository::new();
        repo.expect_checks_since().returning(|_, _| Ok(vec![]));
        repo.expect_insert_check().returning(|mut check| {
            check.id = 1;
            Ok(check)
        });
        repo
    }

    fn silent_publisher() -> MockEventPublisher {
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().returning(|_, _, _| Ok(()));
        publisher
    }

    #[test]
    fn classify_maps_status_ranges() {
        assert_eq!(classify(reqwest::StatusCode::OK), CheckStatus::Ok);
        assert_eq!(classify(reqwest::StatusCode::NOT_FOUND), CheckStatus::Warn);
        assert_eq!(classify(reqwest::StatusCode::SERVICE_UNAVAILABLE), CheckStatus::Error);
        assert_eq!(classify(reqwest::StatusCode::INTERNAL_SERVER_ERROR), CheckStatus::Error);
    }

    #[tokio::test]
    async fn successful_probe_records_latency() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/health").with_status(200).create_async().await;

        let service =
            ServiceBuilder::new().id(1).url(&format!("{}/health", server.url())).build();
        let executor = executor_with(echoing_repo(), silent_publisher());

        let check = executor.execute(&service).await.unwrap();

        assert_eq!(check.status, CheckStatus::Ok);
        assert!(check.response_time_ms.is_some());
        assert!(check.error.is_none());
    }

    #[tokio::test]
    async fn server_error_is_classified_not_raised() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/health").with_status(503).create_async().await;

        let service =
            ServiceBuilder::new().id(1).url(&format!("{}/health", server.url())).build();
        let executor = executor_with(echoing_repo(), silent_publisher());

        let check = executor.execute(&service).await.unwrap();

        assert_eq!(check.status, CheckStatus::Error);
        // The request completed, so latency is still recorded.
        assert!(check.response_time_ms.is_some());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_down_with_error_captured() {
        // Nothing listens on port 1.
        let service = ServiceBuilder::new().id(1).url("http://127.0.0.1:1/health").build();
        let executor = executor_with(echoing_repo(), silent_publisher());

        let check = executor.execute(&service).await.unwrap();

        assert_eq!(check.status, CheckStatus::Down);
        assert!(check.response_time_ms.is_none());
        assert!(check.error.is_some());
    }

    #[tokio::test]
    async fn window_snapshot_is_attached_from_history() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/health").with_status(200).create_async().await;

        let mut repo = MockAppRepository::new();
        repo.expect_checks_since().returning(|_, _| {
            Ok(vec![
                crate::test_helpers::CheckBuilder::new()
                    .status(CheckStatus::Ok)
                    .response_time_ms(100.0)
                    .build(),
                crate::test_helpers::CheckBuilder::new().status(CheckStatus::Down).build(),
            ])
        });
        repo.expect_insert_check().returning(|mut check| {
            check.id = 1;
            Ok(check)
        });

        let service =
            ServiceBuilder::new().id(1).url(&format!("{}/health", server.url())).build();
        let executor = executor_with(repo, silent_publisher());

        let check = executor.execute(&service).await.unwrap();

        assert_eq!(check.error_rate_percent, Some(50.0));
        assert_eq!(check.uptime_percent, Some(50.0));
        assert_eq!(check.latency_p50_ms, Some(100.0));
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_the_probe() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/health").with_status(200).create_async().await;

        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .returning(|_, _, _| Err(crate::publisher::PublisherError::Kafka(
                rdkafka::error::KafkaError::Canceled,
            )));

        let service =
            ServiceBuilder::new().id(1).url(&format!("{}/health", server.url())).build();
        let executor = executor_with(echoing_repo(), publisher);

        let check = executor.execute(&service).await.unwrap();

        assert_eq!(check.status, CheckStatus::Ok);
    }
}
