//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::dedup::DedupStore;
use crate::engine::alerts::AlertGate;
use crate::engine::prober::ProbeExecutor;
use crate::metrics::ProbeMetrics;
use crate::notification::NotificationService;
use crate::persistence::traits::AppRepository;
use crate::publisher::EventPublisher;
use crate::scheduler::ProbeScheduler;

use super::{Supervisor, SupervisorError};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    repo: Option<Arc<dyn AppRepository>>,
    dedup: Option<Arc<dyn DedupStore>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    notifier: Option<Arc<NotificationService>>,
    metrics: Option<Arc<ProbeMetrics>>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the service/check repository for the `Supervisor`.
    pub fn repository(mut self, repo: Arc<dyn AppRepository>) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Sets the dedup marker store for the alert gate.
    pub fn dedup_store(mut self, dedup: Arc<dyn DedupStore>) -> Self {
        self.dedup = Some(dedup);
        self
    }

    /// Sets the event publisher for the probe pipeline.
    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Sets the notification service for the alert gate.
    pub fn notifier(mut self, notifier: Arc<NotificationService>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sets the Prometheus instruments. When omitted a fresh registry is
    /// created during `build`.
    pub fn metrics(mut self, metrics: Arc<ProbeMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Assembles and validates the components to build a `Supervisor`.
    ///
    /// This method performs the final wiring of the probe pipeline: the
    /// executor and alert gate are constructed from the provided
    /// collaborators, and the scheduler on top of them.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let repo = self.repo.ok_or(SupervisorError::MissingRepository)?;
        let dedup = self.dedup.ok_or(SupervisorError::MissingDedupStore)?;
        let publisher = self.publisher.ok_or(SupervisorError::MissingPublisher)?;
        let notifier = self.notifier.ok_or(SupervisorError::MissingNotifier)?;
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => Arc::new(ProbeMetrics::new()?),
        };

        let executor = Arc::new(ProbeExecutor::new(
            Arc::clone(&repo),
            Arc::clone(&publisher),
            Arc::clone(&metrics),
            config.metrics_window_minutes,
            config.event_topic.clone(),
        ));

        let alerts = Arc::new(AlertGate::new(
            dedup,
            notifier,
            config.latency_threshold,
            config.alert_cooldown,
        ));

        let scheduler = Arc::new(ProbeScheduler::new(Arc::clone(&repo), executor, alerts));

        Ok(Supervisor {
            config: Arc::new(config),
            repo,
            scheduler,
            publisher,
            metrics,
            cancellation_token: tokio_util::sync::CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpRetryConfig;
    use crate::dedup::InMemoryDedupStore;
    use crate::persistence::traits::MockAppRepository;
    use crate::publisher::StdoutPublisher;

    fn test_notifier() -> Arc<NotificationService> {
        Arc::new(NotificationService::new(None, &HttpRetryConfig::default()))
    }

    #[test]
    fn build_succeeds_with_all_components() {
        let result = SupervisorBuilder::new()
            .config(AppConfig::default())
            .repository(Arc::new(MockAppRepository::new()))
            .dedup_store(Arc::new(InMemoryDedupStore::new()))
            .publisher(Arc::new(StdoutPublisher))
            .notifier(test_notifier())
            .build();

        assert!(result.is_ok());
    }

    #[test]
    fn build_fails_if_config_is_missing() {
        let result = SupervisorBuilder::new()
            .repository(Arc::new(MockAppRepository::new()))
            .dedup_store(Arc::new(InMemoryDedupStore::new()))
            .publisher(Arc::new(StdoutPublisher))
            .notifier(test_notifier())
            .build();

        assert!(matches!(result, Err(SupervisorError::MissingConfig)));
    }

    #[test]
    fn build_fails_if_repository_is_missing() {
        let result = SupervisorBuilder::new()
            .config(AppConfig::default())
            .dedup_store(Arc::new(InMemoryDedupStore::new()))
            .publisher(Arc::new(StdoutPublisher))
            .notifier(test_notifier())
            .build();

        assert!(matches!(result, Err(SupervisorError::MissingRepository)));
    }

    #[test]
    fn build_fails_if_dedup_store_is_missing() {
        let result = SupervisorBuilder::new()
            .config(AppConfig::default())
            .repository(Arc::new(MockAppRepository::new()))
            .publisher(Arc::new(StdoutPublisher))
            .notifier(test_notifier())
            .build();

        assert!(matches!(result, Err(SupervisorError::MissingDedupStore)));
    }

    #[test]
    fn build_fails_if_publisher_is_missing() {
        let result = SupervisorBuilder::new()
            .config(AppConfig::default())
            .repository(Arc::new(MockAppRepository::new()))
            .dedup_store(Arc::new(InMemoryDedupStore::new()))
            .notifier(test_notifier())
            .build();

        assert!(matches!(result, Err(SupervisorError::MissingPublisher)));
    }

    #[test]
    fn build_fails_if_notifier_is_missing() {
        let result = SupervisorBuilder::new()
            .config(AppConfig::default())
            .repository(Arc::new(MockAppRepository::new()))
            .dedup_store(Arc::new(InMemoryDedupStore::new()))
            .publisher(Arc::new(StdoutPublisher))
            .build();

        assert!(matches!(result, Err(SupervisorError::MissingNotifier)));
    }
}
