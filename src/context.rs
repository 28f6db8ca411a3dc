//! Application context and initialization logic.
//!
//! This module handles loading configuration, setting up the database, and
//! selecting the dedup store and event publisher implementations. The
//! `AppContext` struct encapsulates these components for the supervisor to
//! consume.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{AppConfig, DedupBackend};
use crate::dedup::{DedupStore, InMemoryDedupStore};
use crate::metrics::ProbeMetrics;
use crate::notification::NotificationService;
use crate::persistence::error::PersistenceError;
use crate::persistence::sqlite::{SqliteDedupStore, SqliteRepository};
use crate::publisher::{create_kafka_publisher, EventPublisher, PublisherError, StdoutPublisher};

/// Errors that can occur during application context initialization.
#[derive(Debug, Error)]
pub enum AppContextError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Persistence error.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Event publisher error.
    #[error("Publisher error: {0}")]
    Publisher(#[from] PublisherError),

    /// Metrics registration error.
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// The application context, holding configuration and the constructed
/// collaborators of the probe pipeline.
pub struct AppContext {
    /// Shared application configuration.
    pub config: AppConfig,

    /// The SQLite repository for services and checks.
    pub repo: Arc<SqliteRepository>,

    /// The dedup marker store selected by configuration.
    pub dedup: Arc<dyn DedupStore>,

    /// The event publisher selected by configuration.
    pub publisher: Arc<dyn EventPublisher>,

    /// The alert notification service.
    pub notifier: Arc<NotificationService>,

    /// The Prometheus probe instruments.
    pub metrics: Arc<ProbeMetrics>,
}

/// A builder for the `AppContext`, allowing configuration overrides
/// and step-by-step initialization.
pub struct AppContextBuilder {
    /// Optional configuration directory to load settings from.
    config_dir: Option<String>,

    /// Optional override for the database URL.
    database_url_override: Option<String>,
}

impl AppContextBuilder {
    /// Creates a new `AppContextBuilder` with an optional configuration
    /// directory.
    pub fn new(config_dir: Option<String>) -> Self {
        Self { config_dir, database_url_override: None }
    }

    /// Sets a database URL override.
    pub fn database_url(mut self, url: String) -> Self {
        self.database_url_override = Some(url);
        self
    }

    /// Builds the `AppContext`, performing all initialization steps.
    pub async fn build(self) -> Result<AppContext, AppContextError> {
        tracing::debug!("Loading application configuration...");
        let mut config = AppConfig::new(self.config_dir.as_deref())?;
        tracing::debug!(database_url = %config.database_url, "Configuration loaded.");

        if let Some(db_url) = self.database_url_override {
            tracing::info!(database_url = %db_url, "Overriding database URL.");
            config.database_url = db_url;
        }

        tracing::debug!("Initializing repository...");
        let repo = Arc::new(SqliteRepository::new(&config.database_url).await?);
        repo.run_migrations().await?;
        tracing::info!("Database migrations completed.");

        let dedup: Arc<dyn DedupStore> = match config.dedup_backend {
            DedupBackend::Database => Arc::new(SqliteDedupStore::new(&repo)),
            DedupBackend::Memory => {
                tracing::info!("Using in-memory dedup store; cooldowns reset on restart.");
                Arc::new(InMemoryDedupStore::new())
            }
        };

        let publisher: Arc<dyn EventPublisher> = match &config.kafka {
            Some(kafka) => {
                tracing::info!(brokers = %kafka.brokers, "Publishing check events to Kafka.");
                Arc::new(create_kafka_publisher(kafka)?)
            }
            None => {
                tracing::info!("No Kafka brokers configured; check events go to stdout.");
                Arc::new(StdoutPublisher)
            }
        };

        if config.slack_webhook_url.is_none() {
            tracing::info!("No alert webhook configured; notifications are disabled.");
        }
        let notifier = Arc::new(NotificationService::new(
            config.slack_webhook_url.clone(),
            &config.http_retry,
        ));

        let metrics = Arc::new(ProbeMetrics::new()?);

        Ok(AppContext { config, repo, dedup, publisher, notifier, metrics })
    }
}
