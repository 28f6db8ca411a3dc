//! Top-level application configuration.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, HttpRetryConfig, KafkaConfig,
    ServerConfig,
};

/// Provides the default value for latency_threshold_ms.
fn default_latency_threshold() -> Duration {
    Duration::from_millis(2000)
}

/// Provides the default value for alert_cooldown_secs.
fn default_alert_cooldown() -> Duration {
    Duration::from_secs(300)
}

/// Provides the default value for metrics_window_minutes.
fn default_metrics_window_minutes() -> u64 {
    60
}

/// Provides the default value for shutdown_timeout_secs.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Provides the default value for event_topic.
fn default_event_topic() -> String {
    "health_checks".to_string()
}

/// Which dedup marker store backs the alert gate.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DedupBackend {
    /// Markers live in the shared database; cooldowns survive restarts and
    /// are visible to every process on the same database.
    #[default]
    Database,
    /// Markers live in a process-local TTL map.
    Memory,
}

/// Application configuration for pulseatlas.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Database URL for the SQLite database.
    pub database_url: String,

    /// Latency above which a completed probe triggers an alert.
    #[serde(
        default = "default_latency_threshold",
        deserialize_with = "deserialize_duration_from_ms",
        rename = "latency_threshold_ms"
    )]
    pub latency_threshold: Duration,

    /// Suppression window after an alert for a service has been sent.
    #[serde(
        default = "default_alert_cooldown",
        deserialize_with = "deserialize_duration_from_seconds",
        rename = "alert_cooldown_secs"
    )]
    pub alert_cooldown: Duration,

    /// Size of the trailing window the rolling metrics are computed over.
    #[serde(default = "default_metrics_window_minutes")]
    pub metrics_window_minutes: u64,

    /// Slack-style incoming webhook for alert notifications. Absent disables
    /// outbound notifications.
    #[serde(default)]
    pub slack_webhook_url: Option<Url>,

    /// Topic the per-check events are published to.
    #[serde(default = "default_event_topic")]
    pub event_topic: String,

    /// Kafka connection for event publishing. Absent selects the stdout
    /// publisher.
    #[serde(default)]
    pub kafka: Option<KafkaConfig>,

    /// Which store backs alert deduplication.
    #[serde(default)]
    pub dedup_backend: DedupBackend,

    /// Retry policy for webhook notifications.
    #[serde(default)]
    pub http_retry: HttpRetryConfig,

    /// The maximum time in seconds to wait for graceful shutdown.
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration_from_seconds",
        rename = "shutdown_timeout_secs"
    )]
    pub shutdown_timeout: Duration,

    /// HTTP API server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            latency_threshold: default_latency_threshold(),
            alert_cooldown: default_alert_cooldown(),
            metrics_window_minutes: default_metrics_window_minutes(),
            slack_webhook_url: None,
            event_topic: default_event_topic(),
            kafka: None,
            dedup_backend: DedupBackend::default(),
            http_retry: HttpRetryConfig::default(),
            shutdown_timeout: default_shutdown_timeout(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory,
    /// with `PULSE__`-prefixed environment variables taking precedence.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("PULSE").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn database_url(mut self, url: &str) -> Self {
        self.config.database_url = url.to_string();
        self
    }

    pub fn latency_threshold_ms(mut self, ms: u64) -> Self {
        self.config.latency_threshold = Duration::from_millis(ms);
        self
    }

    pub fn alert_cooldown_secs(mut self, secs: u64) -> Self {
        self.config.alert_cooldown = Duration::from_secs(secs);
        self
    }

    pub fn metrics_window_minutes(mut self, minutes: u64) -> Self {
        self.config.metrics_window_minutes = minutes;
        self
    }

    pub fn slack_webhook_url(mut self, url: &str) -> Self {
        self.config.slack_webhook_url = Some(url.parse().expect("invalid webhook url"));
        self
    }

    pub fn server_enabled(mut self, enabled: bool) -> Self {
        self.config.server.enabled = enabled;
        self
    }

    pub fn dedup_backend(mut self, backend: DedupBackend) -> Self {
        self.config.dedup_backend = backend;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_builder() {
        let config = AppConfig::builder()
            .database_url("sqlite::memory:")
            .latency_threshold_ms(1500)
            .alert_cooldown_secs(60)
            .metrics_window_minutes(30)
            .build();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.latency_threshold, Duration::from_millis(1500));
        assert_eq!(config.alert_cooldown, Duration::from_secs(60));
        assert_eq!(config.metrics_window_minutes, 30);
        assert_eq!(config.dedup_backend, DedupBackend::Database);
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.latency_threshold, Duration::from_millis(2000));
        assert_eq!(config.alert_cooldown, Duration::from_secs(300));
        assert_eq!(config.metrics_window_minutes, 60);
        assert_eq!(config.event_topic, "health_checks");
        assert!(config.kafka.is_none());
        assert!(config.slack_webhook_url.is_none());
    }

    #[test]
    fn test_app_config_from_file() {
        let config_content = r#"
        database_url: "sqlite::memory:"
        latency_threshold_ms: 2500
        alert_cooldown_secs: 120
        metrics_window_minutes: 15
        slack_webhook_url: "https://hooks.slack.com/services/T000/B000/XXX"
        dedup_backend: memory
        server:
          enabled: false
        "#;
        let temp_dir = tempfile::tempdir().unwrap();
        let app_yaml_path = temp_dir.path().join("app.yaml");
        std::fs::write(&app_yaml_path, config_content).unwrap();

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.latency_threshold, Duration::from_millis(2500));
        assert_eq!(config.alert_cooldown, Duration::from_secs(120));
        assert_eq!(config.metrics_window_minutes, 15);
        assert!(config.slack_webhook_url.is_some());
        assert_eq!(config.dedup_backend, DedupBackend::Memory);
        assert!(!config.server.enabled);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_app_config_with_kafka_section() {
        let config_content = r#"
        database_url: "sqlite:pulse.db"
        kafka:
          brokers: "localhost:9092"
          producer:
            message_timeout_ms: 2500
        "#;
        let temp_dir = tempfile::tempdir().unwrap();
        let app_yaml_path = temp_dir.path().join("app.yaml");
        std::fs::write(&app_yaml_path, config_content).unwrap();

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();

        let kafka = config.kafka.expect("kafka section parsed");
        assert_eq!(kafka.brokers, "localhost:9092");
        assert_eq!(kafka.producer.message_timeout_ms, 2500);
        assert_eq!(kafka.producer.acks, "all");
    }
}
