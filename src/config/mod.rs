//! Application configuration: file + environment loading and typed settings.

mod app_config;
mod http_retry;
mod kafka;
mod server;

pub use app_config::{AppConfig, DedupBackend};
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use kafka::{KafkaConfig, KafkaProducerConfig};
pub use server::ServerConfig;

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Deserializes a `Duration` from a millisecond count.
pub(crate) fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Deserializes a `Duration` from a second count.
pub(crate) fn deserialize_duration_from_seconds<'de, D>(
    deserializer: D,
) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}
