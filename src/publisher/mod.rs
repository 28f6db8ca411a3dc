//! Event publishing for completed checks.
//!
//! Publishing is at-most-once and best-effort: the probe pipeline logs and
//! discards any failure here, it never fails a probe because an event could
//! not be delivered.

mod error;
mod kafka;
mod stdout;

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub use error::PublisherError;
pub use kafka::{create_kafka_publisher, KafkaEventPublisher};
pub use stdout::StdoutPublisher;

/// Sink for compact check events.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one payload to `topic`, keyed for partitioning.
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), PublisherError>;

    /// Flushes any buffered events, waiting at most `timeout`.
    async fn flush(&self, timeout: Duration) -> Result<(), PublisherError>;
}
