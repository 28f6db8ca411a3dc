//! Stdout event publisher, used when no Kafka brokers are configured.

use std::time::Duration;

use crate::publisher::{EventPublisher, PublisherError};

/// Writes each event to standard output instead of a broker.
#[derive(Debug, Default)]
pub struct StdoutPublisher;

#[async_trait::async_trait]
impl EventPublisher for StdoutPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), PublisherError> {
        println!("=== Event [{}] key={} ===\n{}\n", topic, key, String::from_utf8_lossy(payload));
        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), PublisherError> {
        Ok(())
    }
}
