//! Error types for event publishers.

/// Errors that can occur while publishing check events.
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    /// Kafka error
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The event payload could not be serialized.
    #[error("Failed to serialize event payload: {0}")]
    Serialization(#[from] serde_json::Error),
}
