//! Configuration for the Kafka event publisher.

use serde::{Deserialize, Serialize};

/// Connection settings for publishing check events to Kafka. Absence of this
/// section selects the stdout publisher instead.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KafkaConfig {
    /// Comma-separated list of Kafka broker addresses.
    pub brokers: String,

    /// Producer-specific configuration properties.
    #[serde(default)]
    pub producer: KafkaProducerConfig,
}

/// Producer tuning, mapped onto librdkafka properties.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KafkaProducerConfig {
    /// The maximum time in milliseconds to wait for a message to be sent.
    /// librdkafka property: `message.timeout.ms`
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,

    /// The compression codec to use for compressing message sets.
    /// librdkafka property: `compression.codec`
    #[serde(default = "default_compression_codec")]
    pub compression_codec: String,

    /// Required broker acknowledgments before a send is considered complete.
    /// librdkafka property: `acks`
    #[serde(default = "default_acks")]
    pub acks: String,
}

fn default_message_timeout_ms() -> u64 {
    5000
}
fn default_compression_codec() -> String {
    "none".to_string()
}
fn default_acks() -> String {
    "all".to_string()
}

impl Default for KafkaProducerConfig {
    fn default() -> Self {
        Self {
            message_timeout_ms: default_message_timeout_ms(),
            compression_codec: default_compression_codec(),
            acks: default_acks(),
        }
    }
}
