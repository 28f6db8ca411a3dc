//! Kafka-backed event publisher.

use std::time::Duration;

use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;

use crate::config::KafkaConfig;
use crate::publisher::{EventPublisher, PublisherError};

/// A Kafka event publisher.
pub struct KafkaEventPublisher {
    producer: FutureProducer,
}

#[async_trait::async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), PublisherError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map(|_| ())
            .map_err(|(kafka_error, _)| PublisherError::Kafka(kafka_error))?;

        Ok(())
    }

    async fn flush(&self, timeout: Duration) -> Result<(), PublisherError> {
        self.producer.flush(timeout).map_err(PublisherError::Kafka)
    }
}

/// Creates a new `KafkaEventPublisher` from the given `KafkaConfig`.
pub fn create_kafka_publisher(config: &KafkaConfig) -> Result<KafkaEventPublisher, PublisherError> {
    let mut client_config = ClientConfig::new();

    client_config
        .set("bootstrap.servers", &config.brokers)
        .set("message.timeout.ms", config.producer.message_timeout_ms.to_string())
        .set("compression.codec", &config.producer.compression_codec)
        .set("acks", &config.producer.acks);

    let producer = client_config.create::<FutureProducer>().map_err(PublisherError::Kafka)?;

    Ok(KafkaEventPublisher { producer })
}
