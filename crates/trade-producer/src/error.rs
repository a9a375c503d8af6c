//! Error types for the trade producer.

use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use thiserror::Error;

/// Errors raised while writing a batch to Kafka. Any of these ends the
/// production loop.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Publisher is closed")]
    Closed,

    #[error("Flush task failed: {0}")]
    Flush(#[from] tokio::task::JoinError),
}

/// Failure to open the control connection to a broker.
#[derive(Error, Debug)]
#[error("Failed to connect to broker {broker}: {source}")]
pub struct ConnectionError {
    pub broker: String,
    #[source]
    pub source: std::io::Error,
}

/// Errors raised by topic administration.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Failed to create topic {topic}: {code}")]
    TopicCreation {
        topic: String,
        code: RDKafkaErrorCode,
    },

    #[error("Broker returned no result for topic {topic}")]
    MissingResult { topic: String },
}

/// Invalid producer configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Broker address must not be empty")]
    EmptyBroker,

    #[error("Topic name must not be empty")]
    EmptyTopic,

    #[error("Partition count must be at least 1, got {0}")]
    InvalidPartitions(i32),
}
