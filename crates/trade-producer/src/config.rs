//! Producer configuration.

use crate::args::ProducerArgs;
use crate::error::ConfigError;

/// Validated, immutable producer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    broker_address: String,
    topic_name: String,
    partition_count: i32,
    message_rate: usize,
}

impl ProducerConfig {
    pub fn new(
        broker_address: impl Into<String>,
        topic_name: impl Into<String>,
        partition_count: i32,
        message_rate: usize,
    ) -> Result<Self, ConfigError> {
        let broker_address = broker_address.into().trim().to_string();
        let topic_name = topic_name.into().trim().to_string();

        if broker_address.is_empty() {
            return Err(ConfigError::EmptyBroker);
        }
        if topic_name.is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if partition_count < 1 {
            return Err(ConfigError::InvalidPartitions(partition_count));
        }

        Ok(Self {
            broker_address,
            topic_name,
            partition_count,
            message_rate,
        })
    }

    pub fn broker_address(&self) -> &str {
        &self.broker_address
    }

    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    pub fn partition_count(&self) -> i32 {
        self.partition_count
    }

    /// Records produced per one-second tick.
    pub fn message_rate(&self) -> usize {
        self.message_rate
    }
}

impl TryFrom<&ProducerArgs> for ProducerConfig {
    type Error = ConfigError;

    fn try_from(args: &ProducerArgs) -> Result<Self, Self::Error> {
        ProducerConfig::new(
            args.kafka_brokers.as_str(),
            args.topic.as_str(),
            args.partitions,
            args.message_rate,
        )
    }
}
