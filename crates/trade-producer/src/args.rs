//! CLI argument definitions for the trade producer.

use clap::Args;

/// Kafka connection and production rate arguments.
#[derive(Args, Clone, Debug)]
pub struct ProducerArgs {
    /// Kafka broker address (e.g., "localhost:9092")
    #[arg(long, env = "KAFKA_BROKERS", default_value = "localhost:9092")]
    pub kafka_brokers: String,

    /// Topic to publish trade events to
    #[arg(long, env = "KAFKA_TOPIC", default_value = "stocks")]
    pub topic: String,

    /// Number of partitions used when creating the topic
    #[arg(long, default_value = "4")]
    pub partitions: i32,

    /// Number of messages produced per second
    #[arg(long, default_value = "1000")]
    pub message_rate: usize,

    /// Random seed for deterministic generation (omit to seed from the OS)
    #[arg(long)]
    pub seed: Option<u64>,
}
