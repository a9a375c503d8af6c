//! Synthetic trade event producer for Kafka load testing.
//!
//! This library generates a steady stream of random trade events and publishes
//! them to a Kafka topic at a fixed rate, tracking throughput as it goes.
//!
//! ## Features
//!
//! - **Rate pacing**: one batch of exactly `message_rate` records per second
//! - **Batch publishing**: each batch is handed to the publisher as one write
//! - **Statistics**: cumulative sent/error/byte counters with a report line
//! - **Topic management**: topic creation with a configurable partition count
//!
//! # Architecture
//!
//! ```text
//!   tick (1s)    ┌─────────────────┐  batch   ┌──────────────────┐
//!  ────────────▶ │  BatchProducer  │ ───────▶ │    Publisher     │ ──▶ Kafka topic
//!                │                 │          │ (KafkaPublisher) │
//!                │ - rng (StdRng)  │ ◀─────── │                  │
//!                │ - batch         │  stats   └──────────────────┘
//!                └────────┬────────┘
//!                         │ delta
//!                         ▼
//!                ┌─────────────────┐  snapshot  ┌──────────────┐
//!                │ StatsAggregator │ ─────────▶ │   reporter   │
//!                └─────────────────┘            └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use tokio_util::sync::CancellationToken;
//! use trade_producer::{BatchProducer, KafkaAdmin, KafkaPublisher, ProducerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProducerConfig::new("localhost:9092", "stocks", 4, 1000)?;
//!     let publisher = KafkaPublisher::new(&config)?;
//!     let mut producer = BatchProducer::new(config, publisher, StdRng::seed_from_u64(42));
//!
//!     producer.create_topic(&KafkaAdmin::new("localhost:9092")).await?;
//!
//!     let token = CancellationToken::new();
//!     producer.run(token).await?;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod args;
pub mod config;
pub mod error;
pub mod producer;
pub mod publish;
pub mod record;
pub mod report;
pub mod stats;

/// Client id reported to the broker by every connection this crate opens.
pub const CLIENT_ID: &str = "trade-loadgen";

// Re-exports for convenience
pub use admin::{KafkaAdmin, TopicAdmin};
pub use args::ProducerArgs;
pub use config::ProducerConfig;
pub use error::{AdminError, ConfigError, ConnectionError, PublishError};
pub use producer::{BatchProducer, ProducerState, REPLICATION_FACTOR, TICK_PERIOD};
pub use publish::{KafkaPublisher, Publisher};
pub use record::{Side, TradeRecord};
pub use report::{format_report, spawn_reporter};
pub use stats::{ClientStats, StatsAggregator, StatsSnapshot};
