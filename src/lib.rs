//! trade-loadgen library
//!
//! Support code for the `trade-loadgen` binary. The production loop, Kafka
//! publishing and statistics live in the `trade_producer` crate.
//!
//! # CLI Usage
//!
//! ```bash
//! # Create the topic, then publish 1000 trade events per second
//! trade-loadgen run --kafka-brokers localhost:9092 --topic stocks --create-topic
//!
//! # Only create the topic
//! trade-loadgen create-topic --topic stocks --partitions 4
//! ```

pub mod config;
