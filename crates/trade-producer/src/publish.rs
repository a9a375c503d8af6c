//! Batch publishing to Kafka.

use crate::config::ProducerConfig;
use crate::error::PublishError;
use crate::record::TradeRecord;
use crate::stats::ClientStats;
use crate::CLIENT_ID;
use async_trait::async_trait;
use futures::future::join_all;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{debug, info};

/// Time a message may wait in the client queue before `send` gives up.
const QUEUE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for flushing outstanding messages on close.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Capability that delivers a whole batch to the broker.
#[async_trait]
pub trait Publisher: Send {
    /// Deliver every record in `batch`. Returns once all deliveries settled.
    async fn publish(&mut self, batch: &[TradeRecord]) -> Result<(), PublishError>;

    /// Cumulative client counters since the publisher was opened.
    fn stats(&self) -> ClientStats;

    /// Flush and release the client. Publishing afterwards fails with
    /// [`PublishError::Closed`].
    async fn close(&mut self) -> Result<(), PublishError>;
}

/// [`Publisher`] backed by an rdkafka `FutureProducer`.
pub struct KafkaPublisher {
    producer: Option<FutureProducer>,
    topic: String,
    stats: ClientStats,
}

impl KafkaPublisher {
    /// Create a producer for the configured broker and topic.
    pub fn new(config: &ProducerConfig) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.broker_address())
            .set("client.id", CLIENT_ID)
            .set("message.timeout.ms", "5000")
            .set("queue.buffering.max.messages", "100000")
            .set("linger.ms", "5")
            .create()?;

        info!(
            "Created Kafka producer for topic '{}' on {}",
            config.topic_name(),
            config.broker_address()
        );

        Ok(Self {
            producer: Some(producer),
            topic: config.topic_name().to_string(),
            stats: ClientStats::default(),
        })
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&mut self, batch: &[TradeRecord]) -> Result<(), PublishError> {
        let producer = self.producer.as_ref().ok_or(PublishError::Closed)?;
        if batch.is_empty() {
            return Ok(());
        }

        // Encode everything up front so a bad record fails the batch before
        // anything reaches the broker.
        let payloads = batch
            .iter()
            .map(TradeRecord::to_payload)
            .collect::<Result<Vec<_>, _>>()?;

        let deliveries = payloads.iter().map(|payload| {
            let record = FutureRecord::<(), _>::to(&self.topic).payload(payload);
            producer.send(record, QUEUE_TIMEOUT)
        });
        let results = join_all(deliveries).await;

        let mut first_error = None;
        for (payload, result) in payloads.iter().zip(results) {
            match result {
                Ok(_) => {
                    self.stats.messages_acked += 1;
                    self.stats.bytes_written += payload.len() as u64;
                }
                Err((err, _)) => {
                    self.stats.errors += 1;
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(PublishError::Kafka(err)),
            None => {
                debug!("Delivered {} messages to '{}'", batch.len(), self.topic);
                Ok(())
            }
        }
    }

    fn stats(&self) -> ClientStats {
        self.stats
    }

    async fn close(&mut self) -> Result<(), PublishError> {
        let Some(producer) = self.producer.take() else {
            return Ok(());
        };

        // librdkafka's flush blocks the calling thread until the queue drains.
        tokio::task::spawn_blocking(move || producer.flush(FLUSH_TIMEOUT)).await??;
        info!("Kafka producer for topic '{}' closed", self.topic);
        Ok(())
    }
}
