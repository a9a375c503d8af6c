//! Rate-paced batch producer.
//!
//! The producer wakes once per tick, synthesizes exactly `message_rate`
//! records, publishes them as one batch and folds the publisher's counter
//! delta into its [`StatsAggregator`]. Publishing is awaited inline, so a slow
//! broker delays the next tick instead of letting batches pile up.
//!
//! ```text
//!          run starts            publish ok
//!   Idle ─────────────▶ Ticking ◀─────────── Publishing
//!                         │   └─────────────▶    │
//!             cancelled   │       tick fires     │ publish error
//!                         ▼                      ▼
//!                      Stopped                 Failed
//! ```
//!
//! The stats clock restarts when `run` starts, so setup work done between
//! construction and `run` does not count towards the reported rate.

use crate::admin::TopicAdmin;
use crate::config::ProducerConfig;
use crate::error::{AdminError, PublishError};
use crate::publish::Publisher;
use crate::record::TradeRecord;
use crate::stats::{ClientStats, StatsAggregator};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Period between two production cycles.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Replication factor used for topics created by the producer.
pub const REPLICATION_FACTOR: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerState {
    Idle,
    Ticking,
    Publishing,
    /// Stopped by cancellation.
    Stopped,
    /// Stopped by a publish error.
    Failed,
}

impl ProducerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProducerState::Stopped | ProducerState::Failed)
    }
}

/// Produces one batch of random trade records per tick.
pub struct BatchProducer<P, R> {
    config: ProducerConfig,
    publisher: P,
    rng: R,
    batch: Vec<TradeRecord>,
    stats: Arc<StatsAggregator>,
    last_client_stats: ClientStats,
    state: ProducerState,
}

impl<P, R> BatchProducer<P, R>
where
    P: Publisher,
    R: Rng + Send,
{
    /// Create a producer that owns `publisher` and draws records from `rng`.
    pub fn new(config: ProducerConfig, publisher: P, rng: R) -> Self {
        let batch = Vec::with_capacity(config.message_rate());
        Self {
            config,
            publisher,
            rng,
            batch,
            stats: Arc::new(StatsAggregator::new()),
            last_client_stats: ClientStats::default(),
            state: ProducerState::Idle,
        }
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    pub fn state(&self) -> ProducerState {
        self.state
    }

    /// Shared handle to the running totals, for reporters on other tasks.
    pub fn stats(&self) -> Arc<StatsAggregator> {
        Arc::clone(&self.stats)
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Create the configured topic through `admin`.
    ///
    /// An existing topic is reported as [`AdminError::TopicCreation`].
    pub async fn create_topic<A>(&self, admin: &A) -> Result<(), AdminError>
    where
        A: TopicAdmin + ?Sized,
    {
        info!(
            "Creating topic '{}' with {} partitions",
            self.config.topic_name(),
            self.config.partition_count()
        );
        admin
            .create_topic(
                self.config.topic_name(),
                self.config.partition_count(),
                REPLICATION_FACTOR,
            )
            .await
    }

    /// Produce until `token` is cancelled or a publish fails.
    ///
    /// Cancellation ends the loop with `Ok(())`; a batch already handed to the
    /// publisher is completed and counted first. A publish error ends the loop
    /// and is returned as-is. The publisher is closed on both paths.
    pub async fn run(&mut self, token: CancellationToken) -> Result<(), PublishError> {
        if self.state.is_terminal() {
            return Err(PublishError::Closed);
        }

        info!(
            "Producing {} messages/sec to topic '{}'",
            self.config.message_rate(),
            self.config.topic_name()
        );

        self.stats.restart_at(Instant::now());
        self.state = ProducerState::Ticking;
        let outcome = self.produce(&token).await;

        if let Err(e) = self.publisher.close().await {
            match outcome {
                Ok(()) => warn!("Failed to close publisher: {}", e),
                Err(_) => debug!("Failed to close publisher after publish error: {}", e),
            }
        }

        match &outcome {
            Ok(()) => info!("Producer stopped"),
            Err(e) => error!("Producer failed: {}", e),
        }
        outcome
    }

    async fn produce(&mut self, token: &CancellationToken) -> Result<(), PublishError> {
        let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    self.state = ProducerState::Stopped;
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            self.state = ProducerState::Publishing;
            self.fill_batch();

            let result = self.publisher.publish(&self.batch).await;
            let batch_len = self.batch.len();
            self.batch.clear();
            self.fold_client_stats();

            match result {
                Ok(()) => {
                    self.state = ProducerState::Ticking;
                    debug!("Published batch of {} messages", batch_len);
                }
                Err(e) => {
                    self.state = ProducerState::Failed;
                    return Err(e);
                }
            }
        }
    }

    fn fill_batch(&mut self) {
        let rng = &mut self.rng;
        self.batch.extend(
            std::iter::repeat_with(|| TradeRecord::random(&mut *rng))
                .take(self.config.message_rate()),
        );
    }

    fn fold_client_stats(&mut self) {
        let current = self.publisher.stats();
        let delta = current.delta_since(&self.last_client_stats);
        self.last_client_stats = current;
        self.stats.record_client_delta(&delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Publisher that records batch sizes and acknowledges everything.
    #[derive(Default)]
    struct CountingPublisher {
        batch_sizes: Vec<usize>,
        stats: ClientStats,
        closed: bool,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    #[async_trait]
    impl Publisher for CountingPublisher {
        async fn publish(&mut self, batch: &[TradeRecord]) -> Result<(), PublishError> {
            self.batch_sizes.push(batch.len());
            self.stats.messages_acked += batch.len() as u64;
            if let Some((limit, token)) = &self.cancel_after {
                if self.batch_sizes.len() >= *limit {
                    token.cancel();
                }
            }
            Ok(())
        }

        fn stats(&self) -> ClientStats {
            self.stats
        }

        async fn close(&mut self) -> Result<(), PublishError> {
            self.closed = true;
            Ok(())
        }
    }

    fn producer(
        rate: usize,
        publisher: CountingPublisher,
    ) -> BatchProducer<CountingPublisher, StdRng> {
        let config = ProducerConfig::new("localhost:9092", "trades", 1, rate).unwrap();
        BatchProducer::new(config, publisher, StdRng::seed_from_u64(42))
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_size_matches_rate() {
        for rate in [0usize, 1, 1000] {
            let token = CancellationToken::new();
            let publisher = CountingPublisher {
                cancel_after: Some((3, token.clone())),
                ..Default::default()
            };
            let mut producer = producer(rate, publisher);

            producer.run(token).await.unwrap();

            assert_eq!(producer.publisher().batch_sizes, vec![rate; 3]);
            assert_eq!(producer.stats().snapshot().messages_sent, 3 * rate as u64);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let token = CancellationToken::new();
        token.cancel();
        let mut producer = producer(10, CountingPublisher::default());

        producer.run(token).await.unwrap();

        assert!(producer.publisher().batch_sizes.is_empty());
        assert!(producer.publisher().closed);
        assert_eq!(producer.state(), ProducerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let token = CancellationToken::new();
        let mut producer = producer(5, CountingPublisher::default());

        let cancel = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(900)).await;
                token.cancel();
            })
        };

        producer.run(token).await.unwrap();
        cancel.await.unwrap();

        assert!(producer.publisher().batch_sizes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_for_first_tick_is_ticking() {
        let token = CancellationToken::new();
        let mut producer = producer(5, CountingPublisher::default());

        {
            let run = producer.run(token);
            tokio::pin!(run);
            tokio::select! {
                _ = &mut run => panic!("run should still be waiting for the first tick"),
                _ = tokio::time::sleep(Duration::from_millis(500)) => {}
            }
        }

        assert_eq!(producer.state(), ProducerState::Ticking);
        assert!(producer.publisher().batch_sizes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_after_stop_is_rejected() {
        let token = CancellationToken::new();
        token.cancel();
        let mut producer = producer(1, CountingPublisher::default());
        producer.run(token.clone()).await.unwrap();

        let result = producer.run(token).await;
        assert!(matches!(result, Err(PublishError::Closed)));
    }

    #[test]
    fn test_initial_state() {
        let producer = producer(1, CountingPublisher::default());
        assert_eq!(producer.state(), ProducerState::Idle);
        assert!(!producer.state().is_terminal());
    }

    #[test]
    fn test_fill_batch_clears_between_ticks() {
        let mut producer = producer(4, CountingPublisher::default());

        producer.fill_batch();
        assert_eq!(producer.batch.len(), 4);
        producer.batch.clear();
        producer.fill_batch();
        assert_eq!(producer.batch.len(), 4);
        assert!(producer.batch.capacity() >= 4);
    }
}
