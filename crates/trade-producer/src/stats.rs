//! Throughput statistics for the producer.
//!
//! The producer is the only writer; reporters read snapshots from other tasks.
//! All three counters sit behind one mutex so a snapshot never mixes values
//! from two different updates.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Cumulative counters reported by a publish client since it was opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub messages_acked: u64,
    pub errors: u64,
    pub bytes_written: u64,
}

impl ClientStats {
    /// Counter growth since `previous`. Saturates at zero if a counter went
    /// backwards, e.g. after a client reconnect reset it.
    pub fn delta_since(&self, previous: &ClientStats) -> ClientStats {
        ClientStats {
            messages_acked: self.messages_acked.saturating_sub(previous.messages_acked),
            errors: self.errors.saturating_sub(previous.errors),
            bytes_written: self.bytes_written.saturating_sub(previous.bytes_written),
        }
    }
}

#[derive(Debug)]
struct Totals {
    start_time: Instant,
    messages_sent: u64,
    errors: u64,
    bytes_sent: u64,
}

/// Point-in-time view of the aggregated counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub messages_sent: u64,
    pub errors: u64,
    pub bytes_sent: u64,
    pub start_time: Instant,
    /// Time since start, truncated to whole seconds.
    pub elapsed: Duration,
}

impl StatsSnapshot {
    /// Messages per second over the truncated elapsed time; 0 until at least
    /// one full second has passed and one message was sent.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs();
        if secs == 0 || self.messages_sent == 0 {
            return 0.0;
        }
        self.messages_sent as f64 / secs as f64
    }
}

/// Running totals of messages, errors and bytes sent.
#[derive(Debug)]
pub struct StatsAggregator {
    totals: Mutex<Totals>,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    /// Create an aggregator whose clock started at `start_time`.
    pub fn started_at(start_time: Instant) -> Self {
        Self {
            totals: Mutex::new(Totals {
                start_time,
                messages_sent: 0,
                errors: 0,
                bytes_sent: 0,
            }),
        }
    }

    pub fn start_time(&self) -> Instant {
        self.lock().start_time
    }

    /// Restart the clock at `start_time`. Counters are kept.
    pub fn restart_at(&self, start_time: Instant) {
        self.lock().start_time = start_time;
    }

    /// Add the deltas to the running totals.
    pub fn record(&self, messages_delta: u64, errors_delta: u64, bytes_delta: u64) {
        let mut totals = self.lock();
        totals.messages_sent = totals.messages_sent.saturating_add(messages_delta);
        totals.errors = totals.errors.saturating_add(errors_delta);
        totals.bytes_sent = totals.bytes_sent.saturating_add(bytes_delta);
    }

    /// Fold a client counter delta into the totals.
    pub fn record_client_delta(&self, delta: &ClientStats) {
        self.record(delta.messages_acked, delta.errors, delta.bytes_written);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let totals = self.lock();
        StatsSnapshot {
            messages_sent: totals.messages_sent,
            errors: totals.errors,
            bytes_sent: totals.bytes_sent,
            start_time: totals.start_time,
            elapsed: Duration::from_secs(totals.start_time.elapsed().as_secs()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Totals> {
        // Updates are plain adds, so a poisoned lock still holds valid totals.
        self.totals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_aggregator_is_empty() {
        let stats = StatsAggregator::new();
        let snapshot = stats.snapshot();

        assert_eq!(snapshot.messages_sent, 0);
        assert_eq!(snapshot.errors, 0);
        assert_eq!(snapshot.bytes_sent, 0);
    }

    #[test]
    fn test_record_accumulates() {
        let stats = StatsAggregator::new();

        stats.record(10, 0, 700);
        stats.record(5, 1, 300);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.messages_sent, 15);
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.bytes_sent, 1000);
    }

    #[test]
    fn test_rate_zero_at_start() {
        let stats = StatsAggregator::new();
        stats.record(1000, 0, 64_000);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.elapsed, Duration::ZERO);
        assert_eq!(snapshot.rate(), 0.0);
        assert!(snapshot.rate().is_finite());
    }

    #[test]
    fn test_rate_zero_without_messages() {
        let start = Instant::now()
            .checked_sub(Duration::from_secs(30))
            .expect("clock should allow 30s lookback");
        let stats = StatsAggregator::started_at(start);

        assert_eq!(stats.snapshot().rate(), 0.0);
    }

    #[test]
    fn test_rate_uses_truncated_seconds() {
        let start = Instant::now()
            .checked_sub(Duration::from_millis(10_900))
            .expect("clock should allow 11s lookback");
        let stats = StatsAggregator::started_at(start);
        stats.record(1000, 0, 0);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.elapsed.as_secs(), 10);
        assert_eq!(snapshot.elapsed.subsec_nanos(), 0);
        assert_eq!(snapshot.rate(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_clock_keeps_counters() {
        let stats = StatsAggregator::new();
        stats.record(5, 1, 50);
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(stats.snapshot().elapsed, Duration::from_secs(7));

        stats.restart_at(Instant::now());

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.elapsed, Duration::ZERO);
        assert_eq!(snapshot.messages_sent, 5);
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.bytes_sent, 50);
    }

    #[test]
    fn test_client_delta() {
        let previous = ClientStats {
            messages_acked: 10,
            errors: 1,
            bytes_written: 500,
        };
        let current = ClientStats {
            messages_acked: 14,
            errors: 1,
            bytes_written: 720,
        };

        assert_eq!(
            current.delta_since(&previous),
            ClientStats {
                messages_acked: 4,
                errors: 0,
                bytes_written: 220,
            }
        );
    }

    #[test]
    fn test_client_delta_saturates() {
        let previous = ClientStats {
            messages_acked: 10,
            errors: 2,
            bytes_written: 500,
        };

        assert_eq!(
            ClientStats::default().delta_since(&previous),
            ClientStats::default()
        );
    }

    #[test]
    fn test_concurrent_reader_sees_consistent_totals() {
        let stats = Arc::new(StatsAggregator::new());

        let reader = {
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    let snapshot = stats.snapshot();
                    // Every update adds 2 bytes per message.
                    assert_eq!(snapshot.bytes_sent, snapshot.messages_sent * 2);
                }
            })
        };

        for _ in 0..1000 {
            stats.record(1, 0, 2);
        }
        reader.join().unwrap();

        assert_eq!(stats.snapshot().messages_sent, 1000);
    }
}
