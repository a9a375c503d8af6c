//! Human-readable throughput reports.

use crate::stats::{StatsAggregator, StatsSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const COLUMN_WIDTH: usize = 10;

/// Render a snapshot as a single status line.
pub fn format_report(snapshot: &StatsSnapshot) -> String {
    let duration = humantime::format_duration(snapshot.elapsed).to_string();
    let rate = format!("{:.0}/sec", snapshot.rate());

    format!(
        "duration={:<w$} |   rate={:<w$}     |   sent={:<w$}    |   bytes={:<w$} |   errors={:<w$}",
        duration,
        rate,
        format_count(snapshot.messages_sent),
        format_bytes(snapshot.bytes_sent),
        format_count(snapshot.errors),
        w = COLUMN_WIDTH,
    )
}

/// Group digits in thousands: `1234567` becomes `1,234,567`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Size in SI units: `83 MB`, `9.9 kB`, `512 B`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 10 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else if value < 10.0 {
        format!("{:.1} {}", value, UNITS[unit])
    } else {
        format!("{:.0} {}", value, UNITS[unit])
    }
}

/// Print a report line every `period` until `token` is cancelled, then print
/// a final line.
///
/// # Panics
///
/// Panics if `period` is zero.
pub fn spawn_reporter(
    stats: Arc<StatsAggregator>,
    period: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    assert!(!period.is_zero(), "report period must be non-zero");

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    println!("{}", format_report(&stats.snapshot()));
                }
            }
        }

        println!("{}", format_report(&stats.snapshot()));
    })
}
