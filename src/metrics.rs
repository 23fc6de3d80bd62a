//! Prometheus-style metrics for comparison runs.
//!
//! This module provides metrics for:
//! - Records canonicalized per book
//! - Records excluded per reason
//! - Duplicate quotes discarded
//! - Opportunities emitted and odds drops detected
//! - Comparison latency
//!
//! The library only emits; installing a recorder is up to the caller.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::engine::ExclusionReason;

// === Metric Name Constants ===

/// Comparison latency metric name.
pub const METRIC_COMPARISON_LATENCY: &str = "comparison_latency_ms";
/// Movement detection latency metric name.
pub const METRIC_MOVEMENT_LATENCY: &str = "movement_latency_ms";
/// Records canonicalized counter metric name.
pub const METRIC_RECORDS_CANONICALIZED: &str = "records_canonicalized_total";
/// Records excluded counter metric name.
pub const METRIC_RECORDS_EXCLUDED: &str = "records_excluded_total";
/// Duplicate quotes counter metric name.
pub const METRIC_DUPLICATE_QUOTES: &str = "duplicate_quotes_total";
/// Opportunities emitted counter metric name.
pub const METRIC_OPPORTUNITIES_EMITTED: &str = "opportunities_emitted_total";
/// Odds drops counter metric name.
pub const METRIC_ODDS_DROPS: &str = "odds_drops_total";

/// Initialize all metric descriptions.
/// Call this once after installing a recorder.
pub fn init_metrics() {
    // Latency histograms
    describe_histogram!(
        METRIC_COMPARISON_LATENCY,
        "Time to compare two book snapshots in milliseconds"
    );
    describe_histogram!(
        METRIC_MOVEMENT_LATENCY,
        "Time to compare two snapshots of one book in milliseconds"
    );

    // Counters
    describe_counter!(
        METRIC_RECORDS_CANONICALIZED,
        "Total number of raw records mapped to a canonical key"
    );
    describe_counter!(
        METRIC_RECORDS_EXCLUDED,
        "Total number of records or quotes excluded, by reason"
    );
    describe_counter!(
        METRIC_DUPLICATE_QUOTES,
        "Total number of duplicate quotes discarded"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_EMITTED,
        "Total number of positive-EV opportunities emitted"
    );
    describe_counter!(
        METRIC_ODDS_DROPS,
        "Total number of odds drops above the threshold"
    );

    debug!("Metrics initialized");
}

/// Increment records canonicalized counter.
pub fn inc_records_canonicalized(book: &str) {
    counter!(METRIC_RECORDS_CANONICALIZED, "book" => book.to_string()).increment(1);
}

/// Increment records excluded counter.
pub fn inc_records_excluded(reason: ExclusionReason) {
    counter!(METRIC_RECORDS_EXCLUDED, "reason" => reason.as_ref().to_string()).increment(1);
}

/// Increment duplicate quotes counter.
pub fn inc_duplicate_quotes(book: &str) {
    counter!(METRIC_DUPLICATE_QUOTES, "book" => book.to_string()).increment(1);
}

/// Add to the opportunities emitted counter.
pub fn add_opportunities_emitted(count: usize) {
    counter!(METRIC_OPPORTUNITIES_EMITTED).increment(count as u64);
}

/// Add to the odds drops counter.
pub fn add_odds_drops(count: usize) {
    counter!(METRIC_ODDS_DROPS).increment(count as u64);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a comparison run.
pub fn timer_comparison() -> LatencyTimer {
    LatencyTimer::new(METRIC_COMPARISON_LATENCY)
}

/// Create a latency timer for a movement run.
pub fn timer_movement() -> LatencyTimer {
    LatencyTimer::new(METRIC_MOVEMENT_LATENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn latency_timer_measures_time() {
        let timer = timer_comparison();
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 9.0);
    }

    #[test]
    fn emitting_without_recorder_is_a_no_op() {
        inc_records_excluded(ExclusionReason::UnmappedMarket);
        inc_duplicate_quotes("bet365");
        add_opportunities_emitted(3);
    }
}
