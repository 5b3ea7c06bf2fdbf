// src/rollup/metrics.rs
//! Aggregate rollup counters.
//!
//! Metrics are folded incrementally as batches commit and challenges are
//! raised; nothing here is ever recomputed from the full history.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::types::BatchResult;

/// Running aggregates over the rollup's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RollupMetrics {
    /// Successfully committed batches
    pub total_batches: u64,
    /// Transactions across all committed batches
    pub total_transactions: u64,
    /// Gas across all committed batches
    pub total_gas_used: u64,
    /// Challenges ever raised
    pub total_challenges: u64,
    /// Arithmetic mean of per-batch processing time
    pub average_batch_time: Duration,
    /// total_challenges / total_batches, 0.0 before the first batch
    pub challenge_rate: f64,
    /// Time of the most recent fold
    pub last_update: SystemTime,
}

impl Default for RollupMetrics {
    fn default() -> Self {
        Self {
            total_batches: 0,
            total_transactions: 0,
            total_gas_used: 0,
            total_challenges: 0,
            average_batch_time: Duration::ZERO,
            challenge_rate: 0.0,
            last_update: UNIX_EPOCH,
        }
    }
}

impl RollupMetrics {
    /// Fold one committed batch into the aggregates.
    ///
    /// The running mean is updated as `(old * (n-1) + d) / n`; the first
    /// batch sets it directly. Gas and transaction totals saturate rather
    /// than wrap.
    pub(crate) fn record_batch(&mut self, result: &BatchResult) {
        self.total_batches += 1;
        self.total_transactions = self
            .total_transactions
            .saturating_add(result.transaction_count as u64);
        self.total_gas_used = self.total_gas_used.saturating_add(result.gas_used);

        let n = self.total_batches as u128;
        let previous = self.average_batch_time.as_nanos();
        let sample = result.processing_time.as_nanos();
        let average = (previous * (n - 1) + sample) / n;
        self.average_batch_time =
            Duration::from_nanos(u64::try_from(average).unwrap_or(u64::MAX));

        self.recompute_challenge_rate();
        self.last_update = SystemTime::now();
    }

    /// Fold one accepted challenge into the aggregates.
    pub(crate) fn record_challenge(&mut self) {
        self.total_challenges += 1;
        self.recompute_challenge_rate();
        self.last_update = SystemTime::now();
    }

    fn recompute_challenge_rate(&mut self) {
        self.challenge_rate = if self.total_batches == 0 {
            0.0
        } else {
            self.total_challenges as f64 / self.total_batches as f64
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::StateRoot;

    fn result_with(processing_time: Duration, gas_used: u64, transactions: usize) -> BatchResult {
        BatchResult {
            batch_number: 0,
            state_root: StateRoot::default(),
            gas_used,
            transaction_count: transactions,
            processing_time,
            success: true,
            error: None,
        }
    }

    #[test]
    fn test_first_batch_sets_average_directly() {
        let mut metrics = RollupMetrics::default();
        metrics.record_batch(&result_with(Duration::from_millis(120), 42_000, 2));

        assert_eq!(metrics.total_batches, 1);
        assert_eq!(metrics.total_transactions, 2);
        assert_eq!(metrics.total_gas_used, 42_000);
        assert_eq!(metrics.average_batch_time, Duration::from_millis(120));
    }

    #[test]
    fn test_average_is_mean_of_durations() {
        let mut metrics = RollupMetrics::default();
        let durations = [10_u64, 20, 60];
        for d in durations {
            metrics.record_batch(&result_with(Duration::from_millis(d), 21_000, 1));
        }

        assert_eq!(metrics.total_batches, 3);
        assert_eq!(metrics.average_batch_time, Duration::from_millis(30));
        assert_eq!(metrics.total_gas_used, 63_000);
        assert_eq!(metrics.total_transactions, 3);
    }

    #[test]
    fn test_challenge_rate_guards_divide_by_zero() {
        let mut metrics = RollupMetrics::default();
        metrics.record_challenge();
        assert_eq!(metrics.total_challenges, 1);
        assert_eq!(metrics.challenge_rate, 0.0);

        metrics.record_batch(&result_with(Duration::from_millis(5), 21_000, 1));
        assert_eq!(metrics.challenge_rate, 1.0);

        metrics.record_batch(&result_with(Duration::from_millis(5), 21_000, 1));
        assert_eq!(metrics.challenge_rate, 0.5);
    }

    #[test]
    fn test_gas_total_saturates() {
        let mut metrics = RollupMetrics::default();
        metrics.record_batch(&result_with(Duration::from_millis(1), u64::MAX - 10, 1));
        metrics.record_batch(&result_with(Duration::from_millis(1), 100, 1));
        assert_eq!(metrics.total_gas_used, u64::MAX);
    }
}
