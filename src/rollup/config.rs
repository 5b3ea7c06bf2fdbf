// src/rollup/config.rs
//! Rollup configuration.

use std::time::Duration;

use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Serialize};

/// Advisory security level, interpreted by the injected capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SecurityLevel {
    Low,
    Medium,
    High,
    Ultra,
}

/// Configuration for the rollup core.
///
/// Zero or negative values are replaced with defaults when the core is
/// constructed, so a partially filled config behaves like `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Maximum number of staged transactions, and therefore the maximum
    /// batch size.
    pub max_batch_size: usize,

    /// Window after a batch's commitment during which it may be disputed.
    pub challenge_period: Duration,

    /// Upper bound on a single fraud-proof verification call.
    pub max_proof_time: Duration,

    /// Whether to run the transition function's optimize step before
    /// validation.
    pub enable_compression: bool,

    /// Advisory security level passed through to capabilities.
    pub security_level: SecurityLevel,

    /// Minimum stake required to open a challenge.
    pub min_stake: BigInt,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            challenge_period: Duration::from_secs(7 * 24 * 60 * 60),
            max_proof_time: Duration::from_secs(30),
            enable_compression: false,
            security_level: SecurityLevel::Medium,
            min_stake: BigInt::from(1_000_000_000_000_000_000_u64),
        }
    }
}

impl RollupConfig {
    /// Replace unset (zero or non-positive) fields with their defaults.
    pub(crate) fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.max_batch_size == 0 {
            self.max_batch_size = defaults.max_batch_size;
        }
        if self.challenge_period.is_zero() {
            self.challenge_period = defaults.challenge_period;
        }
        if self.max_proof_time.is_zero() {
            self.max_proof_time = defaults.max_proof_time;
        }
        if self.min_stake.sign() != Sign::Plus {
            self.min_stake = defaults.min_stake;
        }
        self
    }
}
