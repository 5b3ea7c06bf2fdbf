// src/rollup/mod.rs
//! Optimistic rollup core.
//!
//! Transactions are staged in a bounded pool, committed in numbered batches
//! through a pluggable transition function, and assumed valid immediately.
//! Any party may dispute a batch with a staked fraud claim during its
//! challenge window; a batch becomes final only once that window lapses
//! with no unresolved claim standing against it.

mod config;
mod metrics;
mod optimistic_rollup;
mod transaction_pool;
mod types;

pub use config::{RollupConfig, SecurityLevel};
pub use metrics::RollupMetrics;
pub use optimistic_rollup::OptimisticRollup;
pub use transaction_pool::TransactionPool;
pub use types::{
    Address, Batch, BatchResult, BatchStatus, Challenge, RollupState, StateRoot, Transaction,
    TxHash,
};
