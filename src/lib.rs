// src/lib.rs
//! Optimistic rollup core.
//!
//! This crate is the embeddable batch/dispute engine of a layer-2 system:
//! - transaction intake into a bounded staging pool
//! - batch pipeline committing staged transactions through a pluggable
//!   transition function
//! - staked fraud challenges with verifier-driven resolution and rollback
//! - time-boxed finalization and aggregate metrics
//!
//! Execution, state storage, and fraud-proof checking are capability
//! traits injected at construction ([`interfaces`]); deterministic doubles
//! for all of them live in [`testing`]. Persistence, networking, and the
//! surrounding application surfaces are out of scope.

pub mod error;
pub mod interfaces;
pub mod rollup;
pub mod testing;

pub use error::{CapabilityError, RollupError};
pub use interfaces::{BatchTransitionFunction, FraudProofVerifier, StateAccessor};
pub use rollup::{
    Address, Batch, BatchResult, BatchStatus, Challenge, OptimisticRollup, RollupConfig,
    RollupMetrics, RollupState, SecurityLevel, StateRoot, Transaction, TransactionPool, TxHash,
};
