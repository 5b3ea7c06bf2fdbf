// src/error.rs
//! Error types for the rollup core.
//!
//! Every failure a caller can correct gets its own variant so that callers
//! can branch on the exact rejection. Collaborator failures (transition
//! function, state accessor, fraud-proof verifier) are wrapped in a variant
//! naming the stage that failed, with the underlying error preserved as the
//! source.

use std::time::Duration;

use num_bigint::BigInt;
use thiserror::Error;

/// Error type produced by injected capability implementations.
///
/// Capabilities choose their own concrete error types; the core only needs
/// to carry them across the boundary and report which stage they came from.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the rollup core.
#[derive(Error, Debug)]
pub enum RollupError {
    /// Transaction id is empty
    #[error("transaction id cannot be empty")]
    EmptyTransactionId,

    /// Transaction value is negative
    #[error("transaction value cannot be negative")]
    NegativeValue,

    /// Gas limit is zero
    #[error("gas limit must be greater than zero")]
    ZeroGasLimit,

    /// Gas price is zero or negative
    #[error("gas price must be greater than zero")]
    NonPositiveGasPrice,

    /// Signature bytes are missing
    #[error("transaction must be signed")]
    MissingSignature,

    /// Timestamp is zero
    #[error("transaction must carry a timestamp")]
    ZeroTimestamp,

    /// Staging queue is at capacity
    #[error("staging queue is full ({limit} transactions)")]
    QueueFull { limit: usize },

    /// Batch processing requested with nothing staged
    #[error("no transactions to process")]
    EmptyBatch,

    /// The transition function rejected the optimize step
    #[error("batch optimization failed")]
    Optimization(#[source] CapabilityError),

    /// The transition function rejected the staged set
    #[error("batch validation failed")]
    Validation(#[source] CapabilityError),

    /// The transition function failed to execute the staged set
    #[error("batch execution failed")]
    Processing(#[source] CapabilityError),

    /// The state accessor failed to commit
    #[error("state commit failed")]
    StateCommit(#[source] CapabilityError),

    /// The state accessor failed to roll back
    #[error("state rollback failed")]
    StateRollback(#[source] CapabilityError),

    /// No batch with the given number
    #[error("batch {0} not found")]
    BatchNotFound(u64),

    /// Batch is already finalized
    #[error("batch {0} already finalized")]
    BatchAlreadyFinalized(u64),

    /// Challenge window for the batch has already closed
    #[error("challenge period for batch {0} has expired")]
    ChallengePeriodExpired(u64),

    /// Challenge window for the batch has not yet closed
    #[error("challenge period for batch {0} is still open")]
    ChallengePeriodOpen(u64),

    /// Batch still has at least one unresolved challenge
    #[error("batch {0} has unresolved challenges")]
    UnresolvedChallenge(u64),

    /// Offered stake is below the configured floor
    #[error("stake {stake} below minimum requirement {minimum}")]
    StakeBelowMinimum { stake: BigInt, minimum: BigInt },

    /// Evidence failed the verifier's structural pre-check
    #[error("challenge evidence rejected by structural validation")]
    InvalidEvidence,

    /// No challenge with the given id
    #[error("challenge {0} not found")]
    ChallengeNotFound(String),

    /// Challenge was already resolved
    #[error("challenge {0} already resolved")]
    ChallengeAlreadyResolved(String),

    /// The verifier reported an error while checking a fraud proof
    #[error("fraud proof verification failed")]
    Verification(#[source] CapabilityError),

    /// The verifier did not answer within the configured proof-time bound
    #[error("fraud proof verification exceeded {0:?}")]
    ProofTimeout(Duration),
}
