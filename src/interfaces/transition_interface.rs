// src/interfaces/transition_interface.rs
//! Batch transition function interface.
//!
//! The transition function is the pluggable execution layer: it decides
//! whether a staged set of transactions is admissible and what state the
//! ledger reaches after executing it. The core treats it as a black box and
//! only relies on the contract below.

use crate::error::CapabilityError;
use crate::rollup::{BatchResult, Transaction};

/// Validates and executes transaction sets into batch results.
///
/// `process` must be deterministic: the same underlying state and the same
/// input set must produce the same result. `validate` must reject an empty
/// set.
pub trait BatchTransitionFunction: Send + Sync {
    /// Check that the staged set is admissible without executing it.
    fn validate(&self, transactions: &[Transaction]) -> Result<(), CapabilityError>;

    /// Execute the staged set, producing the post-state root and gas
    /// accounting. The core stamps the batch number and measured duration
    /// onto the returned result.
    fn process(&self, transactions: &[Transaction]) -> Result<BatchResult, CapabilityError>;

    /// Reorder or compress the staged set before validation. Invoked only
    /// when compression is enabled in the rollup configuration.
    fn optimize(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>, CapabilityError>;
}
