// src/interfaces/verifier_interface.rs
//! Fraud-proof verifier interface.

use crate::error::CapabilityError;
use crate::rollup::{Batch, Challenge};

/// Checks challenge evidence against committed batches.
///
/// `validate_challenge` is a cheap structural pre-check (for example,
/// non-empty evidence) run before a challenge is accepted; `verify` is the
/// full, potentially slow fraud-proof check and is bounded by the
/// configured proof-time limit.
pub trait FraudProofVerifier: Send + Sync {
    /// Fully verify a challenge's fraud claim. `Ok(true)` means the claim
    /// holds and the target batch must be rolled back.
    fn verify(&self, challenge: &Challenge) -> Result<bool, CapabilityError>;

    /// Produce fraud-proof evidence for a batch.
    fn generate_proof(&self, batch: &Batch) -> Result<Vec<u8>, CapabilityError>;

    /// Structural pre-check of a challenge, without running the full
    /// verification.
    fn validate_challenge(&self, challenge: &Challenge) -> bool;
}
