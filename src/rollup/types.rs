// src/rollup/types.rs
//! Core data types: transactions, batches, challenges, and snapshots.

use std::fmt;
use std::time::{Duration, SystemTime};

use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::config::RollupConfig;
use super::metrics::RollupMetrics;
use crate::error::RollupError;

/// A 20-byte account identity (sender, recipient, challenger).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

/// A 32-byte digest summarizing committed key/value state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StateRoot(pub [u8; 32]);

impl StateRoot {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateRoot({})", hex::encode(self.0))
    }
}

/// A transaction's content hash; its identity within the rollup.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", hex::encode(self.0))
    }
}

/// A rollup transaction. Immutable once accepted into the staging pool;
/// `rollup_hash` is stamped at acceptance and is the transaction's identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-assigned id
    pub id: String,
    /// Sender account
    pub sender: Address,
    /// Recipient account
    pub recipient: Address,
    /// Transferred value, non-negative
    pub value: BigInt,
    /// Opaque payload
    pub data: Vec<u8>,
    /// Sender nonce
    pub nonce: u64,
    /// Signature bytes, non-empty
    pub signature: Vec<u8>,
    /// Unix timestamp in seconds, non-zero
    pub timestamp: u64,
    /// Gas limit, greater than zero
    pub gas_limit: u64,
    /// Gas price, greater than zero
    pub gas_price: BigInt,
    /// Content hash, stamped by the staging pool
    pub rollup_hash: TxHash,
}

impl Transaction {
    /// Check the transaction's fields, returning the first violation.
    pub fn validate(&self) -> Result<(), RollupError> {
        if self.id.is_empty() {
            return Err(RollupError::EmptyTransactionId);
        }
        if self.value.sign() == Sign::Minus {
            return Err(RollupError::NegativeValue);
        }
        if self.gas_limit == 0 {
            return Err(RollupError::ZeroGasLimit);
        }
        if self.gas_price.sign() != Sign::Plus {
            return Err(RollupError::NonPositiveGasPrice);
        }
        if self.signature.is_empty() {
            return Err(RollupError::MissingSignature);
        }
        if self.timestamp == 0 {
            return Err(RollupError::ZeroTimestamp);
        }
        Ok(())
    }

    /// SHA-256 content hash over every field except `rollup_hash` itself.
    ///
    /// Variable-length fields are length-prefixed so that field boundaries
    /// cannot shift between distinct transactions.
    pub fn content_hash(&self) -> TxHash {
        let mut hasher = Sha256::new();
        hash_bytes(&mut hasher, self.id.as_bytes());
        hasher.update(self.sender.as_bytes());
        hasher.update(self.recipient.as_bytes());
        hash_bytes(&mut hasher, &self.value.to_signed_bytes_be());
        hash_bytes(&mut hasher, &self.data);
        hasher.update(self.nonce.to_be_bytes());
        hash_bytes(&mut hasher, &self.signature);
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(self.gas_limit.to_be_bytes());
        hash_bytes(&mut hasher, &self.gas_price.to_signed_bytes_be());
        TxHash(hasher.finalize().into())
    }
}

fn hash_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// A committed, numbered set of transactions plus the resulting state root.
/// Retained in history forever, including after a successful dispute.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Batch {
    /// Unique batch id
    pub id: String,
    /// Dense batch number, starting at 0
    pub batch_number: u64,
    /// State root after executing the batch
    pub state_root: StateRoot,
    /// Transactions in commitment order
    pub transactions: Vec<Transaction>,
    /// Commitment time
    pub timestamp: SystemTime,
    /// Gas consumed executing the batch
    pub gas_used: u64,
    /// Cleared when a challenge against the batch is proven valid
    pub success: bool,
    /// End of the dispute window
    pub challenge_deadline: SystemTime,
    /// Set exactly once, after the dispute window closes
    pub finalized: bool,
}

/// Transient output of the transition function, stamped by the core with
/// the allocated batch number and the measured processing duration before
/// being returned and folded into metrics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_number: u64,
    pub state_root: StateRoot,
    pub gas_used: u64,
    pub transaction_count: usize,
    pub processing_time: Duration,
    pub success: bool,
    pub error: Option<String>,
}

/// A staked fraud claim against a specific batch. Never deleted; resolved
/// at most once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    /// Unique challenge id
    pub id: String,
    /// Batch the claim targets
    pub batch_number: u64,
    /// Disputing party
    pub challenger: Address,
    /// Fraud-proof evidence
    pub evidence: Vec<u8>,
    /// Submission time
    pub timestamp: SystemTime,
    /// Whether the verifier has ruled on this claim
    pub resolved: bool,
    /// The verifier's ruling, meaningful only once resolved
    pub valid: bool,
    /// Staked amount backing the claim
    pub stake: BigInt,
}

/// Derived view of a batch's position in the dispute lifecycle. Computed
/// from the batch flags and its challenge set, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Committed, window open, no live dispute
    Pending,
    /// At least one unresolved challenge outstanding
    Challenged,
    /// Dispute window closed without a standing claim
    Finalized,
    /// A challenge against the batch was proven valid
    Rejected,
}

/// Read-only snapshot of the rollup's aggregate state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RollupState {
    pub id: String,
    pub state_root: StateRoot,
    pub next_batch_number: u64,
    pub pending_transactions: usize,
    pub batch_count: usize,
    pub challenge_count: usize,
    pub metrics: RollupMetrics,
    pub config: RollupConfig,
}

impl RollupState {
    /// Render the snapshot as a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
