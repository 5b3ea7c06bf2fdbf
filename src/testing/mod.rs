// src/testing/mod.rs
//! Deterministic capability doubles.
//!
//! Every capability the core depends on has a well-behaved mock here, plus
//! deliberately-failing and deliberately-slow variants for negative-path
//! and timeout coverage. Embedders can also use these to run the core
//! without a real execution layer.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::error::CapabilityError;
use crate::interfaces::{BatchTransitionFunction, FraudProofVerifier, StateAccessor};
use crate::rollup::{Batch, BatchResult, Challenge, StateRoot, Transaction};

/// Transition function double with flat per-transaction gas accounting and
/// a fixed post-state root.
pub struct MockTransitionFunction {
    pub gas_per_transaction: u64,
    pub state_root: StateRoot,
}

impl MockTransitionFunction {
    pub fn new() -> Self {
        let mut root = [0u8; 32];
        root[..4].copy_from_slice(&[1, 2, 3, 4]);
        Self {
            gas_per_transaction: 21_000,
            state_root: StateRoot::new(root),
        }
    }
}

impl Default for MockTransitionFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchTransitionFunction for MockTransitionFunction {
    fn validate(&self, transactions: &[Transaction]) -> Result<(), CapabilityError> {
        if transactions.is_empty() {
            return Err("batch cannot be empty".into());
        }
        Ok(())
    }

    fn process(&self, transactions: &[Transaction]) -> Result<BatchResult, CapabilityError> {
        Ok(BatchResult {
            batch_number: 0,
            state_root: self.state_root,
            gas_used: self
                .gas_per_transaction
                .saturating_mul(transactions.len() as u64),
            transaction_count: transactions.len(),
            processing_time: Duration::ZERO,
            success: true,
            error: None,
        })
    }

    fn optimize(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>, CapabilityError> {
        Ok(transactions)
    }
}

/// Which transition stage a [`FailingTransitionFunction`] fails at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailingStage {
    Optimize,
    Validate,
    Process,
}

/// Transition function that fails deterministically at one stage and
/// behaves like [`MockTransitionFunction`] everywhere else.
pub struct FailingTransitionFunction {
    stage: FailingStage,
    inner: MockTransitionFunction,
}

impl FailingTransitionFunction {
    pub fn new(stage: FailingStage) -> Self {
        Self {
            stage,
            inner: MockTransitionFunction::new(),
        }
    }
}

impl BatchTransitionFunction for FailingTransitionFunction {
    fn validate(&self, transactions: &[Transaction]) -> Result<(), CapabilityError> {
        if self.stage == FailingStage::Validate {
            return Err("transition function rejected the batch".into());
        }
        self.inner.validate(transactions)
    }

    fn process(&self, transactions: &[Transaction]) -> Result<BatchResult, CapabilityError> {
        if self.stage == FailingStage::Process {
            return Err("transition function failed during execution".into());
        }
        self.inner.process(transactions)
    }

    fn optimize(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>, CapabilityError> {
        if self.stage == FailingStage::Optimize {
            return Err("transition function failed to optimize the batch".into());
        }
        self.inner.optimize(transactions)
    }
}

/// In-memory state accessor. Each commit pushes a fresh root derived from
/// the commit ordinal; rollback pops back to the previous root.
pub struct MockStateAccessor {
    entries: Mutex<HashMap<[u8; 32], Vec<u8>>>,
    roots: Mutex<Vec<StateRoot>>,
}

impl MockStateAccessor {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            roots: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockStateAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StateAccessor for MockStateAccessor {
    fn get(&self, key: &[u8; 32]) -> Result<Vec<u8>, CapabilityError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    fn set(&self, key: [u8; 32], value: Vec<u8>) -> Result<(), CapabilityError> {
        self.entries.lock().unwrap().insert(key, value);
        Ok(())
    }

    fn commit(&self) -> Result<StateRoot, CapabilityError> {
        let mut roots = self.roots.lock().unwrap();
        let mut hasher = Sha256::new();
        hasher.update(b"commit-");
        hasher.update((roots.len() as u64 + 1).to_be_bytes());
        let root = StateRoot::new(hasher.finalize().into());
        roots.push(root);
        Ok(root)
    }

    fn rollback(&self) -> Result<(), CapabilityError> {
        self.roots.lock().unwrap().pop();
        Ok(())
    }

    fn current_root(&self) -> StateRoot {
        self.roots
            .lock()
            .unwrap()
            .last()
            .copied()
            .unwrap_or_default()
    }
}

/// State accessor whose commit and rollback always fail.
pub struct FailingStateAccessor;

impl FailingStateAccessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FailingStateAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StateAccessor for FailingStateAccessor {
    fn get(&self, _key: &[u8; 32]) -> Result<Vec<u8>, CapabilityError> {
        Err("state backend unavailable".into())
    }

    fn set(&self, _key: [u8; 32], _value: Vec<u8>) -> Result<(), CapabilityError> {
        Err("state backend unavailable".into())
    }

    fn commit(&self) -> Result<StateRoot, CapabilityError> {
        Err("state backend refused to commit".into())
    }

    fn rollback(&self) -> Result<(), CapabilityError> {
        Err("state backend refused to roll back".into())
    }

    fn current_root(&self) -> StateRoot {
        StateRoot::default()
    }
}

/// Verifier with a fixed verdict. Evidence must be non-empty to pass the
/// structural pre-check.
pub struct MockVerifier {
    verdict: bool,
}

impl MockVerifier {
    /// Every claim is rejected (no fraud found).
    pub fn rejecting() -> Self {
        Self { verdict: false }
    }

    /// Every claim is confirmed (fraud found).
    pub fn confirming() -> Self {
        Self { verdict: true }
    }
}

impl FraudProofVerifier for MockVerifier {
    fn verify(&self, _challenge: &Challenge) -> Result<bool, CapabilityError> {
        Ok(self.verdict)
    }

    fn generate_proof(&self, batch: &Batch) -> Result<Vec<u8>, CapabilityError> {
        Ok(format!("proof-batch-{}", batch.batch_number).into_bytes())
    }

    fn validate_challenge(&self, challenge: &Challenge) -> bool {
        !challenge.evidence.is_empty()
    }
}

/// Verifier whose full verification always errors. The structural
/// pre-check passes, so failures surface at resolution time.
pub struct FailingVerifier;

impl FailingVerifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FailingVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FraudProofVerifier for FailingVerifier {
    fn verify(&self, _challenge: &Challenge) -> Result<bool, CapabilityError> {
        Err("verifier backend unavailable".into())
    }

    fn generate_proof(&self, _batch: &Batch) -> Result<Vec<u8>, CapabilityError> {
        Err("verifier backend unavailable".into())
    }

    fn validate_challenge(&self, _challenge: &Challenge) -> bool {
        true
    }
}

/// Verifier that sleeps before answering, for proof-time bound coverage.
pub struct SlowVerifier {
    delay: Duration,
    verdict: bool,
}

impl SlowVerifier {
    pub fn new(delay: Duration, verdict: bool) -> Self {
        Self { delay, verdict }
    }
}

impl FraudProofVerifier for SlowVerifier {
    fn verify(&self, _challenge: &Challenge) -> Result<bool, CapabilityError> {
        std::thread::sleep(self.delay);
        Ok(self.verdict)
    }

    fn generate_proof(&self, batch: &Batch) -> Result<Vec<u8>, CapabilityError> {
        Ok(format!("proof-batch-{}", batch.batch_number).into_bytes())
    }

    fn validate_challenge(&self, challenge: &Challenge) -> bool {
        !challenge.evidence.is_empty()
    }
}
