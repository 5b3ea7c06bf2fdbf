// src/rollup/optimistic_rollup.rs
//! The rollup core: one consistency boundary over the staging pool, batch
//! history, challenge table, and metrics.
//!
//! All mutable state lives behind a single reader/writer lock. Mutating
//! operations take the write guard and either apply fully or leave no
//! trace; reads take the read guard and return consistent snapshots. The
//! one exception to single-acquisition operation is `resolve_challenge`,
//! which runs the potentially slow fraud-proof verification off-lock,
//! bounded by the configured proof-time limit, and re-validates the
//! challenge before applying the verdict.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use num_bigint::BigInt;
use rand::RngCore;

use super::config::RollupConfig;
use super::metrics::RollupMetrics;
use super::transaction_pool::TransactionPool;
use super::types::{
    Address, Batch, BatchResult, BatchStatus, Challenge, RollupState, StateRoot, Transaction,
};
use crate::error::RollupError;
use crate::interfaces::{BatchTransitionFunction, FraudProofVerifier, StateAccessor};

/// Mutable core state. Batch numbers are dense, so the history vector is
/// indexable by batch number.
struct RollupInner {
    state_root: StateRoot,
    next_batch_number: u64,
    pool: TransactionPool,
    batches: Vec<Batch>,
    challenges: HashMap<String, Challenge>,
    metrics: RollupMetrics,
}

/// An optimistic rollup instance.
///
/// Batches of staged transactions are committed through an injected
/// transition function and assumed valid immediately; staked challenges
/// may dispute a batch during its challenge window, and a batch becomes
/// final once the window closes with no unresolved claim against it.
pub struct OptimisticRollup {
    id: String,
    config: RollupConfig,
    transition: Arc<dyn BatchTransitionFunction>,
    state: Arc<dyn StateAccessor>,
    verifier: Arc<dyn FraudProofVerifier>,
    inner: RwLock<RollupInner>,
}

impl OptimisticRollup {
    /// Create a rollup over the injected capabilities. Zero-valued config
    /// fields are replaced with defaults.
    pub fn new(
        config: RollupConfig,
        transition: Arc<dyn BatchTransitionFunction>,
        state: Arc<dyn StateAccessor>,
        verifier: Arc<dyn FraudProofVerifier>,
    ) -> Self {
        let config = config.normalized();
        let inner = RollupInner {
            state_root: state.current_root(),
            next_batch_number: 0,
            pool: TransactionPool::new(config.max_batch_size),
            batches: Vec::new(),
            challenges: HashMap::new(),
            metrics: RollupMetrics::default(),
        };
        Self {
            id: generate_rollup_id(),
            config,
            transition,
            state,
            verifier,
            inner: RwLock::new(inner),
        }
    }

    /// This instance's unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The normalized configuration in effect.
    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    /// Validate and stage a transaction for the next batch.
    pub fn add_transaction(&self, transaction: Transaction) -> Result<(), RollupError> {
        let mut inner = self.inner.write().unwrap();
        inner.pool.push(transaction)?;
        debug!(
            "rollup {}: staged transaction ({} queued)",
            self.id,
            inner.pool.len()
        );
        Ok(())
    }

    /// Check a transaction's fields without staging it.
    pub fn validate_transaction(&self, transaction: &Transaction) -> Result<(), RollupError> {
        transaction.validate()
    }

    /// Commit the staged transactions as the next batch.
    ///
    /// All-or-nothing: if the optimize, validate, execute, or state-commit
    /// step fails, the staging queue and history are untouched and the
    /// error names the failed stage.
    pub fn process_batch(&self) -> Result<BatchResult, RollupError> {
        let mut inner = self.inner.write().unwrap();
        if inner.pool.is_empty() {
            return Err(RollupError::EmptyBatch);
        }
        let started = Instant::now();

        let mut transactions = inner.pool.snapshot();
        if self.config.enable_compression {
            transactions = self
                .transition
                .optimize(transactions)
                .map_err(RollupError::Optimization)?;
        }
        self.transition
            .validate(&transactions)
            .map_err(RollupError::Validation)?;
        let mut result = self
            .transition
            .process(&transactions)
            .map_err(RollupError::Processing)?;
        self.state.commit().map_err(RollupError::StateCommit)?;

        let batch_number = inner.next_batch_number;
        let now = SystemTime::now();
        result.batch_number = batch_number;
        result.transaction_count = transactions.len();
        result.processing_time = started.elapsed();

        let batch = Batch {
            id: format!("batch-{}-{}", batch_number, unix_seconds(now)),
            batch_number,
            state_root: result.state_root,
            transactions,
            timestamp: now,
            gas_used: result.gas_used,
            success: result.success,
            challenge_deadline: now + self.config.challenge_period,
            finalized: false,
        };

        inner.batches.push(batch);
        inner.next_batch_number += 1;
        inner.state_root = result.state_root;
        inner.pool.clear();
        inner.metrics.record_batch(&result);

        info!(
            "rollup {}: committed batch {} ({} transactions, {} gas)",
            self.id, batch_number, result.transaction_count, result.gas_used
        );
        Ok(result)
    }

    /// Open a staked fraud claim against a committed batch.
    ///
    /// The batch must exist, be unfinalized, and still be inside its
    /// challenge window; the stake must meet the configured floor and the
    /// evidence must pass the verifier's structural pre-check. Concurrent
    /// challenges against the same batch are unlimited.
    pub fn challenge_batch(
        &self,
        batch_number: u64,
        challenger: Address,
        evidence: Vec<u8>,
        stake: BigInt,
    ) -> Result<Challenge, RollupError> {
        let mut inner = self.inner.write().unwrap();
        let batch = inner
            .batches
            .get(batch_number as usize)
            .ok_or(RollupError::BatchNotFound(batch_number))?;
        if batch.finalized {
            return Err(RollupError::BatchAlreadyFinalized(batch_number));
        }
        if SystemTime::now() > batch.challenge_deadline {
            return Err(RollupError::ChallengePeriodExpired(batch_number));
        }
        if stake < self.config.min_stake {
            return Err(RollupError::StakeBelowMinimum {
                stake,
                minimum: self.config.min_stake.clone(),
            });
        }

        let challenge = Challenge {
            id: generate_challenge_id(batch_number),
            batch_number,
            challenger,
            evidence,
            timestamp: SystemTime::now(),
            resolved: false,
            valid: false,
            stake,
        };
        if !self.verifier.validate_challenge(&challenge) {
            return Err(RollupError::InvalidEvidence);
        }

        inner
            .challenges
            .insert(challenge.id.clone(), challenge.clone());
        inner.metrics.record_challenge();

        warn!(
            "rollup {}: batch {} challenged by {} (stake {})",
            self.id, batch_number, challenger, challenge.stake
        );
        Ok(challenge)
    }

    /// Resolve a challenge by running the full fraud-proof verification.
    ///
    /// The verification runs outside the core lock, bounded by the
    /// configured proof-time limit; a verdict is applied only if the
    /// challenge is still unresolved once the lock is re-acquired. A valid
    /// claim rolls the target batch back: its success flag is cleared, the
    /// state accessor restores the pre-batch root, and the batch stays in
    /// history for audit. Resolving the same challenge twice is an error.
    pub fn resolve_challenge(&self, challenge_id: &str) -> Result<(), RollupError> {
        let snapshot = {
            let inner = self.inner.read().unwrap();
            let challenge = inner
                .challenges
                .get(challenge_id)
                .ok_or_else(|| RollupError::ChallengeNotFound(challenge_id.to_string()))?;
            if challenge.resolved {
                return Err(RollupError::ChallengeAlreadyResolved(
                    challenge_id.to_string(),
                ));
            }
            challenge.clone()
        };

        let valid = self.verify_bounded(snapshot)?;

        let mut inner = self.inner.write().unwrap();
        let batch_number = {
            let challenge = inner
                .challenges
                .get(challenge_id)
                .ok_or_else(|| RollupError::ChallengeNotFound(challenge_id.to_string()))?;
            if challenge.resolved {
                return Err(RollupError::ChallengeAlreadyResolved(
                    challenge_id.to_string(),
                ));
            }
            challenge.batch_number
        };

        if valid {
            self.state.rollback().map_err(RollupError::StateRollback)?;
            inner.state_root = self.state.current_root();
            if let Some(batch) = inner.batches.get_mut(batch_number as usize) {
                batch.success = false;
            }
            warn!(
                "rollup {}: challenge {} proven valid, rolled back batch {}",
                self.id, challenge_id, batch_number
            );
        } else {
            info!(
                "rollup {}: challenge {} resolved, claim rejected",
                self.id, challenge_id
            );
        }

        if let Some(challenge) = inner.challenges.get_mut(challenge_id) {
            challenge.resolved = true;
            challenge.valid = valid;
        }
        Ok(())
    }

    /// Promote a batch to final once its challenge window has closed and
    /// no unresolved challenge stands against it.
    pub fn finalize_batch(&self, batch_number: u64) -> Result<(), RollupError> {
        let mut inner = self.inner.write().unwrap();
        let batch = inner
            .batches
            .get(batch_number as usize)
            .ok_or(RollupError::BatchNotFound(batch_number))?;
        if batch.finalized {
            return Err(RollupError::BatchAlreadyFinalized(batch_number));
        }
        if SystemTime::now() < batch.challenge_deadline {
            return Err(RollupError::ChallengePeriodOpen(batch_number));
        }
        if inner
            .challenges
            .values()
            .any(|c| c.batch_number == batch_number && !c.resolved)
        {
            return Err(RollupError::UnresolvedChallenge(batch_number));
        }

        inner.batches[batch_number as usize].finalized = true;
        info!("rollup {}: batch {} finalized", self.id, batch_number);
        Ok(())
    }

    /// Ask the verifier to produce fraud-proof evidence for a batch.
    pub fn generate_fraud_proof(&self, batch_number: u64) -> Result<Vec<u8>, RollupError> {
        let batch = self
            .get_batch(batch_number)
            .ok_or(RollupError::BatchNotFound(batch_number))?;
        self.verifier
            .generate_proof(&batch)
            .map_err(RollupError::Verification)
    }

    /// Aggregate snapshot of the rollup's state.
    pub fn get_state(&self) -> RollupState {
        let inner = self.inner.read().unwrap();
        RollupState {
            id: self.id.clone(),
            state_root: inner.state_root,
            next_batch_number: inner.next_batch_number,
            pending_transactions: inner.pool.len(),
            batch_count: inner.batches.len(),
            challenge_count: inner.challenges.len(),
            metrics: inner.metrics.clone(),
            config: self.config.clone(),
        }
    }

    /// Current aggregate counters.
    pub fn get_metrics(&self) -> RollupMetrics {
        self.inner.read().unwrap().metrics.clone()
    }

    /// The batch with the given number, if committed.
    pub fn get_batch(&self, batch_number: u64) -> Option<Batch> {
        self.inner
            .read()
            .unwrap()
            .batches
            .get(batch_number as usize)
            .cloned()
    }

    /// The challenge with the given id, if any.
    pub fn get_challenge(&self, challenge_id: &str) -> Option<Challenge> {
        self.inner
            .read()
            .unwrap()
            .challenges
            .get(challenge_id)
            .cloned()
    }

    /// Every challenge targeting a batch, oldest first.
    pub fn get_challenges(&self, batch_number: u64) -> Vec<Challenge> {
        let inner = self.inner.read().unwrap();
        let mut challenges: Vec<Challenge> = inner
            .challenges
            .values()
            .filter(|c| c.batch_number == batch_number)
            .cloned()
            .collect();
        challenges.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        challenges
    }

    /// Derived dispute-lifecycle status of a batch.
    pub fn batch_status(&self, batch_number: u64) -> Option<BatchStatus> {
        let inner = self.inner.read().unwrap();
        let batch = inner.batches.get(batch_number as usize)?;
        let status = if !batch.success {
            BatchStatus::Rejected
        } else if batch.finalized {
            BatchStatus::Finalized
        } else if inner
            .challenges
            .values()
            .any(|c| c.batch_number == batch_number && !c.resolved)
        {
            BatchStatus::Challenged
        } else {
            BatchStatus::Pending
        };
        Some(status)
    }

    /// The state root after the most recent committed batch.
    pub fn current_state_root(&self) -> StateRoot {
        self.inner.read().unwrap().state_root
    }

    /// Run the verifier on a worker thread, giving up after the configured
    /// proof-time limit. On timeout the worker is left to finish in the
    /// background; its late answer is discarded.
    fn verify_bounded(&self, challenge: Challenge) -> Result<bool, RollupError> {
        let verifier = Arc::clone(&self.verifier);
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let _ = sender.send(verifier.verify(&challenge));
        });
        match receiver.recv_timeout(self.config.max_proof_time) {
            Ok(Ok(valid)) => Ok(valid),
            Ok(Err(e)) => Err(RollupError::Verification(e)),
            Err(RecvTimeoutError::Timeout) => {
                Err(RollupError::ProofTimeout(self.config.max_proof_time))
            }
            Err(RecvTimeoutError::Disconnected) => Err(RollupError::Verification(
                "fraud-proof verifier terminated without an answer".into(),
            )),
        }
    }
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

fn generate_rollup_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("rollup-{}", hex::encode(bytes))
}

fn generate_challenge_id(batch_number: u64) -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("challenge-{}-{}", batch_number, hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::rollup::TxHash;
    use crate::testing::{
        FailingStage, FailingStateAccessor, FailingTransitionFunction, FailingVerifier,
        MockStateAccessor, MockTransitionFunction, MockVerifier, SlowVerifier,
    };

    fn transaction(id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            sender: Address::new([1; 20]),
            recipient: Address::new([2; 20]),
            value: BigInt::from(100),
            data: vec![],
            nonce: 1,
            signature: vec![1, 2, 3],
            timestamp: 1_700_000_000,
            gas_limit: 21_000,
            gas_price: BigInt::from(10),
            rollup_hash: TxHash::default(),
        }
    }

    fn short_config() -> RollupConfig {
        RollupConfig {
            max_batch_size: 10,
            challenge_period: Duration::from_millis(40),
            max_proof_time: Duration::from_millis(200),
            min_stake: BigInt::from(1000),
            ..Default::default()
        }
    }

    fn rollup_with(config: RollupConfig, verifier: Arc<dyn FraudProofVerifier>) -> OptimisticRollup {
        OptimisticRollup::new(
            config,
            Arc::new(MockTransitionFunction::new()),
            Arc::new(MockStateAccessor::new()),
            verifier,
        )
    }

    fn rollup(config: RollupConfig) -> OptimisticRollup {
        rollup_with(config, Arc::new(MockVerifier::rejecting()))
    }

    fn committed_batch(rollup: &OptimisticRollup) -> u64 {
        rollup.add_transaction(transaction("tx")).unwrap();
        rollup.process_batch().unwrap().batch_number
    }

    #[test]
    fn test_process_batch_empty_queue_fails() {
        let rollup = rollup(short_config());
        assert!(matches!(
            rollup.process_batch(),
            Err(RollupError::EmptyBatch)
        ));
        assert_eq!(rollup.get_state().batch_count, 0);
    }

    #[test]
    fn test_process_batch_commits_and_clears_queue() {
        let rollup = rollup(short_config());
        rollup.add_transaction(transaction("a")).unwrap();
        rollup.add_transaction(transaction("b")).unwrap();

        let result = rollup.process_batch().unwrap();
        assert_eq!(result.batch_number, 0);
        assert_eq!(result.transaction_count, 2);
        assert!(result.success);

        let state = rollup.get_state();
        assert_eq!(state.pending_transactions, 0);
        assert_eq!(state.batch_count, 1);
        assert_eq!(state.next_batch_number, 1);
        assert_eq!(state.state_root, result.state_root);

        let batch = rollup.get_batch(0).unwrap();
        assert_eq!(batch.batch_number, 0);
        assert_eq!(batch.transactions.len(), 2);
        assert!(!batch.finalized);
        assert!(batch.success);
    }

    #[test]
    fn test_batch_numbers_are_dense_from_zero() {
        let rollup = rollup(short_config());
        for expected in 0..3 {
            rollup.add_transaction(transaction("tx")).unwrap();
            let result = rollup.process_batch().unwrap();
            assert_eq!(result.batch_number, expected);
            assert_eq!(rollup.get_batch(expected).unwrap().batch_number, expected);
        }
    }

    #[test]
    fn test_validation_failure_keeps_queue() {
        let rollup = OptimisticRollup::new(
            short_config(),
            Arc::new(FailingTransitionFunction::new(FailingStage::Validate)),
            Arc::new(MockStateAccessor::new()),
            Arc::new(MockVerifier::rejecting()),
        );
        rollup.add_transaction(transaction("a")).unwrap();

        assert!(matches!(
            rollup.process_batch(),
            Err(RollupError::Validation(_))
        ));
        let state = rollup.get_state();
        assert_eq!(state.pending_transactions, 1);
        assert_eq!(state.batch_count, 0);
        assert_eq!(state.metrics.total_batches, 0);
    }

    #[test]
    fn test_processing_failure_keeps_queue() {
        let rollup = OptimisticRollup::new(
            short_config(),
            Arc::new(FailingTransitionFunction::new(FailingStage::Process)),
            Arc::new(MockStateAccessor::new()),
            Arc::new(MockVerifier::rejecting()),
        );
        rollup.add_transaction(transaction("a")).unwrap();

        assert!(matches!(
            rollup.process_batch(),
            Err(RollupError::Processing(_))
        ));
        assert_eq!(rollup.get_state().pending_transactions, 1);
        assert_eq!(rollup.get_state().batch_count, 0);
    }

    #[test]
    fn test_state_commit_failure_keeps_queue() {
        let rollup = OptimisticRollup::new(
            short_config(),
            Arc::new(MockTransitionFunction::new()),
            Arc::new(FailingStateAccessor::new()),
            Arc::new(MockVerifier::rejecting()),
        );
        rollup.add_transaction(transaction("a")).unwrap();

        assert!(matches!(
            rollup.process_batch(),
            Err(RollupError::StateCommit(_))
        ));
        assert_eq!(rollup.get_state().pending_transactions, 1);
        assert_eq!(rollup.get_state().batch_count, 0);
    }

    #[test]
    fn test_optimize_only_runs_with_compression_enabled() {
        // Optimize stage fails, but compression is off, so the batch commits.
        let rollup = OptimisticRollup::new(
            short_config(),
            Arc::new(FailingTransitionFunction::new(FailingStage::Optimize)),
            Arc::new(MockStateAccessor::new()),
            Arc::new(MockVerifier::rejecting()),
        );
        rollup.add_transaction(transaction("a")).unwrap();
        assert!(rollup.process_batch().is_ok());

        let config = RollupConfig {
            enable_compression: true,
            ..short_config()
        };
        let rollup = OptimisticRollup::new(
            config,
            Arc::new(FailingTransitionFunction::new(FailingStage::Optimize)),
            Arc::new(MockStateAccessor::new()),
            Arc::new(MockVerifier::rejecting()),
        );
        rollup.add_transaction(transaction("a")).unwrap();
        assert!(matches!(
            rollup.process_batch(),
            Err(RollupError::Optimization(_))
        ));
        assert_eq!(rollup.get_state().pending_transactions, 1);
    }

    #[test]
    fn test_challenge_unknown_batch_fails() {
        let rollup = rollup(short_config());
        let err = rollup
            .challenge_batch(5, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap_err();
        assert!(matches!(err, RollupError::BatchNotFound(5)));
    }

    #[test]
    fn test_challenge_below_min_stake_fails() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);

        let err = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(999))
            .unwrap_err();
        assert!(matches!(err, RollupError::StakeBelowMinimum { .. }));
        assert_eq!(rollup.get_metrics().total_challenges, 0);
    }

    #[test]
    fn test_challenge_empty_evidence_rejected() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);

        let err = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![], BigInt::from(5000))
            .unwrap_err();
        assert!(matches!(err, RollupError::InvalidEvidence));
        assert_eq!(rollup.get_metrics().total_challenges, 0);
    }

    #[test]
    fn test_challenge_succeeds_and_is_unresolved() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);

        let challenge = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1, 2], BigInt::from(5000))
            .unwrap();
        assert!(!challenge.resolved);
        assert!(!challenge.valid);
        assert_eq!(challenge.batch_number, number);

        let stored = rollup.get_challenge(&challenge.id).unwrap();
        assert!(!stored.resolved);
        assert_eq!(rollup.get_metrics().total_challenges, 1);
        assert_eq!(rollup.batch_status(number), Some(BatchStatus::Challenged));
    }

    #[test]
    fn test_multiple_challenges_per_batch() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);

        let first = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap();
        let second = rollup
            .challenge_batch(number, Address::new([4; 20]), vec![2], BigInt::from(6000))
            .unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(rollup.get_challenges(number).len(), 2);
    }

    #[test]
    fn test_challenge_expired_window_fails() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);
        thread::sleep(Duration::from_millis(60));

        let err = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap_err();
        assert!(matches!(err, RollupError::ChallengePeriodExpired(_)));
    }

    #[test]
    fn test_challenge_finalized_batch_fails() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);
        thread::sleep(Duration::from_millis(60));
        rollup.finalize_batch(number).unwrap();

        let err = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap_err();
        assert!(matches!(err, RollupError::BatchAlreadyFinalized(_)));
    }

    #[test]
    fn test_resolve_unknown_challenge_fails() {
        let rollup = rollup(short_config());
        assert!(matches!(
            rollup.resolve_challenge("challenge-0-missing"),
            Err(RollupError::ChallengeNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_twice_fails() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);
        let challenge = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap();

        rollup.resolve_challenge(&challenge.id).unwrap();
        assert!(matches!(
            rollup.resolve_challenge(&challenge.id),
            Err(RollupError::ChallengeAlreadyResolved(_))
        ));

        let stored = rollup.get_challenge(&challenge.id).unwrap();
        assert!(stored.resolved);
        assert!(!stored.valid);
    }

    #[test]
    fn test_invalid_claim_leaves_batch_standing() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);
        let challenge = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap();

        rollup.resolve_challenge(&challenge.id).unwrap();
        let batch = rollup.get_batch(number).unwrap();
        assert!(batch.success);
        assert_eq!(rollup.batch_status(number), Some(BatchStatus::Pending));
    }

    #[test]
    fn test_valid_claim_rolls_batch_back() {
        let rollup = rollup_with(short_config(), Arc::new(MockVerifier::confirming()));
        let root_before = rollup.current_state_root();
        let number = committed_batch(&rollup);
        assert_ne!(rollup.current_state_root(), root_before);

        let challenge = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap();
        rollup.resolve_challenge(&challenge.id).unwrap();

        let batch = rollup.get_batch(number).unwrap();
        assert!(!batch.success);
        assert_eq!(rollup.batch_status(number), Some(BatchStatus::Rejected));
        assert_eq!(rollup.current_state_root(), root_before);
        // Retained in history for audit
        assert_eq!(rollup.get_state().batch_count, 1);

        let stored = rollup.get_challenge(&challenge.id).unwrap();
        assert!(stored.resolved);
        assert!(stored.valid);
    }

    #[test]
    fn test_verifier_error_leaves_challenge_unresolved() {
        let rollup = rollup_with(short_config(), Arc::new(FailingVerifier::new()));
        let number = committed_batch(&rollup);
        let challenge = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap();

        assert!(matches!(
            rollup.resolve_challenge(&challenge.id),
            Err(RollupError::Verification(_))
        ));
        assert!(!rollup.get_challenge(&challenge.id).unwrap().resolved);
    }

    #[test]
    fn test_slow_verifier_times_out() {
        let config = RollupConfig {
            max_proof_time: Duration::from_millis(20),
            ..short_config()
        };
        let rollup = rollup_with(
            config,
            Arc::new(SlowVerifier::new(Duration::from_millis(500), true)),
        );
        let number = committed_batch(&rollup);
        let challenge = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap();

        assert!(matches!(
            rollup.resolve_challenge(&challenge.id),
            Err(RollupError::ProofTimeout(_))
        ));
        assert!(!rollup.get_challenge(&challenge.id).unwrap().resolved);
        assert!(rollup.get_batch(number).unwrap().success);
    }

    #[test]
    fn test_finalize_before_deadline_fails() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);
        assert!(matches!(
            rollup.finalize_batch(number),
            Err(RollupError::ChallengePeriodOpen(_))
        ));
        assert!(!rollup.get_batch(number).unwrap().finalized);
    }

    #[test]
    fn test_finalize_unknown_batch_fails() {
        let rollup = rollup(short_config());
        assert!(matches!(
            rollup.finalize_batch(9),
            Err(RollupError::BatchNotFound(9))
        ));
    }

    #[test]
    fn test_finalize_succeeds_exactly_once_after_deadline() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);
        thread::sleep(Duration::from_millis(60));

        rollup.finalize_batch(number).unwrap();
        assert!(rollup.get_batch(number).unwrap().finalized);
        assert_eq!(rollup.batch_status(number), Some(BatchStatus::Finalized));

        assert!(matches!(
            rollup.finalize_batch(number),
            Err(RollupError::BatchAlreadyFinalized(_))
        ));
    }

    #[test]
    fn test_finalize_blocked_by_unresolved_challenge() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);
        let challenge = rollup
            .challenge_batch(number, Address::new([3; 20]), vec![1], BigInt::from(5000))
            .unwrap();
        thread::sleep(Duration::from_millis(60));

        assert!(matches!(
            rollup.finalize_batch(number),
            Err(RollupError::UnresolvedChallenge(_))
        ));

        // An invalid verdict clears the block.
        rollup.resolve_challenge(&challenge.id).unwrap();
        rollup.finalize_batch(number).unwrap();
        assert!(rollup.get_batch(number).unwrap().finalized);
    }

    #[test]
    fn test_generate_fraud_proof_delegates_to_verifier() {
        let rollup = rollup(short_config());
        let number = committed_batch(&rollup);
        let proof = rollup.generate_fraud_proof(number).unwrap();
        assert!(!proof.is_empty());

        assert!(matches!(
            rollup.generate_fraud_proof(99),
            Err(RollupError::BatchNotFound(99))
        ));
    }

    #[test]
    fn test_state_snapshot_reflects_activity() {
        let rollup = rollup(short_config());
        rollup.add_transaction(transaction("a")).unwrap();

        let state = rollup.get_state();
        assert_eq!(state.id, rollup.id());
        assert_eq!(state.pending_transactions, 1);
        assert_eq!(state.batch_count, 0);
        assert_eq!(state.next_batch_number, 0);
        assert_eq!(state.challenge_count, 0);
        assert_eq!(state.config, *rollup.config());
    }
}
