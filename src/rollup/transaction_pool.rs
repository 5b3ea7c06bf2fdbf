// src/rollup/transaction_pool.rs
//! Transaction intake: a bounded staging area for not-yet-batched
//! transactions.
//!
//! Transactions are validated field by field on entry, stamped with their
//! content hash, and held in arrival order until the batch pipeline
//! consumes the whole queue at once.

use std::collections::VecDeque;

use crate::error::RollupError;
use crate::rollup::types::Transaction;

/// Bounded, order-preserving staging queue.
#[derive(Debug)]
pub struct TransactionPool {
    queue: VecDeque<Transaction>,
    capacity: usize,
}

impl TransactionPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Validate and stage a transaction.
    ///
    /// The content hash is computed here and recorded on the stored
    /// transaction; beyond appending to the queue there is no side effect.
    pub fn push(&mut self, mut transaction: Transaction) -> Result<(), RollupError> {
        transaction.validate()?;
        if self.queue.len() >= self.capacity {
            return Err(RollupError::QueueFull {
                limit: self.capacity,
            });
        }
        transaction.rollup_hash = transaction.content_hash();
        self.queue.push_back(transaction);
        Ok(())
    }

    /// Copy of the staged set, in arrival order.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.queue.iter().cloned().collect()
    }

    /// Drop every staged transaction. Called only after a batch commits.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
