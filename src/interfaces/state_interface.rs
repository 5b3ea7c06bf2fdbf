// src/interfaces/state_interface.rs
//! State accessor interface.

use crate::error::CapabilityError;
use crate::rollup::StateRoot;

/// Key/value state with commit and rollback producing content-addressed
/// roots.
///
/// `commit` is called once per successful batch and returns the root
/// summarizing the committed state; `rollback` must restore the root that
/// was current before the most recent commit.
pub trait StateAccessor: Send + Sync {
    /// Read a value from state.
    fn get(&self, key: &[u8; 32]) -> Result<Vec<u8>, CapabilityError>;

    /// Write a value into uncommitted state.
    fn set(&self, key: [u8; 32], value: Vec<u8>) -> Result<(), CapabilityError>;

    /// Commit pending writes, returning the new state root.
    fn commit(&self) -> Result<StateRoot, CapabilityError>;

    /// Discard the most recent commit, restoring the previous root.
    fn rollback(&self) -> Result<(), CapabilityError>;

    /// The currently committed state root.
    fn current_root(&self) -> StateRoot;
}
