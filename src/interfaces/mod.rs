// src/interfaces/mod.rs
//! Capability contracts the rollup core depends on.
//!
//! The core never executes transactions, stores state, or checks fraud
//! proofs itself; it orchestrates implementations of these three traits,
//! injected at construction:
//! - batch transition function (validate / execute / optimize a staged set)
//! - state accessor (key/value state with commit and rollback)
//! - fraud-proof verifier (evidence checking and proof generation)

mod state_interface;
mod transition_interface;
mod verifier_interface;

pub use state_interface::StateAccessor;
pub use transition_interface::BatchTransitionFunction;
pub use verifier_interface::FraudProofVerifier;
