//! Lifecycle error taxonomy.
//!
//! Local validation failures are raised before any external call and leave
//! no side effects ("nothing happened"). Failures surfaced once the prover
//! has been contacted may leave external state uncertain; the lifecycle
//! never retries on its own, because a retry with a fresh salt would issue
//! a second, differently-nullified spend of the same logical transfer.

use num_bigint::BigUint;
use thiserror::Error;

use umbra_shield::ShieldError;

use crate::prover::ProverError;

/// Errors raised by the ledger and the token lifecycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// Malformed or out-of-range preimage material.
    #[error(transparent)]
    Validation(#[from] ShieldError),

    /// Structurally invalid operation (wrong input/output shape, mixed
    /// asset kinds, empty transfer).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The opened input does not hash to the ledger entry at its index:
    /// wrong preimage, wrong salt, or a secret key that does not own it.
    #[error("Input does not match ledger entry at index {index}")]
    InputMismatch { index: u64 },

    /// Fungible input and output value totals differ.
    #[error("Conservation violated: inputs total {inputs}, outputs total {outputs}")]
    Conservation { inputs: BigUint, outputs: BigUint },

    /// The nullifier is already in the spent set.
    #[error("Nullifier already in the spent set")]
    DoubleSpend,

    /// A ledger slot was assigned out of sequence (restore/replay only;
    /// live appends are serialized by the ledger lock).
    #[error("Ledger slot conflict: expected next index {expected}, got {index}")]
    IndexConflict { index: u64, expected: u64 },

    /// The external prover declined the witness.
    #[error("Prover rejected the witness: {0}")]
    ProofRejected(String),

    /// The prover call failed for a reason other than rejection.
    #[error("Prover failure: {0}")]
    Prover(ProverError),

    /// No commitment occupies the referenced ledger index.
    #[error("No commitment at ledger index {0}")]
    NotFound(u64),
}

impl LifecycleError {
    /// True when the failure may have left external state uncertain
    /// (surfaced after the prover call began), so an operator should
    /// check before resubmitting. Everything else means nothing happened.
    pub fn external_state_uncertain(&self) -> bool {
        matches!(self, Self::Prover(ProverError::Unavailable(_)))
    }
}

/// Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = LifecycleError::Conservation {
            inputs: BigUint::from(5u8),
            outputs: BigUint::from(6u8),
        };
        assert_eq!(
            err.to_string(),
            "Conservation violated: inputs total 5, outputs total 6"
        );

        let err = LifecycleError::NotFound(9);
        assert_eq!(err.to_string(), "No commitment at ledger index 9");
    }

    #[test]
    fn uncertainty_classification() {
        assert!(!LifecycleError::DoubleSpend.external_state_uncertain());
        assert!(
            !LifecycleError::ProofRejected("bad witness".into()).external_state_uncertain()
        );
        assert!(
            LifecycleError::Prover(ProverError::Unavailable("timeout".into()))
                .external_state_uncertain()
        );
    }
}
