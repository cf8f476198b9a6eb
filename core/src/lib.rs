//! Umbra Core
//!
//! The stateful half of the shielded-token system: an append-only
//! commitment ledger with a parallel spent set, and the lifecycle state
//! machine that mints, transfers and burns commitments through an external
//! prover.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       TokenLifecycle                             │
//! │                                                                  │
//! │   validate inputs ──► conservation ──► fresh salts               │
//! │          │                                  │                    │
//! │          │            (no ledger lock held) ▼                    │
//! │          │                        external Prover (slow)         │
//! │          │                                  │                    │
//! │          ▼                                  ▼                    │
//! │   CommitmentLedger ◄──── atomic commit: spend nullifiers         │
//! │   (single writer)              + append output slots             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod prover;

pub use error::LifecycleError;
pub use ledger::{CommitmentLedger, LedgerEntry};
pub use lifecycle::{
    BurnReceipt, MintReceipt, OpenInput, OutputReceipt, OutputRequest, TokenLifecycle,
    TransferReceipt,
};
pub use prover::{
    Attestation, BurnRequest, MintRequest, MockProver, OutputWitness, Prover, ProverError,
    ProvingContext, SpendWitness, TransferRequest,
};
