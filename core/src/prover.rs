//! Prover Integration
//!
//! Interface to the external zero-knowledge prover. The core never builds
//! circuits or proofs itself; it hands the prover a full witness (the
//! opened commitments, nullifiers and output openings of one operation)
//! and receives an opaque attestation back.
//!
//! Proof generation is the long-latency step of the pipeline (seconds to
//! minutes), so the lifecycle awaits these calls without holding the
//! ledger lock.

use std::path::PathBuf;

use num_bigint::BigUint;
use thiserror::Error;

use umbra_config::ProverTomlConfig;
use umbra_shield::{Commitment, Nullifier, SecretKey};

/// Errors returned by a prover implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProverError {
    /// The prover examined the witness and declined it.
    #[error("Witness rejected: {0}")]
    Rejected(String),

    /// The prover could not be reached or failed mid-call. The caller
    /// cannot tell whether the attempt took effect upstream.
    #[error("Prover unavailable: {0}")]
    Unavailable(String),
}

/// Asset-contract addressing and circuit artifact locations, passed
/// through to the prover untouched.
#[derive(Debug, Clone, Default)]
pub struct ProvingContext {
    /// Address of the shield contract proofs are bound to.
    pub shield_contract: Option<String>,
    /// Directory holding proving keys and compiled circuits.
    pub artifact_dir: Option<PathBuf>,
}

impl ProvingContext {
    pub fn from_config(config: &ProverTomlConfig) -> Self {
        Self {
            shield_contract: config.shield_contract.clone(),
            artifact_dir: config.artifact_dir.clone().map(PathBuf::from),
        }
    }
}

/// Witness for one consumed commitment.
#[derive(Debug, Clone)]
pub struct SpendWitness {
    /// Ledger slot of the input.
    pub index: u64,
    /// The opened preimage being spent.
    pub opening: Commitment,
    /// Published hash at that slot.
    pub hash: BigUint,
    /// Nullifier the spend will publish.
    pub nullifier: Nullifier,
}

/// Witness for one produced commitment.
#[derive(Debug, Clone)]
pub struct OutputWitness {
    pub opening: Commitment,
    pub hash: BigUint,
}

/// Witness binding plaintext asset details to a fresh commitment.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub output: OutputWitness,
    pub context: ProvingContext,
}

/// Witness for a transfer: every input nullifier and output commitment
/// the attestation must cover.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub inputs: Vec<SpendWitness>,
    pub outputs: Vec<OutputWitness>,
    pub sender: SecretKey,
    pub context: ProvingContext,
}

/// Witness for a burn, additionally authorizing release of the plaintext
/// asset to `receiver` on the base ledger.
#[derive(Debug, Clone)]
pub struct BurnRequest {
    pub input: SpendWitness,
    pub secret_key: SecretKey,
    pub receiver: String,
    pub context: ProvingContext,
}

/// Opaque proof material produced by the prover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub proof: Vec<u8>,
}

/// External prover collaborator.
#[allow(async_fn_in_trait)]
pub trait Prover: Send + Sync {
    async fn prove_mint(&self, request: MintRequest) -> Result<Attestation, ProverError>;
    async fn prove_transfer(&self, request: TransferRequest) -> Result<Attestation, ProverError>;
    async fn prove_burn(&self, request: BurnRequest) -> Result<Attestation, ProverError>;
}

impl<P: Prover> Prover for std::sync::Arc<P> {
    async fn prove_mint(&self, request: MintRequest) -> Result<Attestation, ProverError> {
        (**self).prove_mint(request).await
    }

    async fn prove_transfer(&self, request: TransferRequest) -> Result<Attestation, ProverError> {
        (**self).prove_transfer(request).await
    }

    async fn prove_burn(&self, request: BurnRequest) -> Result<Attestation, ProverError> {
        (**self).prove_burn(request).await
    }
}

/// Accepts every witness without proving anything. Dev-mode stand-in for
/// a real prover, mirroring the pipeline's mock prover mode.
#[derive(Debug, Clone, Default)]
pub struct MockProver;

impl Prover for MockProver {
    async fn prove_mint(&self, _request: MintRequest) -> Result<Attestation, ProverError> {
        Ok(Attestation { proof: Vec::new() })
    }

    async fn prove_transfer(&self, _request: TransferRequest) -> Result<Attestation, ProverError> {
        Ok(Attestation { proof: Vec::new() })
    }

    async fn prove_burn(&self, _request: BurnRequest) -> Result<Attestation, ProverError> {
        Ok(Attestation { proof: Vec::new() })
    }
}
