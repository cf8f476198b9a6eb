//! Token Lifecycle
//!
//! The state machine deciding how commitments are produced and consumed.
//! Per commitment the states are:
//!
//! ```text
//! Unshielded ──mint──► Shielded/Unspent ──transfer|burn──► Spent
//! ```
//!
//! `Spent` is terminal for a commitment; the shielded value itself
//! re-enters circulation as new commitments (transfer) or returns to the
//! base ledger (burn). The unit of identity here is the commitment, not
//! the token.
//!
//! Every operation follows validate-then-commit ordering: all local
//! checks run before the prover is contacted, and the ledger is mutated
//! only after the attestation arrives, in one critical section with no
//! awaits, so a cancelled caller never leaves the nullifier set and the
//! commitment slots half-applied. Prover failures are surfaced verbatim
//! and never retried here (a retry would need a fresh salt, changing the
//! nullifier and risking a duplicate spend if the first attempt landed).

use std::collections::HashSet;
use std::sync::Arc;

use num_bigint::BigUint;
use rand::Rng;

use umbra_config::ShieldParams;
use umbra_shield::{Asset, Commitment, CommitmentCodec, Nullifier, PublicKey, Salt, SecretKey};

use crate::error::{LifecycleError, Result};
use crate::ledger::CommitmentLedger;
use crate::prover::{
    Attestation, BurnRequest, MintRequest, OutputWitness, Prover, ProverError, ProvingContext,
    SpendWitness, TransferRequest,
};

/// A caller-held opening of a shielded commitment, referencing the ledger
/// slot it occupies. The owner tag is implied by the spending key.
#[derive(Debug, Clone)]
pub struct OpenInput {
    pub index: u64,
    pub asset: Asset,
    pub salt: Salt,
}

/// One requested transfer output.
#[derive(Debug, Clone)]
pub struct OutputRequest {
    pub recipient: PublicKey,
    pub asset: Asset,
}

/// Result of a mint: the opening to keep, the published hash and the
/// assigned ledger slot.
#[derive(Debug, Clone)]
pub struct MintReceipt {
    pub opening: Commitment,
    pub hash: BigUint,
    pub index: u64,
}

/// One produced transfer output with its assigned slot.
#[derive(Debug, Clone)]
pub struct OutputReceipt {
    pub opening: Commitment,
    pub hash: BigUint,
    pub index: u64,
}

/// Result of a transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub outputs: Vec<OutputReceipt>,
}

/// Result of a burn.
#[derive(Debug, Clone)]
pub struct BurnReceipt {
    pub nullifier: Nullifier,
    pub receiver: String,
}

/// Orchestrates mint, transfer and burn against the ledger and the
/// external prover.
pub struct TokenLifecycle<P> {
    codec: CommitmentCodec,
    ledger: Arc<CommitmentLedger>,
    prover: P,
    context: ProvingContext,
}

impl<P: Prover> TokenLifecycle<P> {
    pub fn new(params: ShieldParams, prover: P, context: ProvingContext) -> Self {
        Self::with_ledger(params, Arc::new(CommitmentLedger::new()), prover, context)
    }

    /// Build a lifecycle over an existing (shared) ledger instance.
    pub fn with_ledger(
        params: ShieldParams,
        ledger: Arc<CommitmentLedger>,
        prover: P,
        context: ProvingContext,
    ) -> Self {
        Self {
            codec: CommitmentCodec::new(params),
            ledger,
            prover,
            context,
        }
    }

    pub fn ledger(&self) -> &Arc<CommitmentLedger> {
        &self.ledger
    }

    pub fn codec(&self) -> &CommitmentCodec {
        &self.codec
    }

    /// Shield an asset: build a fresh commitment for `owner`, have the
    /// prover bind the plaintext details to it, then append it to the
    /// ledger. Nothing is mutated on failure.
    pub async fn mint<R: Rng>(
        &self,
        asset: Asset,
        owner: PublicKey,
        rng: &mut R,
    ) -> Result<MintReceipt> {
        let salt = Salt::random(self.codec.params(), rng);
        let opening = Commitment::new(asset, owner, salt);
        let hash = self.codec.commit(&opening)?;

        let attested = self
            .prover
            .prove_mint(MintRequest {
                output: OutputWitness {
                    opening: opening.clone(),
                    hash: hash.clone(),
                },
                context: self.context.clone(),
            })
            .await;
        Self::surface(attested)?;

        let index = self.ledger.append(hash.clone());
        log::info!("minted commitment at ledger index {index}");
        Ok(MintReceipt {
            opening,
            hash,
            index,
        })
    }

    /// Consume one or two unspent commitments owned by `sender` and
    /// produce one or two new ones, conserving total value for fungible
    /// assets. The single-input/two-output shape is the usual
    /// "pay X, keep change" split. Non-fungible transfers are strictly
    /// one input, one output, identity unchanged.
    pub async fn transfer<R: Rng>(
        &self,
        sender: &SecretKey,
        inputs: &[OpenInput],
        outputs: &[OutputRequest],
        rng: &mut R,
    ) -> Result<TransferReceipt> {
        let fungible = Self::check_kinds(inputs, outputs)?;
        if fungible {
            if inputs.len() > 2 || outputs.len() > 2 {
                return Err(LifecycleError::InvalidRequest(
                    "a transfer takes at most two inputs and two outputs; \
                     use transfer_batch for more outputs"
                        .into(),
                ));
            }
        } else if inputs.len() != 1 || outputs.len() != 1 {
            return Err(LifecycleError::InvalidRequest(
                "non-fungible transfers are strictly one input, one output".into(),
            ));
        }

        self.execute_transfer(sender, inputs, outputs, rng).await
    }

    /// Split one fungible commitment into many outputs under the same
    /// conservation constraint.
    pub async fn transfer_batch<R: Rng>(
        &self,
        sender: &SecretKey,
        input: &OpenInput,
        outputs: &[OutputRequest],
        rng: &mut R,
    ) -> Result<TransferReceipt> {
        let inputs = std::slice::from_ref(input);
        let fungible = Self::check_kinds(inputs, outputs)?;
        if !fungible {
            return Err(LifecycleError::InvalidRequest(
                "batch transfers apply to fungible assets only".into(),
            ));
        }

        self.execute_transfer(sender, inputs, outputs, rng).await
    }

    /// Unshield: consume one unspent commitment and authorize release of
    /// the underlying asset to `receiver` on the base ledger.
    pub async fn burn(
        &self,
        secret_key: &SecretKey,
        input: &OpenInput,
        receiver: impl Into<String>,
    ) -> Result<BurnReceipt> {
        let receiver = receiver.into();
        let mut spends = self.resolve_inputs(secret_key, std::slice::from_ref(input))?;
        let spend = spends
            .pop()
            .ok_or_else(|| LifecycleError::InvalidRequest("burn needs exactly one input".into()))?;

        let attested = self
            .prover
            .prove_burn(BurnRequest {
                input: spend.clone(),
                secret_key: secret_key.clone(),
                receiver: receiver.clone(),
                context: self.context.clone(),
            })
            .await;
        Self::surface(attested)?;

        // Racing spenders are decided here: exactly one insert wins.
        self.ledger.mark_spent(&spend.nullifier)?;
        log::info!(
            "burned commitment at ledger index {} for receiver {receiver}",
            spend.index
        );
        Ok(BurnReceipt {
            nullifier: spend.nullifier,
            receiver,
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn execute_transfer<R: Rng>(
        &self,
        sender: &SecretKey,
        inputs: &[OpenInput],
        outputs: &[OutputRequest],
        rng: &mut R,
    ) -> Result<TransferReceipt> {
        // 1. Every input must be unspent and provably owned.
        let spends = self.resolve_inputs(sender, inputs)?;

        // 2. Conservation, before the prover is ever contacted.
        if inputs[0].asset.is_fungible() {
            let input_total = total_value(inputs.iter().map(|i| &i.asset));
            let output_total = total_value(outputs.iter().map(|o| &o.asset));
            if input_total != output_total {
                return Err(LifecycleError::Conservation {
                    inputs: input_total,
                    outputs: output_total,
                });
            }
        } else if outputs[0].asset != inputs[0].asset {
            return Err(LifecycleError::InvalidRequest(
                "non-fungible identity must be carried over unchanged".into(),
            ));
        }

        // 3. Fresh single-use salts for every output.
        let mut witnesses = Vec::with_capacity(outputs.len());
        for request in outputs {
            let salt = Salt::random(self.codec.params(), rng);
            let opening = Commitment::new(request.asset.clone(), request.recipient.clone(), salt);
            let hash = self.codec.commit(&opening)?;
            witnesses.push(OutputWitness { opening, hash });
        }

        // 4. One attestation covering all nullifiers and outputs.
        let attested = self
            .prover
            .prove_transfer(TransferRequest {
                inputs: spends.clone(),
                outputs: witnesses.clone(),
                sender: sender.clone(),
                context: self.context.clone(),
            })
            .await;
        Self::surface(attested)?;

        // 5. Spend inputs and append outputs in one ledger critical
        // section. No awaits from here on, so cancellation cannot split
        // the commit.
        let nullifiers: Vec<Nullifier> = spends.iter().map(|s| s.nullifier.clone()).collect();
        let hashes: Vec<BigUint> = witnesses.iter().map(|w| w.hash.clone()).collect();
        let indices = self.ledger.commit(&nullifiers, hashes)?;

        log::info!(
            "transfer committed: {} inputs spent, {} outputs at indices {indices:?}",
            spends.len(),
            witnesses.len()
        );

        let outputs = witnesses
            .into_iter()
            .zip(indices)
            .map(|(witness, index)| OutputReceipt {
                opening: witness.opening,
                hash: witness.hash,
                index,
            })
            .collect();
        Ok(TransferReceipt { outputs })
    }

    /// Verify ownership and unspent status of every input, producing the
    /// spend witnesses. The opened preimage must hash to the ledger entry
    /// at its index under the sender's own tag; a wrong salt, wrong
    /// asset or wrong key all surface as the same mismatch. Listing the
    /// same commitment twice is a spend-twice attempt and is rejected
    /// here, before any external call.
    fn resolve_inputs(
        &self,
        sender: &SecretKey,
        inputs: &[OpenInput],
    ) -> Result<Vec<SpendWitness>> {
        let owner = sender.public_key(self.codec.hasher())?;
        let mut seen: HashSet<Nullifier> = HashSet::with_capacity(inputs.len());
        let mut spends = Vec::with_capacity(inputs.len());
        for input in inputs {
            let entry = self
                .ledger
                .get(input.index)
                .ok_or(LifecycleError::NotFound(input.index))?;
            let opening = Commitment::new(input.asset.clone(), owner.clone(), input.salt.clone());
            let hash = self.codec.commit(&opening)?;
            if hash != entry.hash {
                return Err(LifecycleError::InputMismatch { index: input.index });
            }
            let nullifier = Nullifier::derive(self.codec.hasher(), &input.salt, sender)?;
            if self.ledger.is_spent(&nullifier) || !seen.insert(nullifier.clone()) {
                return Err(LifecycleError::DoubleSpend);
            }
            spends.push(SpendWitness {
                index: input.index,
                opening,
                hash,
                nullifier,
            });
        }
        Ok(spends)
    }

    /// Reject empty shapes and mixed asset kinds; returns whether the
    /// operation is fungible.
    fn check_kinds(inputs: &[OpenInput], outputs: &[OutputRequest]) -> Result<bool> {
        let (Some(first_in), Some(first_out)) = (inputs.first(), outputs.first()) else {
            return Err(LifecycleError::InvalidRequest(
                "a transfer needs at least one input and one output".into(),
            ));
        };
        let fungible = first_in.asset.is_fungible();
        let mixed = inputs.iter().any(|i| i.asset.is_fungible() != fungible)
            || outputs.iter().any(|o| o.asset.is_fungible() != fungible);
        if mixed || first_out.asset.is_fungible() != fungible {
            return Err(LifecycleError::InvalidRequest(
                "inputs and outputs must all be of one asset kind".into(),
            ));
        }
        Ok(fungible)
    }

    /// Map prover outcomes into the lifecycle taxonomy. External failures
    /// pass through unchanged; nothing is retried here.
    fn surface(outcome: std::result::Result<Attestation, ProverError>) -> Result<Attestation> {
        match outcome {
            Ok(attestation) => Ok(attestation),
            Err(ProverError::Rejected(reason)) => Err(LifecycleError::ProofRejected(reason)),
            Err(err) => Err(LifecycleError::Prover(err)),
        }
    }
}

/// Total fungible value of a set of assets.
fn total_value<'a, I: Iterator<Item = &'a Asset>>(assets: I) -> BigUint {
    assets.fold(BigUint::from(0u8), |acc, asset| match asset.value() {
        Some(value) => acc + value,
        None => acc,
    })
}
