//! Commitment Ledger
//!
//! The off-chain model of the on-chain commitment structure: an
//! append-only ordered sequence of commitment hashes (slot index =
//! position, assigned exactly once) and a parallel unordered set of spent
//! nullifiers. Neither structure is ever compacted, reordered or
//! reindexed; spent slots are retained forever so historical inclusion
//! proofs stay valid.
//!
//! The index counter and the spent set are the only mutable shared state
//! in the core. Both sit behind one mutex per ledger instance, making
//! every mutation a single-writer critical section: duplicate slot
//! assignment and lost double-spend checks are prevented, not detected.
//! Callers must keep the critical sections short; in particular, the
//! lifecycle never holds this lock while awaiting the prover.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use num_bigint::BigUint;

use umbra_shield::Nullifier;

use crate::error::{LifecycleError, Result};

/// A filled ledger slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub index: u64,
    pub hash: BigUint,
}

#[derive(Debug, Default)]
struct LedgerInner {
    commitments: Vec<BigUint>,
    spent: HashSet<Nullifier>,
}

/// Append-only commitment slots plus the spent-nullifier set.
#[derive(Debug, Default)]
pub struct CommitmentLedger {
    inner: Mutex<LedgerInner>,
}

impl CommitmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().expect("ledger lock poisoned")
    }

    /// Append a commitment hash, assigning the next sequential slot.
    /// Indices start at 0 and are never reused or skipped.
    pub fn append(&self, hash: BigUint) -> u64 {
        let mut inner = self.locked();
        inner.commitments.push(hash);
        (inner.commitments.len() - 1) as u64
    }

    /// Re-insert a slot while rebuilding the ledger from recorded events.
    /// The index must be exactly the next one; anything else means the
    /// event stream is inconsistent.
    pub fn restore_at(&self, index: u64, hash: BigUint) -> Result<()> {
        let mut inner = self.locked();
        let expected = inner.commitments.len() as u64;
        if index != expected {
            return Err(LifecycleError::IndexConflict { index, expected });
        }
        inner.commitments.push(hash);
        Ok(())
    }

    /// Look up the commitment hash occupying a slot.
    pub fn get(&self, index: u64) -> Option<LedgerEntry> {
        let inner = self.locked();
        inner
            .commitments
            .get(index as usize)
            .map(|hash| LedgerEntry {
                index,
                hash: hash.clone(),
            })
    }

    /// Number of filled slots (also the next index to be assigned).
    pub fn len(&self) -> u64 {
        self.locked().commitments.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.locked().commitments.is_empty()
    }

    /// Insert a nullifier into the spent set.
    pub fn mark_spent(&self, nullifier: &Nullifier) -> Result<()> {
        let mut inner = self.locked();
        if !inner.spent.insert(nullifier.clone()) {
            return Err(LifecycleError::DoubleSpend);
        }
        Ok(())
    }

    pub fn is_spent(&self, nullifier: &Nullifier) -> bool {
        self.locked().spent.contains(nullifier)
    }

    /// Size of the spent set.
    pub fn spent_count(&self) -> usize {
        self.locked().spent.len()
    }

    /// Atomically spend a set of nullifiers and append the output
    /// commitments, in one critical section. Either everything is applied
    /// or nothing is: all nullifiers are checked (including duplicates
    /// within the batch) before the first mutation.
    ///
    /// Returns the slot indices assigned to `outputs`, in order.
    pub fn commit(&self, nullifiers: &[Nullifier], outputs: Vec<BigUint>) -> Result<Vec<u64>> {
        let mut inner = self.locked();

        let mut batch: HashSet<&Nullifier> = HashSet::with_capacity(nullifiers.len());
        for nullifier in nullifiers {
            if inner.spent.contains(nullifier) || !batch.insert(nullifier) {
                return Err(LifecycleError::DoubleSpend);
            }
        }

        for nullifier in nullifiers {
            inner.spent.insert(nullifier.clone());
        }

        let base = inner.commitments.len() as u64;
        let indices = (base..base + outputs.len() as u64).collect();
        inner.commitments.extend(outputs);
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_config::ShieldParams;
    use umbra_shield::{MimcHasher, Salt, SecretKey};

    fn nullifier(tag: u32) -> Nullifier {
        let hasher = MimcHasher::new(&ShieldParams::default());
        let salt = Salt::from_field(BigUint::from(tag));
        let sk = SecretKey::from_field(BigUint::from(1u8));
        Nullifier::derive(&hasher, &salt, &sk).unwrap()
    }

    #[test]
    fn append_assigns_sequential_indices() {
        let ledger = CommitmentLedger::new();
        assert_eq!(ledger.append(BigUint::from(10u8)), 0);
        assert_eq!(ledger.append(BigUint::from(20u8)), 1);
        assert_eq!(ledger.append(BigUint::from(30u8)), 2);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn get_returns_stored_entry() {
        let ledger = CommitmentLedger::new();
        ledger.append(BigUint::from(42u8));
        let entry = ledger.get(0).unwrap();
        assert_eq!(entry.index, 0);
        assert_eq!(entry.hash, BigUint::from(42u8));
        assert!(ledger.get(1).is_none());
    }

    #[test]
    fn double_spend_rejected() {
        let ledger = CommitmentLedger::new();
        let nf = nullifier(1);
        ledger.mark_spent(&nf).unwrap();
        assert!(ledger.is_spent(&nf));
        assert_eq!(
            ledger.mark_spent(&nf).unwrap_err(),
            LifecycleError::DoubleSpend
        );
        assert_eq!(ledger.spent_count(), 1);
    }

    #[test]
    fn commit_is_all_or_nothing() {
        let ledger = CommitmentLedger::new();
        let spent = nullifier(1);
        ledger.mark_spent(&spent).unwrap();

        let fresh = nullifier(2);
        let err = ledger
            .commit(
                &[fresh.clone(), spent.clone()],
                vec![BigUint::from(7u8), BigUint::from(8u8)],
            )
            .unwrap_err();
        assert_eq!(err, LifecycleError::DoubleSpend);

        // The failed commit left nothing behind.
        assert!(!ledger.is_spent(&fresh));
        assert_eq!(ledger.len(), 0);
        assert_eq!(ledger.spent_count(), 1);
    }

    #[test]
    fn commit_rejects_duplicate_nullifiers_within_batch() {
        let ledger = CommitmentLedger::new();
        let nf = nullifier(3);
        let err = ledger
            .commit(&[nf.clone(), nf], vec![BigUint::from(1u8)])
            .unwrap_err();
        assert_eq!(err, LifecycleError::DoubleSpend);
        assert_eq!(ledger.spent_count(), 0);
    }

    #[test]
    fn commit_assigns_contiguous_indices() {
        let ledger = CommitmentLedger::new();
        ledger.append(BigUint::from(1u8));
        let indices = ledger
            .commit(
                &[nullifier(4)],
                vec![BigUint::from(2u8), BigUint::from(3u8)],
            )
            .unwrap();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn restore_requires_exact_next_index() {
        let ledger = CommitmentLedger::new();
        ledger.restore_at(0, BigUint::from(1u8)).unwrap();
        ledger.restore_at(1, BigUint::from(2u8)).unwrap();

        let err = ledger.restore_at(3, BigUint::from(4u8)).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::IndexConflict {
                index: 3,
                expected: 2
            }
        );

        let err = ledger.restore_at(1, BigUint::from(4u8)).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::IndexConflict {
                index: 1,
                expected: 2
            }
        );
    }
}
