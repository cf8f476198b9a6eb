//! Nullifiers
//!
//! A nullifier marks a commitment spent without revealing which one:
//!
//! ```text
//! N = Hash(salt, secret_key)
//! ```
//!
//! Only the holder of the secret key matching a commitment's owner tag can
//! derive its nullifier, and each commitment has exactly one (the salt is
//! single-use). Once a nullifier enters the spent set, the commitment can
//! never be consumed again.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::commitment::Salt;
use crate::error::Result;
use crate::field::{MimcHasher, from_hex, to_fixed_hex};
use crate::keys::SecretKey;

/// Unique spent-tag for a commitment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nullifier(BigUint);

impl Nullifier {
    /// Derive the nullifier for a commitment's salt under a secret key.
    pub fn derive(hasher: &MimcHasher, salt: &Salt, secret_key: &SecretKey) -> Result<Self> {
        let preimage = [salt.as_field().clone(), secret_key.as_field().clone()];
        Ok(Self(hasher.hash(&preimage)?))
    }

    pub fn as_field(&self) -> &BigUint {
        &self.0
    }

    /// Fixed-width hex wire form.
    pub fn to_hex(&self, width: usize) -> Result<String> {
        to_fixed_hex(&self.0, width)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(from_hex(s)?))
    }
}
