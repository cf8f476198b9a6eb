//! Owner keys
//!
//! A secret key is an opaque private scalar; the matching public key is
//! simply `FieldHash(secret_key)`. This gives computational hiding under
//! the hash's preimage resistance, not a signature capability; ownership
//! is proven by being able to open a commitment whose preimage contains
//! the derived public key.

use num_bigint::BigUint;
use rand::Rng;
use serde::{Deserialize, Serialize};

use umbra_config::ShieldParams;

use crate::error::Result;
use crate::field::{MimcHasher, from_hex, to_fixed_hex};

/// Private scalar held by a user. Never leaves the owning party.
///
/// Loss = loss of funds. Compromise = theft of funds.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(BigUint);

impl SecretKey {
    /// Generate a random secret key below the field modulus.
    pub fn random<R: Rng>(params: &ShieldParams, rng: &mut R) -> Self {
        Self(random_field_element(params, rng))
    }

    /// Restore a key from its raw scalar. The caller is responsible for
    /// supplying a canonical residue.
    pub fn from_field(scalar: BigUint) -> Self {
        Self(scalar)
    }

    /// Parse from the fixed-width hex wire form.
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(from_hex(s)?))
    }

    /// The raw scalar, for preimage construction.
    pub fn as_field(&self) -> &BigUint {
        &self.0
    }

    /// Derive the public owner tag: `pk = Hash(sk)`.
    pub fn public_key(&self, hasher: &MimcHasher) -> Result<PublicKey> {
        Ok(PublicKey(hasher.hash(std::slice::from_ref(&self.0))?))
    }
}

// Never print key material.
impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Public owner tag embedded in commitment preimages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub BigUint);

impl PublicKey {
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

/// Sample a uniform field element in `[0, P)` by rejection.
pub(crate) fn random_field_element<R: Rng>(params: &ShieldParams, rng: &mut R) -> BigUint {
    let width = params.element_width();
    let excess_bits = (width * 8) as u64 - params.modulus.bits();
    let mask = 0xffu8 >> excess_bits.min(7);

    let mut bytes = vec![0u8; width];
    loop {
        rng.fill_bytes(&mut bytes);
        // Mask the high bits so most samples already land below P.
        bytes[0] &= mask;
        let candidate = BigUint::from_bytes_be(&bytes);
        if candidate < params.modulus {
            return candidate;
        }
    }
}
