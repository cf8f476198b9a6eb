//! Field-bounded MiMC hash
//!
//! Implements the MiMC p/e7 permutation used by the on-chain verifier:
//! 91 rounds of `state = (state + constant + key)^7 mod P` with a single
//! final blinding-key addition, folded over multiple inputs by carrying the
//! running state forward as the key for the next input.
//!
//! Round constants are a keccak256 chain seeded from the ASCII bytes
//! `"mimc"`. Deriving them through a general-purpose hash rather than
//! through MiMC itself breaks self-reference, so every deployment sees the
//! same constants.
//!
//! All arithmetic is arbitrary-precision and normalized to `[0, P)`. The
//! hasher holds only precomputed constants and is safe to share across
//! threads.

use num_bigint::BigUint;
use num_traits::{Num, Zero};
use tiny_keccak::{Hasher as _, Keccak};

use umbra_config::ShieldParams;

use crate::error::{Result, ShieldError};

/// Domain-separation seed for the round-constant chain ("mimc" in ASCII).
const ROUND_CONSTANT_SEED: &[u8] = b"mimc";

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// MiMC hasher over the configured scalar field.
#[derive(Debug, Clone)]
pub struct MimcHasher {
    modulus: BigUint,
    /// Round constants, reduced into the field.
    round_constants: Vec<BigUint>,
}

impl MimcHasher {
    /// Create a hasher for the given parameters, precomputing the
    /// keccak-chained round constants.
    pub fn new(params: &ShieldParams) -> Self {
        let mut round_constants = Vec::with_capacity(params.rounds);
        let mut chain = keccak256(ROUND_CONSTANT_SEED);
        for _ in 0..params.rounds {
            chain = keccak256(&chain);
            round_constants.push(BigUint::from_bytes_be(&chain) % &params.modulus);
        }

        Self {
            modulus: params.modulus.clone(),
            round_constants,
        }
    }

    /// The field modulus `P` this hasher reduces into.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Hash an ordered sequence of field elements.
    ///
    /// Every input must already be a canonical residue in `[0, P)`;
    /// anything else fails with [`ShieldError::ExceedsModulus`].
    pub fn hash(&self, inputs: &[BigUint]) -> Result<BigUint> {
        for input in inputs {
            if *input >= self.modulus {
                return Err(ShieldError::ExceedsModulus {
                    value: to_fixed_hex_unchecked(input),
                });
            }
        }

        // Sequential compression: the running state is the key for the
        // next input's permutation.
        let mut state = BigUint::zero();
        for input in inputs {
            let folded = self.permute(input, &state);
            state = (&state + input + folded) % &self.modulus;
        }
        Ok(state)
    }

    /// One MiMC p/e7 permutation of `x` under `key`.
    fn permute(&self, x: &BigUint, key: &BigUint) -> BigUint {
        let exponent = BigUint::from(7u8);
        let mut state = x.clone();
        for constant in &self.round_constants {
            let t = (&state + constant + key) % &self.modulus;
            state = t.modpow(&exponent, &self.modulus);
        }
        // Key added back once as the blinding step.
        (state + key) % &self.modulus
    }
}

// ============================================================================
// Wire encoding helpers
// ============================================================================

/// Encode a field element as a fixed-width hexadecimal numeral
/// (left-zero-padded, no prefix). Fails if the value needs more bytes.
pub fn to_fixed_hex(value: &BigUint, width: usize) -> Result<String> {
    let bytes = value.to_bytes_be();
    if bytes.len() > width {
        return Err(ShieldError::ValueTooWide {
            value: to_fixed_hex_unchecked(value),
            width,
        });
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(hex::encode(out))
}

/// Decode a hexadecimal numeral (optionally `0x`-prefixed, any padding).
pub fn from_hex(s: &str) -> Result<BigUint> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    if stripped.is_empty() {
        return Err(ShieldError::InvalidHex(s.into()));
    }
    BigUint::from_str_radix(stripped, 16).map_err(|_| ShieldError::InvalidHex(s.into()))
}

/// Unpadded hex form, for error messages only.
pub(crate) fn to_fixed_hex_unchecked(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}
