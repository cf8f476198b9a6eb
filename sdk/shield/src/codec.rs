//! Commitment preimage codec
//!
//! Deterministic, order-preserving construction of the field-element
//! sequence fed to the hasher:
//!
//! ```text
//! fungible:     [leftPad(value, width), owner_pk, salt]
//! non-fungible: [leftPad(contract, width), lowBits(token_id), owner_pk, salt]
//! ```
//!
//! Values and addresses are fixed-width left-zero-padded big-endian
//! numerals; token ids keep only the low-order bytes the verifier circuit
//! binds. Encoding is total and injective over the supported ranges, and
//! anything wider than the configured width is rejected rather than
//! wrapped.

use num_bigint::BigUint;
use num_traits::One;

use umbra_config::ShieldParams;

use crate::commitment::{Asset, Commitment};
use crate::error::{Result, ShieldError};
use crate::field::{MimcHasher, to_fixed_hex_unchecked};
use crate::keys::PublicKey;

/// Builds commitment preimages and computes their hashes.
#[derive(Debug, Clone)]
pub struct CommitmentCodec {
    params: ShieldParams,
    hasher: MimcHasher,
}

impl CommitmentCodec {
    pub fn new(params: ShieldParams) -> Self {
        let hasher = MimcHasher::new(&params);
        Self { params, hasher }
    }

    pub fn params(&self) -> &ShieldParams {
        &self.params
    }

    pub fn hasher(&self) -> &MimcHasher {
        &self.hasher
    }

    /// Encode a value or address as a fixed-width big-endian numeral.
    pub fn encode(&self, value: &BigUint) -> Result<Vec<u8>> {
        let bytes = value.to_bytes_be();
        let width = self.params.encoding_width;
        if bytes.len() > width {
            return Err(ShieldError::ValueTooWide {
                value: to_fixed_hex_unchecked(value),
                width,
            });
        }
        let mut out = vec![0u8; width - bytes.len()];
        out.extend_from_slice(&bytes);
        Ok(out)
    }

    /// Decode a fixed-width numeral back to its value.
    pub fn decode(&self, bytes: &[u8]) -> BigUint {
        BigUint::from_bytes_be(bytes)
    }

    /// Keep only the low-order token-id bytes the circuit binds.
    pub fn truncate_token_id(&self, token_id: &BigUint) -> BigUint {
        let bound: BigUint = BigUint::one() << (8 * self.params.leaf_hash_length);
        token_id % bound
    }

    /// Build the ordered preimage for one commitment.
    pub fn preimage(&self, asset: &Asset, owner: &PublicKey, salt: &crate::Salt) -> Result<Vec<BigUint>> {
        let fields = match asset {
            Asset::Fungible { value } => {
                vec![
                    self.checked_element(value)?,
                    owner.as_field().clone(),
                    salt.as_field().clone(),
                ]
            }
            Asset::NonFungible { contract, token_id } => {
                vec![
                    self.checked_element(contract)?,
                    self.truncate_token_id(token_id),
                    owner.as_field().clone(),
                    salt.as_field().clone(),
                ]
            }
        };
        Ok(fields)
    }

    /// Compute the published hash of an opened commitment.
    pub fn commit(&self, commitment: &Commitment) -> Result<BigUint> {
        let preimage = self.preimage(&commitment.asset, &commitment.owner, &commitment.salt)?;
        self.hasher.hash(&preimage)
    }

    /// Width-check a value and pass it through as a field element. The
    /// padded encoding does not change the numeric value, so the element
    /// fed to the hasher is the value itself.
    fn checked_element(&self, value: &BigUint) -> Result<BigUint> {
        self.encode(value)?;
        Ok(value.clone())
    }
}
