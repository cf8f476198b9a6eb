//! Shielded Commitments
//!
//! A commitment binds an asset's value or identity, an owner tag and a
//! single-use salt:
//!
//! ```text
//! fungible:     C = Hash(value, owner_pk, salt)
//! non-fungible: C = Hash(contract, token_id, owner_pk, salt)
//! ```
//!
//! The hash is recomputed on demand from the commitment's current fields
//! and never stored alongside them, so a salt assigned late can never
//! leave a stale cached value behind.

use num_bigint::BigUint;
use rand::Rng;
use serde::{Deserialize, Serialize};

use umbra_config::ShieldParams;

use crate::error::Result;
use crate::field::{from_hex, to_fixed_hex};
use crate::keys::{PublicKey, random_field_element};

/// Single-use randomness making commitments to the same (asset, owner)
/// pair unlinkable. Generated fresh per commitment, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(BigUint);

impl Salt {
    /// Draw a fresh random salt below the field modulus.
    pub fn random<R: Rng>(params: &ShieldParams, rng: &mut R) -> Self {
        Self(random_field_element(params, rng))
    }

    /// Restore a salt from its raw field element (wallet recovery, tests).
    pub fn from_field(value: BigUint) -> Self {
        Self(value)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(from_hex(s)?))
    }

    pub fn as_field(&self) -> &BigUint {
        &self.0
    }

    /// Fixed-width hex wire form.
    pub fn to_hex(&self, width: usize) -> Result<String> {
        to_fixed_hex(&self.0, width)
    }
}

/// What a commitment shields. Fixed at creation; never changes kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Asset {
    /// A fungible amount.
    Fungible { value: BigUint },
    /// A unique token plus its owning contract address.
    NonFungible { contract: BigUint, token_id: BigUint },
}

impl Asset {
    pub fn fungible(value: u64) -> Self {
        Self::Fungible {
            value: BigUint::from(value),
        }
    }

    pub fn non_fungible(contract: BigUint, token_id: BigUint) -> Self {
        Self::NonFungible { contract, token_id }
    }

    pub fn is_fungible(&self) -> bool {
        matches!(self, Self::Fungible { .. })
    }

    /// The amount carried by a fungible asset, if any.
    pub fn value(&self) -> Option<&BigUint> {
        match self {
            Self::Fungible { value } => Some(value),
            Self::NonFungible { .. } => None,
        }
    }
}

/// An opened commitment: the preimage fields a holder keeps off-chain.
///
/// Only the hash ([`CommitmentCodec::commit`](crate::codec::CommitmentCodec::commit))
/// is ever published; the ledger slot index is assigned by the ledger at
/// acceptance and tracked next to the hash, not in here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub asset: Asset,
    pub owner: PublicKey,
    pub salt: Salt,
}

impl Commitment {
    pub fn new(asset: Asset, owner: PublicKey, salt: Salt) -> Self {
        Self { asset, owner, salt }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn salts_stay_in_field() {
        let params = ShieldParams::default();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..64 {
            let salt = Salt::random(&params, &mut rng);
            assert!(*salt.as_field() < params.modulus);
        }
    }

    #[test]
    fn salt_hex_round_trip() {
        let salt = Salt::from_field(BigUint::from(0x2222u32));
        let encoded = salt.to_hex(32).unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(Salt::from_hex(&encoded).unwrap(), salt);
    }

    #[test]
    fn asset_kind_is_fixed() {
        let fungible = Asset::fungible(5);
        assert!(fungible.is_fungible());
        assert_eq!(fungible.value(), Some(&BigUint::from(5u8)));

        let nft = Asset::non_fungible(BigUint::from(0xabcu32), BigUint::from(7u8));
        assert!(!nft.is_fungible());
        assert_eq!(nft.value(), None);
    }
}
