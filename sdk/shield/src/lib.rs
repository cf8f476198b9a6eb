//! Umbra Shield SDK
//!
//! Field-native primitives for shielded token commitments.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Shielded Commitment                         │
//! │  ┌──────────────┐  ┌───────────────┐  ┌──────────────────────┐ │
//! │  │   Preimage   │  │   FieldHash   │  │      Nullifier       │ │
//! │  │ (codec-built)│→ │ (MiMC p/e7)   │  │  H(salt, secret_key) │ │
//! │  └──────────────┘  └───────────────┘  └──────────────────────┘ │
//! │         │                  │                                    │
//! │         ▼                  ▼                                    │
//! │  fixed-width BE      bit-exact match with                       │
//! │  field elements      the on-chain verifier                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything in this crate is pure: no shared state, safe to call from any
//! number of threads without synchronization.

pub mod codec;
pub mod commitment;
pub mod error;
pub mod field;
pub mod keys;
pub mod nullifier;

pub use codec::CommitmentCodec;
pub use commitment::{Asset, Commitment, Salt};
pub use error::ShieldError;
pub use field::{MimcHasher, from_hex, to_fixed_hex};
pub use keys::{PublicKey, SecretKey};
pub use nullifier::Nullifier;
