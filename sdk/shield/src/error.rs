//! Error definitions for the shield primitives.

use thiserror::Error;

/// Errors raised by the hasher and the commitment codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShieldError {
    /// A preimage element is outside the field. Inputs are never silently
    /// reduced; the caller must supply canonical residues.
    #[error("Field element exceeds modulus: {value}")]
    ExceedsModulus { value: String },

    /// A value or address does not fit the fixed encoding width.
    #[error("Value {value} does not fit in {width} bytes")]
    ValueTooWide { value: String, width: usize },

    /// A hex wire string could not be decoded.
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),
}

/// Result type for shield operations
pub type Result<T> = std::result::Result<T, ShieldError>;
