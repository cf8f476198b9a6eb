//! Umbra Configuration
//!
//! Shared configuration crate for all Umbra components.
//!
//! Handles loading configuration from:
//! 1. UMBRA_CONFIG env var (explicit path)
//! 2. ./config.toml (current directory)
//! 3. ~/.umbra/config.toml (user home)
//!
//! Environment variables take precedence over TOML config.
//!
//! The field parameters loaded here ([`ShieldParams`]) are injected into the
//! hasher, codec and lifecycle at construction. They are never read from
//! process-wide state, so tests and multi-deployment setups can run with
//! distinct parameter sets side by side.

use anyhow::{Context, Result, bail};
use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{env, fs};

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = ".umbra";

// ============================================================================
// Default Constants
// ============================================================================

/// Scalar field prime of the paired on-chain verifier (BN254 / the ZoKrates
/// default field). Commitments must be computed over exactly this field or
/// the verifier circuit will reject every proof.
const DEFAULT_FIELD_MODULUS: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Round count of the MiMC p/e7 permutation used by the verifier circuit.
const DEFAULT_HASH_ROUNDS: usize = 91;

/// Width in bytes of the left-zero-padded big-endian encoding used for
/// values and contract addresses inside commitment preimages.
const DEFAULT_ENCODING_WIDTH: usize = 32;

/// Number of low-order bytes of a non-fungible token id bound by the
/// verifier circuit. Higher-order bytes are truncated before hashing.
const DEFAULT_LEAF_HASH_LENGTH: usize = 32;

// ============================================================================
// Resolved Parameters
// ============================================================================

/// Immutable field and encoding parameters shared by the hasher, the codec
/// and the token lifecycle.
///
/// Built once from [`UmbraConfig::shield_params`] (or [`ShieldParams::default`]
/// in tests) and passed by reference or `Arc` from there on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShieldParams {
    /// Field modulus `P`. All preimage elements and hash outputs live in `[0, P)`.
    pub modulus: BigUint,
    /// MiMC permutation rounds.
    pub rounds: usize,
    /// Fixed preimage encoding width in bytes.
    pub encoding_width: usize,
    /// Low-order token-id bytes bound by the circuit.
    pub leaf_hash_length: usize,
}

impl Default for ShieldParams {
    fn default() -> Self {
        Self {
            modulus: BigUint::parse_bytes(DEFAULT_FIELD_MODULUS.as_bytes(), 10)
                .expect("default modulus is a valid decimal literal"),
            rounds: DEFAULT_HASH_ROUNDS,
            encoding_width: DEFAULT_ENCODING_WIDTH,
            leaf_hash_length: DEFAULT_LEAF_HASH_LENGTH,
        }
    }
}

impl ShieldParams {
    /// Number of bytes needed to carry a full field element.
    pub fn element_width(&self) -> usize {
        (self.modulus.bits() as usize).div_ceil(8)
    }
}

// ============================================================================
// Config Structs (TOML layout)
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UmbraConfig {
    #[serde(default)]
    pub shield: ShieldTomlConfig,
    #[serde(default)]
    pub prover: ProverTomlConfig,
}

/// Field / hash parameter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldTomlConfig {
    /// Field modulus as a decimal or 0x-prefixed hex string.
    #[serde(default = "default_modulus")]
    pub modulus: String,
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    #[serde(default = "default_encoding_width")]
    pub encoding_width: usize,
    #[serde(default = "default_leaf_hash_length")]
    pub leaf_hash_length: usize,
}

impl Default for ShieldTomlConfig {
    fn default() -> Self {
        Self {
            modulus: DEFAULT_FIELD_MODULUS.into(),
            rounds: DEFAULT_HASH_ROUNDS,
            encoding_width: DEFAULT_ENCODING_WIDTH,
            leaf_hash_length: DEFAULT_LEAF_HASH_LENGTH,
        }
    }
}

fn default_modulus() -> String {
    DEFAULT_FIELD_MODULUS.into()
}
fn default_rounds() -> usize {
    DEFAULT_HASH_ROUNDS
}
fn default_encoding_width() -> usize {
    DEFAULT_ENCODING_WIDTH
}
fn default_leaf_hash_length() -> usize {
    DEFAULT_LEAF_HASH_LENGTH
}

/// External prover addressing, passed through to proving contexts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProverTomlConfig {
    /// Address of the shield contract the prover binds proofs to.
    #[serde(default)]
    pub shield_contract: Option<String>,
    /// Directory holding circuit artifacts (proving keys etc.).
    #[serde(default)]
    pub artifact_dir: Option<String>,
}

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Set field from env var if present
fn env_string(key: &str, field: &mut String) {
    if let Ok(v) = env::var(key) {
        *field = v;
    }
}

/// Set Option<String> from env var if present
fn env_option_string(key: &str, field: &mut Option<String>) {
    if let Ok(v) = env::var(key) {
        *field = Some(v);
    }
}

/// Set field from env var if present and parseable
fn env_parse<T: std::str::FromStr>(key: &str, field: &mut T) {
    if let Ok(v) = env::var(key) {
        if let Ok(parsed) = v.parse() {
            *field = parsed;
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl UmbraConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check UMBRA_CONFIG env var
        if let Ok(path) = env::var("UMBRA_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check ./config.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.umbra/config.toml
        dirs::home_dir()
            .map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        env_string("UMBRA_FIELD_MODULUS", &mut self.shield.modulus);
        env_parse("UMBRA_HASH_ROUNDS", &mut self.shield.rounds);
        env_parse("UMBRA_ENCODING_WIDTH", &mut self.shield.encoding_width);
        env_parse("UMBRA_LEAF_HASH_LENGTH", &mut self.shield.leaf_hash_length);

        env_option_string("UMBRA_SHIELD_CONTRACT", &mut self.prover.shield_contract);
        env_option_string("UMBRA_ARTIFACT_DIR", &mut self.prover.artifact_dir);
    }

    /// Resolve and validate the field parameters from this configuration.
    pub fn shield_params(&self) -> Result<ShieldParams> {
        let s = self.shield.modulus.trim();
        let modulus = match s.strip_prefix("0x") {
            Some(hexpart) => BigUint::from_str_radix(hexpart, 16),
            None => BigUint::from_str_radix(s, 10),
        }
        .with_context(|| format!("Invalid field modulus: {s}"))?;

        if modulus < BigUint::from(2u8) {
            bail!("Field modulus must be at least 2");
        }
        if self.shield.rounds == 0 {
            bail!("Hash round count must be non-zero");
        }
        if self.shield.encoding_width == 0 || self.shield.leaf_hash_length == 0 {
            bail!("Encoding widths must be non-zero");
        }

        Ok(ShieldParams {
            modulus,
            rounds: self.shield.rounds,
            encoding_width: self.shield.encoding_width,
            leaf_hash_length: self.shield.leaf_hash_length,
        })
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}
