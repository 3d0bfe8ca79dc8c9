//! Configuration for the translation core.
//!
//! This module defines the configuration structures used to parameterize the
//! MMU. It provides:
//! 1. **Defaults:** Baseline hardware constants (TLB geometry, ASID width, extensions).
//! 2. **Structures:** `MmuConfig`, deserializable from JSON with per-field defaults.
//! 3. **Enums:** Operating width and TLB replacement policy.
//! 4. **Validation:** Rejection of geometries the hardware could not implement.
//!
//! Configuration is supplied as JSON (string or file) or built with `MmuConfig::default()`.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants for the MMU.
mod defaults {
    /// Translation Lookaside Buffer entry count.
    pub const TLB_SIZE: usize = 32;

    /// Sv48 is implemented alongside Sv39 on RV64.
    pub const SV48: bool = true;

    /// Hardware updates the A/D bits itself (Svadu behaviour).
    pub const HARDWARE_AD_UPDATE: bool = true;

    /// Page-based memory types are implemented.
    pub const SVPBMT: bool = true;

    /// Maximum ASID width on RV32.
    pub const ASID_BITS_RV32: u8 = 9;

    /// Maximum ASID width on RV64.
    pub const ASID_BITS_RV64: u8 = 16;
}

/// Operating width of the hart (XLEN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Xlen {
    /// 32-bit operation: Sv32 is the only paged mode.
    #[serde(alias = "RV32", alias = "rv32")]
    Rv32,

    /// 64-bit operation: Sv39 and optionally Sv48.
    #[default]
    #[serde(alias = "RV64", alias = "rv64")]
    Rv64,
}

impl Xlen {
    /// Returns the register width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Rv32 => 32,
            Self::Rv64 => 64,
        }
    }

    /// Returns the widest ASID the SATP register can hold at this width.
    pub const fn max_asid_bits(self) -> u8 {
        match self {
            Self::Rv32 => defaults::ASID_BITS_RV32,
            Self::Rv64 => defaults::ASID_BITS_RV64,
        }
    }
}

impl fmt::Display for Xlen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rv32 => write!(f, "RV32"),
            Self::Rv64 => write!(f, "RV64"),
        }
    }
}

/// TLB victim selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TlbPolicy {
    /// Evict entries in fill order (a rotating pointer).
    #[default]
    #[serde(alias = "Fifo", alias = "FIFO")]
    RoundRobin,

    /// Evict the entry that has gone longest without a hit.
    #[serde(alias = "LRU")]
    Lru,
}

/// Errors raised while loading or validating an [`MmuConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid MMU configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read MMU configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A TLB needs at least one entry.
    #[error("tlb_size must be at least 1 (got {0})")]
    InvalidTlbSize(usize),

    /// The ASID width exceeds what SATP can hold at this width.
    #[error("asid_bits {bits} exceeds the {max}-bit ASID field of {xlen} SATP")]
    InvalidAsidBits {
        /// Requested width.
        bits: u8,
        /// Largest legal width.
        max: u8,
        /// Operating width.
        xlen: Xlen,
    },
}

/// MMU configuration.
///
/// # Examples
///
/// ```
/// use rvsim_vmem::config::{MmuConfig, TlbPolicy, Xlen};
///
/// let json = r#"{ "xlen": "Rv64", "tlb_size": 64, "tlb_policy": "Lru" }"#;
/// let config = MmuConfig::from_json(json).unwrap();
/// assert_eq!(config.xlen, Xlen::Rv64);
/// assert_eq!(config.tlb_size, 64);
/// assert_eq!(config.tlb_policy, TlbPolicy::Lru);
/// assert_eq!(config.asid_bits(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MmuConfig {
    /// Operating width of the hart.
    #[serde(default)]
    pub xlen: Xlen,

    /// Number of TLB entries.
    #[serde(default = "MmuConfig::default_tlb_size")]
    pub tlb_size: usize,

    /// TLB replacement policy.
    #[serde(default)]
    pub tlb_policy: TlbPolicy,

    /// Whether Sv48 is implemented (RV64 only).
    #[serde(default = "MmuConfig::default_sv48")]
    pub sv48: bool,

    /// Implemented ASID width; `None` selects the maximum for `xlen`.
    #[serde(default)]
    pub asid_bits: Option<u8>,

    /// Whether the platform updates PTE accessed/dirty bits in hardware.
    ///
    /// When `false`, an access that would need an update raises a page fault
    /// so that software can set the bits itself.
    #[serde(default = "MmuConfig::default_hardware_ad_update")]
    pub hardware_ad_update: bool,

    /// Whether the Svpbmt page-based memory types are implemented.
    #[serde(default = "MmuConfig::default_svpbmt")]
    pub svpbmt: bool,
}

impl MmuConfig {
    fn default_tlb_size() -> usize {
        defaults::TLB_SIZE
    }

    fn default_sv48() -> bool {
        defaults::SV48
    }

    fn default_hardware_ad_update() -> bool {
        defaults::HARDWARE_AD_UPDATE
    }

    fn default_svpbmt() -> bool {
        defaults::SVPBMT
    }

    /// Returns the effective ASID width.
    pub fn asid_bits(&self) -> u8 {
        self.asid_bits.unwrap_or_else(|| self.xlen.max_asid_bits())
    }

    /// Checks the configuration for geometries the hardware cannot implement.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTlbSize`] for an empty TLB and
    /// [`ConfigError::InvalidAsidBits`] for an ASID wider than SATP allows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tlb_size == 0 {
            return Err(ConfigError::InvalidTlbSize(self.tlb_size));
        }
        let max = self.xlen.max_asid_bits();
        let bits = self.asid_bits();
        if bits > max {
            return Err(ConfigError::InvalidAsidBits {
                bits,
                max,
                xlen: self.xlen,
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input, or a validation error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`MmuConfig::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self {
            xlen: Xlen::default(),
            tlb_size: defaults::TLB_SIZE,
            tlb_policy: TlbPolicy::default(),
            sv48: defaults::SV48,
            asid_bits: None,
            hardware_ad_update: defaults::HARDWARE_AD_UPDATE,
            svpbmt: defaults::SVPBMT,
        }
    }
}
