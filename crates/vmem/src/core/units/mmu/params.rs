//! Paging modes and their per-mode parameters.
//!
//! Each paged mode is described by one immutable [`PagingParams`] record,
//! selected once per translation. The walker, PTE codec and TLB read their
//! geometry from that record instead of branching on the mode.

use std::fmt;

use crate::common::VirtAddr;
use crate::common::constants::PAGE_SHIFT;
use crate::config::Xlen;

/// Address translation scheme selected by SATP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PagingMode {
    /// Translation disabled: virtual addresses are physical addresses.
    Bare,
    /// Two-level scheme for RV32.
    Sv32,
    /// Three-level scheme for RV64.
    Sv39,
    /// Four-level scheme for RV64.
    Sv48,
}

/// SATP.MODE value for Bare at either width.
const SATP_MODE_BARE: u64 = 0;
/// SATP.MODE value for Sv32 (RV32).
const SATP_MODE_SV32: u64 = 1;
/// SATP.MODE value for Sv39 (RV64).
const SATP_MODE_SV39: u64 = 8;
/// SATP.MODE value for Sv48 (RV64).
const SATP_MODE_SV48: u64 = 9;

impl PagingMode {
    /// Decodes a SATP.MODE field for the given width.
    ///
    /// Returns `None` for encodings that are reserved or not implemented
    /// (including Sv57).
    pub const fn from_satp(xlen: Xlen, field: u64) -> Option<Self> {
        match (xlen, field) {
            (_, SATP_MODE_BARE) => Some(Self::Bare),
            (Xlen::Rv32, SATP_MODE_SV32) => Some(Self::Sv32),
            (Xlen::Rv64, SATP_MODE_SV39) => Some(Self::Sv39),
            (Xlen::Rv64, SATP_MODE_SV48) => Some(Self::Sv48),
            _ => None,
        }
    }

    /// Encodes the mode into a SATP.MODE field, or `None` if the width cannot use it.
    pub const fn satp_field(self, xlen: Xlen) -> Option<u64> {
        match (self, xlen) {
            (Self::Bare, _) => Some(SATP_MODE_BARE),
            (Self::Sv32, Xlen::Rv32) => Some(SATP_MODE_SV32),
            (Self::Sv39, Xlen::Rv64) => Some(SATP_MODE_SV39),
            (Self::Sv48, Xlen::Rv64) => Some(SATP_MODE_SV48),
            _ => None,
        }
    }

    /// Returns `true` if the mode can be selected at this operating width.
    pub const fn is_supported_on(self, xlen: Xlen) -> bool {
        self.satp_field(xlen).is_some()
    }

    /// Returns the geometry of a paged mode, `None` for Bare.
    pub const fn params(self) -> Option<&'static PagingParams> {
        match self {
            Self::Bare => None,
            Self::Sv32 => Some(&SV32),
            Self::Sv39 => Some(&SV39),
            Self::Sv48 => Some(&SV48),
        }
    }
}

impl fmt::Display for PagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bare => "Bare",
            Self::Sv32 => "Sv32",
            Self::Sv39 => "Sv39",
            Self::Sv48 => "Sv48",
        };
        f.write_str(name)
    }
}

/// Geometry of one paged translation mode.
#[derive(Debug, PartialEq, Eq)]
pub struct PagingParams {
    /// Mode this record describes.
    pub mode: PagingMode,
    /// Significant virtual-address bits.
    pub va_bits: u32,
    /// Physical-address bits a leaf can produce.
    pub pa_bits: u32,
    /// Number of page-table levels.
    pub levels: u32,
    /// Width of each VPN field.
    pub vpn_bits: u32,
    /// PTE size in bytes.
    pub pte_size: u64,
    /// Widths of the PPN segments, PPN[0] first.
    pub ppn_segments: &'static [u32],
    /// Whether PTEs carry the reserved/PBMT/N extension region (bits 63:54).
    pub has_ext: bool,
}

/// Sv32: 2 levels of 10-bit VPNs, 4-byte PTEs, 34-bit physical addresses.
pub const SV32: PagingParams = PagingParams {
    mode: PagingMode::Sv32,
    va_bits: 32,
    pa_bits: 34,
    levels: 2,
    vpn_bits: 10,
    pte_size: 4,
    ppn_segments: &[10, 12],
    has_ext: false,
};

/// Sv39: 3 levels of 9-bit VPNs, 8-byte PTEs, 56-bit physical addresses.
pub const SV39: PagingParams = PagingParams {
    mode: PagingMode::Sv39,
    va_bits: 39,
    pa_bits: 56,
    levels: 3,
    vpn_bits: 9,
    pte_size: 8,
    ppn_segments: &[9, 9, 26],
    has_ext: true,
};

/// Sv48: 4 levels of 9-bit VPNs, 8-byte PTEs, 56-bit physical addresses.
pub const SV48: PagingParams = PagingParams {
    mode: PagingMode::Sv48,
    va_bits: 48,
    pa_bits: 56,
    levels: 4,
    vpn_bits: 9,
    pte_size: 8,
    ppn_segments: &[9, 9, 9, 17],
    has_ext: true,
};

const _: () = {
    assert!(SV32.levels * SV32.vpn_bits + PAGE_SHIFT as u32 == SV32.va_bits);
    assert!(SV39.levels * SV39.vpn_bits + PAGE_SHIFT as u32 == SV39.va_bits);
    assert!(SV48.levels * SV48.vpn_bits + PAGE_SHIFT as u32 == SV48.va_bits);
};

impl PagingParams {
    /// Total number of PPN bits in a PTE.
    pub fn ppn_bits(&self) -> u32 {
        self.ppn_segments.iter().sum()
    }

    /// Mask covering the PPN field once shifted down to bit 0.
    pub fn ppn_mask(&self) -> u64 {
        (1u64 << self.ppn_bits()) - 1
    }

    /// Mask covering a whole PTE of this mode (4 or 8 bytes).
    pub const fn pte_mask(&self) -> u64 {
        if self.pte_size >= 8 {
            u64::MAX
        } else {
            (1u64 << (self.pte_size * 8)) - 1
        }
    }

    /// Total VPN width (all levels).
    pub const fn vpn_width(&self) -> u32 {
        self.levels * self.vpn_bits
    }

    /// Mask over the full VPN of a virtual address, shifted down to bit 0.
    pub const fn vpn_mask(&self) -> u64 {
        (1u64 << self.vpn_width()) - 1
    }

    /// Low PPN bits that must be zero for a leaf found at `level`.
    ///
    /// These bits are supplied by the virtual address instead, so a
    /// superpage whose PPN sets any of them is misaligned.
    pub const fn superpage_ppn_mask(&self, level: u32) -> u64 {
        (1u64 << (level * self.vpn_bits)) - 1
    }

    /// Mask over the bits of a virtual address that pass through untranslated
    /// for a leaf at `level` (page offset plus the lower VPN fields).
    pub const fn offset_mask(&self, level: u32) -> u64 {
        (1u64 << (PAGE_SHIFT as u32 + level * self.vpn_bits)) - 1
    }

    /// Checks the virtual-address validity rule of the mode.
    ///
    /// Sv32 addresses must fit in 32 bits; Sv39/Sv48 addresses must be
    /// sign-extended from bit `va_bits - 1`.
    pub const fn is_valid_vaddr(&self, vaddr: VirtAddr) -> bool {
        match self.mode {
            PagingMode::Sv32 => vaddr.is_zero_extended(self.va_bits),
            _ => vaddr.is_sign_extended(self.va_bits),
        }
    }
}
