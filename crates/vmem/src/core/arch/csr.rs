//! Translation-control CSRs.
//!
//! This module implements the two CSRs address translation reads. It provides:
//! 1. **Address Definitions:** CSR numbers for `sstatus` and `satp`.
//! 2. **Field Decoding:** `Satp` (mode, ASID, root PPN) and `StatusFlags` (MXR, SUM).
//! 3. **Register Storage:** The `Csrs` struct holding the architectural values.
//! 4. **Legalization:** SATP writes selecting an unimplemented mode are ignored.

use tracing::debug;

use crate::common::PhysAddr;
use crate::common::constants::{
    SATP32_ASID_MASK, SATP32_ASID_SHIFT, SATP32_MODE_SHIFT, SATP32_PPN_MASK, SATP64_ASID_MASK,
    SATP64_ASID_SHIFT, SATP64_MODE_MASK, SATP64_MODE_SHIFT, SATP64_PPN_MASK, SSTATUS_MXR,
    SSTATUS_SUM,
};
use crate::config::{MmuConfig, Xlen};
use crate::core::units::mmu::params::PagingMode;

/// Supervisor status register CSR address.
pub const SSTATUS: u32 = 0x100;

/// Supervisor address translation and protection register CSR address.
pub const SATP: u32 = 0x180;

/// Translation policy bits taken from `sstatus`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatusFlags {
    /// Make eXecutable Readable: loads may use execute-only pages.
    pub mxr: bool,
    /// Supervisor User Memory: S-mode loads/stores may use U pages.
    pub sum: bool,
}

impl StatusFlags {
    /// Extracts MXR and SUM from an `sstatus` (or `mstatus`) value.
    pub const fn from_sstatus(sstatus: u64) -> Self {
        Self {
            mxr: sstatus & SSTATUS_MXR != 0,
            sum: sstatus & SSTATUS_SUM != 0,
        }
    }
}

/// Decoded mapping control register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Satp {
    /// Selected translation mode.
    pub mode: PagingMode,
    /// Address space identifier.
    pub asid: u16,
    /// Physical page number of the root page table.
    pub ppn: u64,
}

impl Satp {
    /// SATP value after reset: translation disabled.
    pub const BARE: Self = Self {
        mode: PagingMode::Bare,
        asid: 0,
        ppn: 0,
    };

    /// Decodes a raw SATP value at the given width.
    ///
    /// Returns `None` if the MODE field holds an encoding the width does not define.
    pub const fn decode(raw: u64, xlen: Xlen) -> Option<Self> {
        let (field, asid, ppn) = match xlen {
            Xlen::Rv32 => (
                (raw >> SATP32_MODE_SHIFT) & 1,
                (raw >> SATP32_ASID_SHIFT) & SATP32_ASID_MASK,
                raw & SATP32_PPN_MASK,
            ),
            Xlen::Rv64 => (
                (raw >> SATP64_MODE_SHIFT) & SATP64_MODE_MASK,
                (raw >> SATP64_ASID_SHIFT) & SATP64_ASID_MASK,
                raw & SATP64_PPN_MASK,
            ),
        };
        match PagingMode::from_satp(xlen, field) {
            Some(mode) => Some(Self {
                mode,
                asid: asid as u16,
                ppn,
            }),
            None => None,
        }
    }

    /// Encodes the register at the given width.
    ///
    /// A mode the width cannot hold is encoded as Bare.
    pub fn encode(&self, xlen: Xlen) -> u64 {
        let field = self.mode.satp_field(xlen).unwrap_or(0);
        let asid = u64::from(self.asid);
        match xlen {
            Xlen::Rv32 => {
                (field << SATP32_MODE_SHIFT)
                    | ((asid & SATP32_ASID_MASK) << SATP32_ASID_SHIFT)
                    | (self.ppn & SATP32_PPN_MASK)
            }
            Xlen::Rv64 => {
                (field << SATP64_MODE_SHIFT)
                    | ((asid & SATP64_ASID_MASK) << SATP64_ASID_SHIFT)
                    | (self.ppn & SATP64_PPN_MASK)
            }
        }
    }

    /// Returns the physical base address of the root page table.
    pub const fn root_table(&self) -> PhysAddr {
        PhysAddr::from_ppn(self.ppn)
    }
}

/// Control and Status Registers consulted by translation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Csrs {
    /// Operating width; fixes the SATP layout.
    xlen: Xlen,
    /// Implemented ASID bits; higher ASID bits read as zero.
    asid_bits: u8,
    /// Whether SATP accepts Sv48.
    sv48: bool,
    /// Supervisor status register.
    pub sstatus: u64,
    /// Raw, legalized SATP value.
    satp: u64,
}

impl Csrs {
    /// Creates the reset state for a hart configured by `config`.
    pub fn new(config: &MmuConfig) -> Self {
        Self {
            xlen: config.xlen,
            asid_bits: config.asid_bits(),
            sv48: config.sv48,
            sstatus: 0,
            satp: 0,
        }
    }

    /// Returns the operating width.
    pub const fn xlen(&self) -> Xlen {
        self.xlen
    }

    /// Reads a CSR value. Unknown addresses read as zero.
    pub const fn read(&self, addr: u32) -> u64 {
        match addr {
            SSTATUS => self.sstatus,
            SATP => self.satp,
            _ => 0,
        }
    }

    /// Writes a CSR, applying WARL legalization. Unknown addresses are ignored.
    pub fn write(&mut self, addr: u32, val: u64) {
        let val = match self.xlen {
            Xlen::Rv32 => val & u64::from(u32::MAX),
            Xlen::Rv64 => val,
        };
        match addr {
            SSTATUS => self.sstatus = val,
            SATP => self.write_satp(val),
            _ => {}
        }
    }

    /// Legalizes and stores a SATP write.
    ///
    /// A write selecting a mode this hart does not implement leaves the
    /// register unchanged. ASID bits beyond `asid_bits` are dropped.
    fn write_satp(&mut self, val: u64) {
        let decoded = Satp::decode(val, self.xlen)
            .filter(|satp| satp.mode != PagingMode::Sv48 || self.sv48);
        let Some(mut satp) = decoded else {
            debug!(val = format_args!("{val:#x}"), xlen = %self.xlen, "satp write rejected: unsupported mode");
            return;
        };
        satp.asid &= ((1u32 << self.asid_bits) - 1) as u16;
        self.satp = satp.encode(self.xlen);
    }

    /// Returns the decoded SATP register.
    pub fn satp(&self) -> Satp {
        Satp::decode(self.satp, self.xlen).unwrap_or(Satp::BARE)
    }

    /// Returns the MXR/SUM policy bits.
    pub const fn status(&self) -> StatusFlags {
        StatusFlags::from_sstatus(self.sstatus)
    }
}
