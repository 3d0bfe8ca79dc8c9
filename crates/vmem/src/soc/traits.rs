//! Physical memory seam for the MMU.
//!
//! This module defines the trait through which translation reaches physical
//! memory. It provides:
//! 1. **Access:** Width-sized little-endian reads and writes at physical addresses.
//! 2. **Faults:** `MemoryFault`, reported back as access-fault exceptions.
//!
//! The MMU only issues PTE-sized accesses (4 or 8 bytes) at naturally aligned
//! addresses: one read per walk step and at most one accessed/dirty write-back
//! per translation.

use thiserror::Error;

use crate::common::{AccessKind, PhysAddr};

/// Failure of a physical memory access.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MemoryFault {
    /// No memory or device backs the address range.
    #[error("no memory at {addr:#x} (+{width} bytes)")]
    OutOfRange {
        /// Physical address of the access.
        addr: u64,
        /// Access width in bytes.
        width: u64,
    },

    /// The access is refused by the platform (PMP, PMA, bus error).
    #[error("access denied at {addr:#x}")]
    Denied {
        /// Physical address of the access.
        addr: u64,
    },

    /// Width is not 1, 2, 4 or 8, or the address is not a multiple of it.
    #[error("misaligned {width}-byte access at {addr:#x}")]
    Misaligned {
        /// Physical address of the access.
        addr: u64,
        /// Access width in bytes.
        width: u64,
    },
}

/// Physical memory as seen by the page-table walker.
pub trait PhysicalMemory {
    /// Reads `width` bytes at `addr`, zero-extended to 64 bits.
    ///
    /// `access` is the kind of implicit access being made (PTE reads are
    /// [`AccessKind::Read`]), so platforms can apply PMP/PMA rules.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if the platform cannot complete the access.
    fn read_phys(&mut self, addr: PhysAddr, width: u64, access: AccessKind)
    -> Result<u64, MemoryFault>;

    /// Writes the low `width` bytes of `value` at `addr`.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if the platform cannot complete the access.
    fn write_phys(
        &mut self,
        addr: PhysAddr,
        width: u64,
        value: u64,
        access: AccessKind,
    ) -> Result<(), MemoryFault>;
}
