//! Physical and Virtual Address types.
//!
//! This module defines strong types for the two address spaces the MMU moves
//! between. It provides the following:
//! 1. **Type Safety:** Distinguishes between virtual and physical addresses at compile time.
//! 2. **Field Access:** Page offset, page number and per-level VPN slices.
//! 3. **Validity:** The sign-extension rule that every paged virtual address must obey.

use std::fmt;

use super::constants::{PAGE_OFFSET_MASK, PAGE_SHIFT};

/// A virtual address as issued by fetch, load, store or AMO execution.
///
/// Virtual addresses are always carried as 64-bit values; on RV32 the upper
/// 32 bits must be zero for the address to be translatable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VirtAddr(pub u64);

/// A physical address produced by translation.
///
/// Sv32 produces 34-bit physical addresses and Sv39/Sv48 produce 56-bit ones,
/// so a `u64` covers every mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Extracts the byte offset within a 4 KiB page.
    #[inline(always)]
    pub const fn page_offset(&self) -> u64 {
        self.0 & PAGE_OFFSET_MASK
    }

    /// Returns the full virtual page number (the address shifted past the page offset).
    #[inline(always)]
    pub const fn page_number(&self) -> u64 {
        self.0 >> PAGE_SHIFT
    }

    /// Extracts the VPN slice used to index the table at `level`.
    ///
    /// # Arguments
    ///
    /// * `level` - Walk level, 0 being the last table consulted.
    /// * `vpn_bits` - Width of one VPN field (10 for Sv32, 9 for Sv39/Sv48).
    #[inline]
    pub const fn vpn(&self, level: u32, vpn_bits: u32) -> u64 {
        (self.0 >> (PAGE_SHIFT as u32 + level * vpn_bits)) & ((1 << vpn_bits) - 1)
    }

    /// Checks that bits `63..va_bits` are all copies of bit `va_bits - 1`.
    ///
    /// Sv39 and Sv48 require this; an address that fails the check is not a
    /// memory fault but an invalid address.
    pub const fn is_sign_extended(&self, va_bits: u32) -> bool {
        let shift = 64 - va_bits;
        (((self.0 << shift) as i64) >> shift) as u64 == self.0
    }

    /// Checks that the address fits in `bits` bits with no upper bits set.
    pub const fn is_zero_extended(&self, bits: u32) -> bool {
        bits >= 64 || self.0 >> bits == 0
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Builds the base address of the physical page `ppn`.
    #[inline(always)]
    pub const fn from_ppn(ppn: u64) -> Self {
        Self(ppn << PAGE_SHIFT)
    }

    /// Returns the physical page number.
    #[inline(always)]
    pub const fn page_number(&self) -> u64 {
        self.0 >> PAGE_SHIFT
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
