//! Page Table Entry codec.
//!
//! Decodes PTE words of every supported mode into a common [`Pte`] and
//! re-encodes them at the mode's native width. Sv32 PTEs are 32 bits wide and
//! are zero-extended on decode; Sv39/Sv48 PTEs are 64 bits wide and carry an
//! extension region:
//!
//! ```text
//!  63  62 61  60      54 53        10 9   8 7 6 5 4 3 2 1 0
//! | N | PBMT | reserved |    PPN     | RSW |D|A|G|U|X|W|R|V|
//! ```
//!
//! Decoding never fails; malformed entries are rejected by
//! [`Pte::is_invalid`] during the walk.

use bitflags::bitflags;

use super::params::PagingParams;
use crate::common::constants::{
    PTE_NAPOT_SHIFT, PTE_PBMT_SHIFT, PTE_PPN_SHIFT, PTE_RESERVED_BITS, PTE_RESERVED_SHIFT,
};

bitflags! {
    /// The eight architectural flag bits in the low byte of every PTE.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PteFlags: u8 {
        /// Valid.
        const V = 1 << 0;
        /// Readable.
        const R = 1 << 1;
        /// Writable.
        const W = 1 << 2;
        /// Executable.
        const X = 1 << 3;
        /// Accessible from U-mode.
        const U = 1 << 4;
        /// Global mapping, present in every address space.
        const G = 1 << 5;
        /// Accessed.
        const A = 1 << 6;
        /// Dirty.
        const D = 1 << 7;
    }
}

/// Bit position of the two software-reserved (RSW) bits.
const PTE_RSW_SHIFT: u32 = 8;

/// Memory type requested by a leaf PTE through Svpbmt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MemoryType {
    /// Use the attributes of the underlying physical memory region.
    #[default]
    Pma,
    /// Non-cacheable, idempotent, weakly-ordered main memory.
    NonCacheable,
    /// Non-cacheable, non-idempotent, strongly-ordered I/O.
    Io,
}

impl MemoryType {
    /// Decodes a PBMT field; `None` for the reserved encoding 3.
    pub const fn from_pbmt(pbmt: u8) -> Option<Self> {
        match pbmt {
            0 => Some(Self::Pma),
            1 => Some(Self::NonCacheable),
            2 => Some(Self::Io),
            _ => None,
        }
    }
}

/// Extension region of an Sv39/Sv48 PTE. Always zero for Sv32.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct PteExt {
    /// Bits 60:54, reserved for future extensions.
    pub reserved: u8,
    /// Bits 62:61, Svpbmt memory type.
    pub pbmt: u8,
    /// Bit 63, Svnapot contiguous-range marker.
    pub napot: bool,
}

impl PteExt {
    /// Returns `true` if no extension bit is set.
    pub const fn is_clear(&self) -> bool {
        self.reserved == 0 && self.pbmt == 0 && !self.napot
    }
}

/// A decoded page table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Pte {
    /// Flag bits V/R/W/X/U/G/A/D.
    pub flags: PteFlags,
    /// Software-reserved bits 9:8.
    pub rsw: u8,
    /// Full physical page number.
    pub ppn: u64,
    /// Extension region.
    pub ext: PteExt,
}

impl Pte {
    /// Decodes a raw PTE word read under `params`.
    ///
    /// Bits above the mode's PTE width are ignored, so a 4-byte Sv32 entry
    /// may be passed in zero- or garbage-extended.
    pub fn decode(raw: u64, params: &PagingParams) -> Self {
        let raw = raw & params.pte_mask();
        let ext = if params.has_ext {
            PteExt {
                reserved: ((raw >> PTE_RESERVED_SHIFT) & ((1 << PTE_RESERVED_BITS) - 1)) as u8,
                pbmt: ((raw >> PTE_PBMT_SHIFT) & 0b11) as u8,
                napot: (raw >> PTE_NAPOT_SHIFT) & 1 != 0,
            }
        } else {
            PteExt::default()
        };

        Self {
            flags: PteFlags::from_bits_retain(raw as u8),
            rsw: ((raw >> PTE_RSW_SHIFT) & 0b11) as u8,
            ppn: (raw >> PTE_PPN_SHIFT) & params.ppn_mask(),
            ext,
        }
    }

    /// Re-encodes the entry at the native width of `params`.
    pub fn encode(&self, params: &PagingParams) -> u64 {
        let mut raw = u64::from(self.flags.bits())
            | (u64::from(self.rsw & 0b11) << PTE_RSW_SHIFT)
            | ((self.ppn & params.ppn_mask()) << PTE_PPN_SHIFT);
        if params.has_ext {
            raw |= (u64::from(self.ext.reserved) & ((1 << PTE_RESERVED_BITS) - 1))
                << PTE_RESERVED_SHIFT;
            raw |= (u64::from(self.ext.pbmt) & 0b11) << PTE_PBMT_SHIFT;
            raw |= u64::from(self.ext.napot) << PTE_NAPOT_SHIFT;
        }
        raw & params.pte_mask()
    }

    /// Returns PPN segment `index` (PPN[0] is the lowest).
    pub fn ppn_segment(&self, index: usize, params: &PagingParams) -> u64 {
        let shift: u32 = params.ppn_segments[..index].iter().sum();
        let width = params.ppn_segments[index];
        (self.ppn >> shift) & ((1 << width) - 1)
    }

    /// Returns `true` if the Valid bit is set.
    pub const fn is_valid(&self) -> bool {
        self.flags.contains(PteFlags::V)
    }

    /// Returns `true` if any of R/W/X is set, terminating the walk.
    pub const fn is_leaf(&self) -> bool {
        self.flags.intersects(PteFlags::R.union(PteFlags::W).union(PteFlags::X))
    }

    /// Returns `true` for a valid entry pointing to the next-level table.
    pub const fn is_pointer(&self) -> bool {
        self.is_valid() && !self.is_leaf()
    }

    /// Returns `true` if the Global bit is set.
    pub const fn is_global(&self) -> bool {
        self.flags.contains(PteFlags::G)
    }

    /// Returns `true` if the User bit is set.
    pub const fn is_user(&self) -> bool {
        self.flags.contains(PteFlags::U)
    }

    /// Returns `true` if the Accessed bit is set.
    pub const fn is_accessed(&self) -> bool {
        self.flags.contains(PteFlags::A)
    }

    /// Returns `true` if the Dirty bit is set.
    pub const fn is_dirty(&self) -> bool {
        self.flags.contains(PteFlags::D)
    }

    /// Returns a copy with `flags` additionally set.
    #[must_use]
    pub const fn with_flags(self, flags: PteFlags) -> Self {
        Self {
            flags: self.flags.union(flags),
            ..self
        }
    }

    /// Checks the bit patterns every PTE, pointer or leaf, must avoid.
    ///
    /// An entry is invalid if V is clear, if it is write-only (W without R),
    /// if a reserved extension bit is set, if it uses Svnapot (not
    /// implemented), or if its PBMT is reserved or Svpbmt is disabled.
    pub fn is_invalid(&self, svpbmt: bool) -> bool {
        if !self.is_valid() {
            return true;
        }
        if self.flags.contains(PteFlags::W) && !self.flags.contains(PteFlags::R) {
            return true;
        }
        if self.ext.reserved != 0 || self.ext.napot {
            return true;
        }
        match MemoryType::from_pbmt(self.ext.pbmt) {
            None => true,
            Some(MemoryType::Pma) => false,
            Some(_) => !svpbmt,
        }
    }

    /// Checks the bits that must be clear on a pointer entry.
    ///
    /// A, D and U are reserved on non-leaf entries, as is PBMT.
    pub const fn is_malformed_pointer(&self) -> bool {
        self.flags
            .intersects(PteFlags::A.union(PteFlags::D).union(PteFlags::U))
            || self.ext.pbmt != 0
    }

    /// Returns the memory type of a leaf.
    pub fn memory_type(&self) -> MemoryType {
        MemoryType::from_pbmt(self.ext.pbmt).unwrap_or_default()
    }
}
