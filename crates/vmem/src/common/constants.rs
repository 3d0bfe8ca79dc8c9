//! Global Translation Constants.
//!
//! This module defines the architectural constants shared by the MMU. It includes:
//! 1. **Page Constants:** Page size, offset mask and shift.
//! 2. **PTE Layout:** Positions of the PPN and of the Sv39/Sv48 extension region.
//! 3. **Status Bits:** MXR and SUM positions in `sstatus`.
//! 4. **SATP Layout:** Mode, ASID and PPN fields for both operating widths.
//! 5. **Exception Codes:** `scause` values for the faults translation can raise.

/// Page size in bytes (4KB).
pub const PAGE_SIZE: u64 = 4096;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u64 = 12;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: u64 = PAGE_SIZE - 1;

/// Bit position of the first PPN bit in every PTE format.
pub const PTE_PPN_SHIFT: u32 = 10;

/// Bit position of the reserved extension field in Sv39/Sv48 PTEs (bits 60:54).
pub const PTE_RESERVED_SHIFT: u32 = 54;

/// Width of the reserved extension field.
pub const PTE_RESERVED_BITS: u32 = 7;

/// Bit position of the Svpbmt memory-type field (bits 62:61).
pub const PTE_PBMT_SHIFT: u32 = 61;

/// Bit position of the Svnapot N bit.
pub const PTE_NAPOT_SHIFT: u32 = 63;

/// Supervisor User Memory access bit in `sstatus`.
pub const SSTATUS_SUM: u64 = 1 << 18;

/// Make eXecutable Readable bit in `sstatus`.
pub const SSTATUS_MXR: u64 = 1 << 19;

/// SATP mode field shift on RV32 (single bit).
pub const SATP32_MODE_SHIFT: u32 = 31;

/// SATP ASID field shift on RV32.
pub const SATP32_ASID_SHIFT: u32 = 22;

/// SATP ASID field mask on RV32 (9 bits).
pub const SATP32_ASID_MASK: u64 = 0x1FF;

/// SATP PPN field mask on RV32 (22 bits).
pub const SATP32_PPN_MASK: u64 = 0x3F_FFFF;

/// SATP mode field shift on RV64.
pub const SATP64_MODE_SHIFT: u32 = 60;

/// SATP mode field mask on RV64 (4 bits).
pub const SATP64_MODE_MASK: u64 = 0xF;

/// SATP ASID field shift on RV64.
pub const SATP64_ASID_SHIFT: u32 = 44;

/// SATP ASID field mask on RV64 (16 bits).
pub const SATP64_ASID_MASK: u64 = 0xFFFF;

/// SATP PPN field mask on RV64 (44 bits).
pub const SATP64_PPN_MASK: u64 = 0xFFF_FFFF_FFFF;

/// Exception code: instruction access fault.
pub const CAUSE_FETCH_ACCESS: u64 = 1;

/// Exception code: load access fault.
pub const CAUSE_LOAD_ACCESS: u64 = 5;

/// Exception code: store/AMO access fault.
pub const CAUSE_STORE_ACCESS: u64 = 7;

/// Exception code: instruction page fault.
pub const CAUSE_FETCH_PAGE_FAULT: u64 = 12;

/// Exception code: load page fault.
pub const CAUSE_LOAD_PAGE_FAULT: u64 = 13;

/// Exception code: store/AMO page fault.
pub const CAUSE_STORE_PAGE_FAULT: u64 = 15;
