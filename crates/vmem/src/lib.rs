//! RISC-V virtual memory translation library.
//!
//! This crate implements the address translation core of a RISC-V hart with the following:
//! 1. **Paging:** Sv32, Sv39 and Sv48 page table walks, including superpages and Svpbmt.
//! 2. **Protection:** R/W/X, U/SUM and MXR permission checks with accessed/dirty updates.
//! 3. **Caching:** A fully associative, ASID-tagged TLB with `SFENCE.VMA` scoping.
//! 4. **State:** SATP/`sstatus` CSR legalization and the hart-state seam the MMU reads.
//! 5. **Memory:** The physical memory trait page tables are read through, and a flat RAM.

/// Common types and constants (addresses, access kinds, traps).
pub mod common;
/// MMU configuration (defaults, enums, JSON loading).
pub mod config;
/// Hart state and the memory management unit.
pub mod core;
/// Physical memory (trait and RAM).
pub mod soc;
/// Translation statistics collection and reporting.
pub mod stats;

/// Address, access and trap types.
pub use crate::common::{AccessKind, MmuError, PhysAddr, Trap, VirtAddr};
/// Root configuration type; use `MmuConfig::default()` or load it from JSON.
pub use crate::config::MmuConfig;
/// Plain hart state backed by the translation CSRs.
pub use crate::core::arch::state::{ArchState, HartState};
/// The memory management unit; construct with `Mmu::new`.
pub use crate::core::units::mmu::{Mmu, Translation};
/// `SFENCE.VMA` invalidation scope.
pub use crate::core::units::mmu::tlb::FenceScope;
/// Physical memory backing the page tables.
pub use crate::soc::{PhysicalMemory, Ram};
