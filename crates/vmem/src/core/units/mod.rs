//! Execution units and functional components.
//!
//! Only the memory management unit lives here; fetch and load/store
//! execution call into it for every access.

/// Memory Management Unit with TLB and page table walker.
pub mod mmu;
