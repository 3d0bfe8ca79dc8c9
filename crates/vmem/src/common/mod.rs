//! Common utilities and types used throughout the translation core.
//!
//! This module provides the building blocks shared by every MMU component. It includes:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Constants:** Page, PTE, SATP and exception-code constants.
//! 3. **Memory Access:** Classification of the accesses that request translation.
//! 4. **Error Handling:** Trap representations and the translation error type.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Architectural constants used by the MMU.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types and trap definitions.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{PAGE_OFFSET_MASK, PAGE_SHIFT, PAGE_SIZE};
pub use data::{AccessKind, PlatformAccess};
pub use error::{MmuError, Trap};
