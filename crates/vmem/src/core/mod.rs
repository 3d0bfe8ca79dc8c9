//! Core processor state and units.
//!
//! This module contains the parts of a hart that address translation touches:
//! the architectural state it reads and the memory management unit itself.

/// Architecture-specific components (CSRs, privilege modes, hart state view).
pub mod arch;

/// Execution units (the memory management unit).
pub mod units;

pub use self::units::mmu::Mmu;
