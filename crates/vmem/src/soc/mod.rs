//! System-on-Chip (SoC) Components.
//!
//! This module holds the physical side of translation: the trait the page
//! table walker reads and writes PTEs through, and a flat RAM implementing it.

/// Flat physical RAM.
pub mod memory;

/// Physical memory trait definitions.
pub mod traits;

pub use memory::Ram;
pub use traits::{MemoryFault, PhysicalMemory};
