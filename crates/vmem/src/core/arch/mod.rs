//! RISC-V architectural state consumed by translation.
//!
//! This module contains the architectural elements the MMU reads. It includes:
//! 1. **CSRs:** `sstatus` and `satp`, with SATP legalization.
//! 2. **Modes:** Privilege mode definitions.
//! 3. **State:** The `HartState` seam and its CSR-backed implementation.

/// Translation-control CSR definitions and access logic.
pub mod csr;

/// Privilege mode definitions.
pub mod mode;

/// Hart state view used by the MMU.
pub mod state;
