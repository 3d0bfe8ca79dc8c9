//! Trap and Translation Error definitions.
//!
//! This module defines what a failed translation looks like to the rest of the hart. It provides:
//! 1. **Trap Representation:** The six synchronous exceptions address translation can raise.
//! 2. **Cause Encoding:** The `scause`/`mcause` exception code and `stval` value for each trap.
//! 3. **Error Handling:** `MmuError`, separating program-triggered traps from configuration defects.

use std::fmt;

use thiserror::Error;

use super::constants::{
    CAUSE_FETCH_ACCESS, CAUSE_FETCH_PAGE_FAULT, CAUSE_LOAD_ACCESS, CAUSE_LOAD_PAGE_FAULT,
    CAUSE_STORE_ACCESS, CAUSE_STORE_PAGE_FAULT,
};
use crate::config::Xlen;
use crate::core::units::mmu::params::PagingMode;

/// RISC-V exceptions raised by address translation.
///
/// Every variant carries the faulting virtual address, which the trap
/// delivery layer writes to `stval`/`mtval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Instruction access fault exception.
    ///
    /// Raised when reading or updating a PTE for an instruction fetch hits a
    /// physical-memory fault.
    InstructionAccessFault(u64),

    /// Load access fault exception.
    ///
    /// Raised when reading or updating a PTE for a load hits a physical-memory fault.
    LoadAccessFault(u64),

    /// Store/AMO access fault exception.
    ///
    /// Raised when reading or updating a PTE for a store or AMO hits a
    /// physical-memory fault.
    StoreAccessFault(u64),

    /// Instruction page fault exception.
    InstructionPageFault(u64),

    /// Load page fault exception.
    LoadPageFault(u64),

    /// Store/AMO page fault exception.
    StorePageFault(u64),
}

impl Trap {
    /// Returns the exception code written to `scause`/`mcause`.
    pub const fn cause(&self) -> u64 {
        match self {
            Self::InstructionAccessFault(_) => CAUSE_FETCH_ACCESS,
            Self::LoadAccessFault(_) => CAUSE_LOAD_ACCESS,
            Self::StoreAccessFault(_) => CAUSE_STORE_ACCESS,
            Self::InstructionPageFault(_) => CAUSE_FETCH_PAGE_FAULT,
            Self::LoadPageFault(_) => CAUSE_LOAD_PAGE_FAULT,
            Self::StorePageFault(_) => CAUSE_STORE_PAGE_FAULT,
        }
    }

    /// Returns the faulting virtual address (the trap value).
    pub const fn tval(&self) -> u64 {
        match self {
            Self::InstructionAccessFault(a)
            | Self::LoadAccessFault(a)
            | Self::StoreAccessFault(a)
            | Self::InstructionPageFault(a)
            | Self::LoadPageFault(a)
            | Self::StorePageFault(a) => *a,
        }
    }

    /// Returns `true` for the page-fault family.
    pub const fn is_page_fault(&self) -> bool {
        matches!(
            self,
            Self::InstructionPageFault(_) | Self::LoadPageFault(_) | Self::StorePageFault(_)
        )
    }
}

impl fmt::Display for Trap {
    /// Formats the trap for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionAccessFault(addr) => {
                write!(f, "InstructionAccessFault({addr:#x})")
            }
            Self::LoadAccessFault(addr) => write!(f, "LoadAccessFault({addr:#x})"),
            Self::StoreAccessFault(addr) => write!(f, "StoreAccessFault({addr:#x})"),
            Self::InstructionPageFault(addr) => write!(f, "InstructionPageFault({addr:#x})"),
            Self::LoadPageFault(addr) => write!(f, "LoadPageFault({addr:#x})"),
            Self::StorePageFault(addr) => write!(f, "StorePageFault({addr:#x})"),
        }
    }
}

impl std::error::Error for Trap {}

/// Error returned by [`Mmu::translate`](crate::core::units::mmu::Mmu::translate).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MmuError {
    /// The access faulted; deliver the trap to the hart.
    #[error("translation fault: {0}")]
    Fault(#[from] Trap),

    /// The mapping control register selects a mode the operating width cannot
    /// use. This is a configuration defect, never a program-triggered condition.
    #[error("paging mode {mode} is not supported on {xlen}")]
    UnsupportedMode {
        /// Mode found in the mapping control register.
        mode: PagingMode,
        /// Operating width of the hart.
        xlen: Xlen,
    },
}

impl MmuError {
    /// Returns the architectural trap, if this error is one.
    pub const fn trap(&self) -> Option<Trap> {
        match self {
            Self::Fault(trap) => Some(*trap),
            Self::UnsupportedMode { .. } => None,
        }
    }

    /// Returns `true` if the error must halt the machine rather than trap.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedMode { .. })
    }
}
