//! Hart state seen by the MMU.
//!
//! Translation needs three pieces of hart state: the privilege of the access,
//! the MXR/SUM policy bits and the mapping control register. [`HartState`] is
//! the seam through which the MMU reads them; [`ArchState`] is the plain
//! implementation backed by [`Csrs`].

use super::csr::{Csrs, Satp, StatusFlags};
use super::mode::PrivilegeMode;

/// Read-only view of the hart state that drives translation.
pub trait HartState {
    /// Effective privilege of the access being translated.
    fn privilege(&self) -> PrivilegeMode;

    /// MXR/SUM policy bits.
    fn status(&self) -> StatusFlags;

    /// Mapping control register (SATP).
    fn satp(&self) -> Satp;
}

/// Privilege level plus translation CSRs of one hart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchState {
    /// Current (effective) privilege level.
    pub privilege: PrivilegeMode,
    /// Translation-control CSRs.
    pub csrs: Csrs,
}

impl ArchState {
    /// Creates a hart state in Machine mode with the given CSRs.
    pub const fn new(csrs: Csrs) -> Self {
        Self {
            privilege: PrivilegeMode::Machine,
            csrs,
        }
    }
}

impl HartState for ArchState {
    fn privilege(&self) -> PrivilegeMode {
        self.privilege
    }

    fn status(&self) -> StatusFlags {
        self.csrs.status()
    }

    fn satp(&self) -> Satp {
        self.csrs.satp()
    }
}
