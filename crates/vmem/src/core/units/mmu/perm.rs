//! Leaf PTE permission checking.
//!
//! Decides whether an access may use a leaf mapping and whether the mapping's
//! accessed/dirty bits must be updated first. The same check runs on the walk
//! path and on every TLB hit, since privilege and `sstatus` may have changed
//! since the entry was cached.

use super::pte::{Pte, PteFlags};
use super::ptw::PtwError;
use crate::common::AccessKind;
use crate::core::arch::csr::StatusFlags;
use crate::core::arch::mode::PrivilegeMode;

/// An access asking for permission to use a mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessRequest {
    /// What the access does to memory.
    pub access: AccessKind,
    /// Effective privilege of the access.
    pub privilege: PrivilegeMode,
    /// MXR/SUM policy bits from `sstatus`.
    pub status: StatusFlags,
}

/// Outcome of a successful permission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permit {
    /// The PTE already has every A/D bit the access needs.
    Clean,
    /// The access is allowed once this updated PTE has been written back.
    NeedsUpdate(Pte),
}

/// Checks a leaf PTE against an access request.
///
/// # Errors
///
/// * [`PtwError::InvalidPte`] - the entry is not a valid leaf, or is write-only.
/// * [`PtwError::NoPermission`] - R/W/X or the U/SUM rules deny the access.
pub fn check_leaf(pte: &Pte, req: &AccessRequest) -> Result<Permit, PtwError> {
    if !pte.is_valid() || !pte.is_leaf() {
        return Err(PtwError::InvalidPte);
    }
    if pte.flags.contains(PteFlags::W) && !pte.flags.contains(PteFlags::R) {
        return Err(PtwError::InvalidPte);
    }

    let access = req.access;
    let f = pte.flags;
    if access.is_fetch() && !f.contains(PteFlags::X) {
        return Err(PtwError::NoPermission);
    }
    if access.reads()
        && !(f.contains(PteFlags::R) || (f.contains(PteFlags::X) && req.status.mxr))
    {
        return Err(PtwError::NoPermission);
    }
    if access.writes() && !f.contains(PteFlags::W) {
        return Err(PtwError::NoPermission);
    }

    match req.privilege {
        PrivilegeMode::User if !pte.is_user() => return Err(PtwError::NoPermission),
        PrivilegeMode::Supervisor | PrivilegeMode::Machine if pte.is_user() => {
            if !req.status.sum || access.is_fetch() {
                return Err(PtwError::NoPermission);
            }
        }
        _ => {}
    }

    Ok(access_bits_update(pte, access))
}

/// Computes the A/D bits an allowed access must set.
pub fn access_bits_update(pte: &Pte, access: AccessKind) -> Permit {
    let mut needed = PteFlags::A;
    if access.writes() {
        needed |= PteFlags::D;
    }
    if pte.flags.contains(needed) {
        Permit::Clean
    } else {
        Permit::NeedsUpdate(pte.with_flags(needed))
    }
}
