//! Hardware Page Table Walker (PTW) for Sv32, Sv39 and Sv48.
//!
//! This module implements the hardware page table walking algorithm. Starting
//! from the root table named by SATP it descends one level per step, from
//! `levels - 1` down to 0, until it reaches a leaf PTE or fails. The walk
//! depth is bounded by the mode's level count (2 to 4), so the descent is a
//! plain loop.
//!
//! The walker never writes memory: it reports whether the leaf needs an
//! accessed/dirty update and leaves the write-back to the caller.

use tracing::trace;

use super::params::PagingParams;
use super::perm::{AccessRequest, Permit, check_leaf};
use super::pte::{MemoryType, Pte};
use crate::common::{AccessKind, PAGE_SHIFT, PhysAddr, Trap, VirtAddr};
use crate::soc::traits::{MemoryFault, PhysicalMemory};

/// Classified reason a walk or a permission check failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PtwError {
    /// The virtual address is not sign-extended (or zero-extended on Sv32).
    InvalidAddress,
    /// V clear, write-only, reserved bits set, or a pointer where a leaf must be.
    InvalidPte,
    /// The leaf does not grant the access at the requesting privilege.
    NoPermission,
    /// A superpage leaf whose PPN is not aligned to the superpage size.
    MisalignedSuperpage,
    /// Reading or writing a PTE faulted in physical memory.
    AccessFault(MemoryFault),
    /// The accessed/dirty bits need updating but the platform will not do it.
    PteUpdate,
}

impl PtwError {
    /// Maps the classification to the architectural exception for `access`.
    ///
    /// Physical memory failures become access faults; every other reason is
    /// a page fault. The fetch/load/store flavour follows the original access.
    pub const fn to_trap(self, access: AccessKind, vaddr: VirtAddr) -> Trap {
        let addr = vaddr.val();
        match (self, access.is_fetch(), access.writes()) {
            (Self::AccessFault(_), true, _) => Trap::InstructionAccessFault(addr),
            (Self::AccessFault(_), false, true) => Trap::StoreAccessFault(addr),
            (Self::AccessFault(_), false, false) => Trap::LoadAccessFault(addr),
            (_, true, _) => Trap::InstructionPageFault(addr),
            (_, false, true) => Trap::StorePageFault(addr),
            (_, false, false) => Trap::LoadPageFault(addr),
        }
    }
}

/// Extension state accumulated by a walk, reported on success and failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkExt {
    /// Svpbmt memory type of the leaf (PMA until a leaf is reached).
    pub memory_type: MemoryType,
    /// Number of PTEs read from memory.
    pub pte_reads: u8,
}

/// A completed walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PtwSuccess {
    /// Translated physical address.
    pub paddr: PhysAddr,
    /// Raw leaf PTE as read from memory.
    pub raw: u64,
    /// Decoded leaf PTE.
    pub pte: Pte,
    /// Physical address the leaf was read from.
    pub pte_addr: PhysAddr,
    /// Level the leaf was found at; above 0 for superpages.
    pub level: u32,
    /// OR of the G bits of every PTE on the path.
    pub global: bool,
    /// Accessed/dirty update the access requires.
    pub permit: Permit,
    /// Extension state.
    pub ext: WalkExt,
}

/// A failed walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PtwFailure {
    /// Why the walk failed.
    pub error: PtwError,
    /// Extension state accumulated up to the failure.
    pub ext: WalkExt,
}

/// Outcome of a page table walk.
pub type PtwResult = Result<PtwSuccess, PtwFailure>;

/// Performs a hardware page table walk.
///
/// # Arguments
///
/// * `params` - Geometry of the active paging mode.
/// * `root` - Physical base of the root table (SATP.PPN << 12).
/// * `vaddr` - The virtual address to translate; must already be validated.
/// * `req` - The access, its privilege and the MXR/SUM bits.
/// * `svpbmt` - Whether non-zero PBMT encodings are legal.
/// * `mem` - Physical memory holding the page tables.
pub fn page_table_walk<M: PhysicalMemory + ?Sized>(
    params: &PagingParams,
    root: PhysAddr,
    vaddr: VirtAddr,
    req: &AccessRequest,
    svpbmt: bool,
    mem: &mut M,
) -> PtwResult {
    let mut ext = WalkExt::default();
    let mut table = root;
    let mut global = false;

    for level in (0..params.levels).rev() {
        let vpn_i = vaddr.vpn(level, params.vpn_bits);
        let pte_addr = PhysAddr::new(table.val() + vpn_i * params.pte_size);

        let raw = match mem.read_phys(pte_addr, params.pte_size, AccessKind::Read) {
            Ok(raw) => raw & params.pte_mask(),
            Err(fault) => return Err(failure(PtwError::AccessFault(fault), ext)),
        };
        ext.pte_reads += 1;
        let pte = Pte::decode(raw, params);
        trace!(level, pte_addr = %pte_addr, raw = format_args!("{raw:#x}"), "ptw step");

        if pte.is_invalid(svpbmt) {
            return Err(failure(PtwError::InvalidPte, ext));
        }

        if pte.is_pointer() {
            if level == 0 || pte.is_malformed_pointer() {
                return Err(failure(PtwError::InvalidPte, ext));
            }
            global |= pte.is_global();
            table = PhysAddr::from_ppn(pte.ppn);
            continue;
        }

        let permit = check_leaf(&pte, req).map_err(|error| failure(error, ext))?;

        if level > 0 && pte.ppn & params.superpage_ppn_mask(level) != 0 {
            return Err(failure(PtwError::MisalignedSuperpage, ext));
        }

        global |= pte.is_global();
        ext.memory_type = pte.memory_type();

        let offset_mask = params.offset_mask(level);
        let paddr = ((pte.ppn << PAGE_SHIFT) & !offset_mask) | (vaddr.val() & offset_mask);

        return Ok(PtwSuccess {
            paddr: PhysAddr::new(paddr),
            raw,
            pte,
            pte_addr,
            level,
            global,
            permit,
            ext,
        });
    }

    Err(failure(PtwError::InvalidPte, ext))
}

const fn failure(error: PtwError, ext: WalkExt) -> PtwFailure {
    PtwFailure { error, ext }
}
