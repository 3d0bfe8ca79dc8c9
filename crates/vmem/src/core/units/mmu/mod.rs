//! Memory Management Unit (MMU).
//!
//! This module implements the Memory Management Unit, responsible for
//! virtual-to-physical address translation. It supports the RISC-V Sv32,
//! Sv39 and Sv48 paging schemes and caches completed walks in a TLB.
//!
//! A translation request goes through these steps:
//! 1. Resolve the paging mode from SATP and the access privilege; Bare (and
//!    every Machine-mode access) maps identically without touching the TLB.
//! 2. Reject virtual addresses that break the mode's sign-extension rule.
//! 3. Look the page up in the TLB. A hit re-checks permissions against the
//!    cached PTE; a miss walks the page table and caches the result.
//! 4. Write back accessed/dirty updates, to memory and to the cached entry.
//! 5. Map any failure to the fetch, load or store/AMO exception.

/// Paging modes and per-mode geometry.
pub mod params;

/// Leaf permission checks and accessed/dirty bookkeeping.
pub mod perm;

/// Page table entry codec.
pub mod pte;

/// Page table walker implementation for Sv32/Sv39/Sv48.
pub mod ptw;

/// Translation Lookaside Buffer (TLB) for caching virtual-to-physical address translations.
pub mod tlb;

use tracing::{debug, error, trace};

use self::params::{PagingMode, PagingParams};
use self::perm::{AccessRequest, Permit, check_leaf};
use self::pte::{MemoryType, Pte};
use self::ptw::{PtwError, page_table_walk};
use self::tlb::{FenceScope, Tlb, TlbFill};
use crate::common::{AccessKind, MmuError, PhysAddr, VirtAddr};
use crate::config::{ConfigError, MmuConfig, Xlen};
use crate::core::arch::csr::Satp;
use crate::core::arch::state::HartState;
use crate::soc::traits::PhysicalMemory;
use crate::stats::MmuStats;

/// A successful translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    /// Physical address of the access.
    pub paddr: PhysAddr,
    /// Memory type requested by the leaf PTE (PMA when translation is off).
    pub memory_type: MemoryType,
}

impl Translation {
    /// An untranslated access: the physical address is the virtual address.
    const fn identity(vaddr: VirtAddr) -> Self {
        Self {
            paddr: PhysAddr::new(vaddr.val()),
            memory_type: MemoryType::Pma,
        }
    }
}

/// Memory Management Unit for one hart.
///
/// Owns the hart's TLB. Nothing here is shared between harts; page-table
/// changes made by other agents only become visible after a fence.
#[derive(Clone, Debug)]
pub struct Mmu {
    /// Unified TLB for fetches and data accesses.
    tlb: Tlb,
    /// Operating width of the hart.
    xlen: Xlen,
    /// Sv48 is implemented.
    sv48: bool,
    /// Platform writes accessed/dirty updates itself.
    hardware_ad_update: bool,
    /// Svpbmt memory types are implemented.
    svpbmt: bool,
    /// Counters.
    stats: MmuStats,
}

impl Mmu {
    /// Creates an MMU with an empty TLB.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn new(config: &MmuConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tlb: Tlb::new(config.tlb_size, config.tlb_policy),
            xlen: config.xlen,
            sv48: config.sv48,
            hardware_ad_update: config.hardware_ad_update,
            svpbmt: config.svpbmt,
            stats: MmuStats::default(),
        })
    }

    /// Translates a virtual address to a physical address.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - Virtual address to translate
    /// * `access` - Kind of access (fetch, load, store, AMO, platform)
    /// * `hart` - Privilege, MXR/SUM and SATP of the requesting hart
    /// * `mem` - Physical memory holding the page tables
    ///
    /// # Errors
    ///
    /// [`MmuError::Fault`] carries the exception to deliver to the hart.
    /// [`MmuError::UnsupportedMode`] means SATP holds a mode the operating
    /// width cannot use, or Sv48 on a hart without it. Only a misconfigured
    /// hart can produce this.
    ///
    /// # Examples
    ///
    /// ```
    /// use rvsim_vmem::common::{AccessKind, VirtAddr};
    /// use rvsim_vmem::config::MmuConfig;
    /// use rvsim_vmem::core::arch::csr::Csrs;
    /// use rvsim_vmem::core::arch::state::ArchState;
    /// use rvsim_vmem::core::units::mmu::Mmu;
    /// use rvsim_vmem::soc::Ram;
    ///
    /// let config = MmuConfig::default();
    /// let mut mmu = Mmu::new(&config).unwrap();
    /// let hart = ArchState::new(Csrs::new(&config));
    /// let mut ram = Ram::new(0x8000_0000, 0x1000);
    ///
    /// // Machine mode never translates.
    /// let t = mmu
    ///     .translate(VirtAddr::new(0x8000_0010), AccessKind::Execute, &hart, &mut ram)
    ///     .unwrap();
    /// assert_eq!(t.paddr.val(), 0x8000_0010);
    /// assert!(mmu.tlb().is_empty());
    /// ```
    pub fn translate<H, M>(
        &mut self,
        vaddr: VirtAddr,
        access: AccessKind,
        hart: &H,
        mem: &mut M,
    ) -> Result<Translation, MmuError>
    where
        H: HartState + ?Sized,
        M: PhysicalMemory + ?Sized,
    {
        let privilege = hart.privilege();
        let satp = hart.satp();
        let mode = if privilege.is_translated() {
            satp.mode
        } else {
            PagingMode::Bare
        };

        let Some(params) = mode.params() else {
            return Ok(Translation::identity(vaddr));
        };
        if !self.implements(mode) {
            error!(%mode, xlen = %self.xlen, "satp selects a mode the hart cannot use");
            return Err(MmuError::UnsupportedMode {
                mode,
                xlen: self.xlen,
            });
        }

        let req = AccessRequest {
            access,
            privilege,
            status: hart.status(),
        };
        self.translate_paged(params, satp, vaddr, &req, mem)
            .map_err(|reason| {
                let trap = reason.to_trap(access, vaddr);
                if matches!(reason, PtwError::AccessFault(_)) {
                    self.stats.access_faults += 1;
                } else {
                    self.stats.page_faults += 1;
                }
                debug!(vaddr = %vaddr, ?access, ?reason, %trap, "translation fault");
                MmuError::Fault(trap)
            })
    }

    /// Returns `true` if this hart can translate in `mode`.
    fn implements(&self, mode: PagingMode) -> bool {
        mode.is_supported_on(self.xlen) && (mode != PagingMode::Sv48 || self.sv48)
    }

    /// TLB lookup, then walk on a miss.
    fn translate_paged<M: PhysicalMemory + ?Sized>(
        &mut self,
        params: &PagingParams,
        satp: Satp,
        vaddr: VirtAddr,
        req: &AccessRequest,
        mem: &mut M,
    ) -> Result<Translation, PtwError> {
        if !params.is_valid_vaddr(vaddr) {
            return Err(PtwError::InvalidAddress);
        }

        if let Some((index, entry)) = self.tlb.lookup(params.mode, satp.asid, vaddr) {
            self.stats.tlb_hits += 1;
            let pte = Pte::decode(entry.pte, params);
            if let Permit::NeedsUpdate(updated) = check_leaf(&pte, req)? {
                let raw = updated.encode(params);
                self.write_back(params, entry.pte_addr, raw, mem)?;
                self.tlb.update_pte(index, raw);
            }
            return Ok(Translation {
                paddr: entry.translate(vaddr),
                memory_type: pte.memory_type(),
            });
        }

        self.stats.tlb_misses += 1;
        let walk = page_table_walk(params, satp.root_table(), vaddr, req, self.svpbmt, mem)
            .map_err(|failure| {
                self.stats.pte_reads += u64::from(failure.ext.pte_reads);
                failure.error
            })?;
        self.stats.pte_reads += u64::from(walk.ext.pte_reads);
        self.stats.walks += 1;

        let raw = match walk.permit {
            Permit::Clean => walk.raw,
            Permit::NeedsUpdate(updated) => {
                let raw = updated.encode(params);
                self.write_back(params, walk.pte_addr, raw, mem)?;
                raw
            }
        };

        let index = self.tlb.insert(
            params,
            TlbFill {
                asid: satp.asid,
                vaddr,
                paddr: walk.paddr,
                pte: raw,
                pte_addr: walk.pte_addr,
                level: walk.level,
                global: walk.global,
            },
        );
        trace!(vaddr = %vaddr, index, level = walk.level, "tlb fill");

        Ok(Translation {
            paddr: walk.paddr,
            memory_type: walk.ext.memory_type,
        })
    }

    /// Writes an accessed/dirty update back to the page table.
    ///
    /// Fails with [`PtwError::PteUpdate`] when the platform leaves A/D
    /// maintenance to software, so the access traps instead of proceeding.
    fn write_back<M: PhysicalMemory + ?Sized>(
        &mut self,
        params: &PagingParams,
        pte_addr: PhysAddr,
        raw: u64,
        mem: &mut M,
    ) -> Result<(), PtwError> {
        if !self.hardware_ad_update {
            return Err(PtwError::PteUpdate);
        }
        mem.write_phys(pte_addr, params.pte_size, raw, AccessKind::Write)
            .map_err(PtwError::AccessFault)?;
        self.stats.ad_updates += 1;
        debug!(pte_addr = %pte_addr, raw = format_args!("{raw:#x}"), "pte a/d update");
        Ok(())
    }

    /// Invalidates cached translations, as `SFENCE.VMA` does.
    pub fn invalidate(&mut self, scope: FenceScope) {
        self.stats.fences += 1;
        self.stats.tlb_invalidations += self.tlb.flush(scope) as u64;
    }

    /// Returns the MMU to its reset state: empty TLB, zeroed counters.
    pub fn reset(&mut self) {
        self.tlb.clear();
        self.stats = MmuStats::default();
    }

    /// Returns the translation counters.
    pub const fn stats(&self) -> &MmuStats {
        &self.stats
    }

    /// Returns the TLB, for inspection.
    pub const fn tlb(&self) -> &Tlb {
        &self.tlb
    }
}
