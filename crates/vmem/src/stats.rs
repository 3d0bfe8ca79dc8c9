//! Translation statistics collection and reporting.
//!
//! This module tracks how the MMU spends its work. It provides:
//! 1. **TLB behaviour:** Hits, misses and derived hit rate.
//! 2. **Walk cost:** Page walks started and PTEs read from memory.
//! 3. **Maintenance:** Accessed/dirty write-backs and fences executed.
//! 4. **Faults:** Page faults and access faults delivered to the hart.

use std::fmt;

/// Counters maintained by [`Mmu`](crate::core::units::mmu::Mmu).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MmuStats {
    /// Translations served from the TLB.
    pub tlb_hits: u64,
    /// Translations that needed a page walk.
    pub tlb_misses: u64,
    /// Page walks that reached a leaf the access may use.
    pub walks: u64,
    /// PTEs read from memory across all walks, failed ones included.
    pub pte_reads: u64,
    /// Accessed/dirty updates written back to memory.
    pub ad_updates: u64,
    /// Page-fault exceptions raised.
    pub page_faults: u64,
    /// Access-fault exceptions raised.
    pub access_faults: u64,
    /// Address-space fences executed.
    pub fences: u64,
    /// TLB entries dropped by fences.
    pub tlb_invalidations: u64,
}

impl MmuStats {
    /// Fraction of paged translations served by the TLB, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn tlb_hit_rate(&self) -> f64 {
        let lookups = self.tlb_hits + self.tlb_misses;
        if lookups == 0 {
            0.0
        } else {
            self.tlb_hits as f64 / lookups as f64
        }
    }

    /// Average PTE reads per walk started (every TLB miss starts one).
    #[allow(clippy::cast_precision_loss)]
    pub fn reads_per_walk(&self) -> f64 {
        if self.tlb_misses == 0 {
            0.0
        } else {
            self.pte_reads as f64 / self.tlb_misses as f64
        }
    }
}

impl fmt::Display for MmuStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MMU")?;
        writeln!(
            f,
            "  tlb.hits              {:>12}  ({:.2}%)",
            self.tlb_hits,
            self.tlb_hit_rate() * 100.0
        )?;
        writeln!(f, "  tlb.misses            {:>12}", self.tlb_misses)?;
        writeln!(
            f,
            "  ptw.walks             {:>12}  ({:.2} reads/walk)",
            self.walks,
            self.reads_per_walk()
        )?;
        writeln!(f, "  ptw.ad_updates        {:>12}", self.ad_updates)?;
        writeln!(f, "  faults.page           {:>12}", self.page_faults)?;
        writeln!(f, "  faults.access         {:>12}", self.access_faults)?;
        writeln!(f, "  fences                {:>12}", self.fences)?;
        write!(f, "  tlb.invalidations     {:>12}", self.tlb_invalidations)
    }
}
