//! Translation Lookaside Buffer (TLB).
//!
//! A fully associative cache of leaf translations keyed by address space
//! and virtual page. Each entry keeps the raw leaf PTE and the physical
//! address it was read from, so that permissions can be re-checked on every
//! hit and accessed/dirty updates can be written back without a new walk.
//!
//! Superpage entries match on a wider mask: only the VPN fields above the
//! level the leaf was found at take part in the comparison. Inserting an
//! entry drops any entry it overlaps in the same address space, so a lookup
//! never has two candidates.

use tracing::{debug, trace};

use super::params::{PagingMode, PagingParams};
use crate::common::{PhysAddr, VirtAddr};
use crate::config::TlbPolicy;

/// A single entry in the TLB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlbEntry {
    /// Address space the entry belongs to (ignored when `global`).
    pub asid: u16,
    /// Entry is valid in every address space.
    pub global: bool,
    /// Paging mode the entry was filled under.
    pub mode: PagingMode,
    /// Virtual page number bits selected by `vpn_mask` (Tag).
    pub vpn_tag: u64,
    /// VPN bits that take part in matching; narrower for superpages.
    pub vpn_mask: u64,
    /// Physical page number of the (super)page base (Data).
    pub ppn: u64,
    /// Address bits passed through untranslated (offset plus lower VPNs).
    pub offset_mask: u64,
    /// Raw leaf PTE.
    pub pte: u64,
    /// Physical address of the leaf PTE, for accessed/dirty write-back.
    pub pte_addr: PhysAddr,
    /// Walk level the leaf was found at.
    pub level: u32,
}

impl TlbEntry {
    /// Returns `true` if `vaddr` falls inside the page this entry maps.
    #[inline]
    pub const fn matches_addr(&self, vaddr: VirtAddr) -> bool {
        vaddr.page_number() & self.vpn_mask == self.vpn_tag
    }

    /// Returns `true` if the entry is visible in address space `asid`.
    #[inline]
    pub const fn matches_asid(&self, asid: u16) -> bool {
        self.global || self.asid == asid
    }

    /// Composes the physical address for `vaddr`, which must match this entry.
    #[inline]
    pub const fn translate(&self, vaddr: VirtAddr) -> PhysAddr {
        PhysAddr::new(
            (PhysAddr::from_ppn(self.ppn).val() & !self.offset_mask)
                | (vaddr.val() & self.offset_mask),
        )
    }

    /// Returns `true` if this entry and `other` could both match some access.
    const fn overlaps(&self, other: &Self) -> bool {
        let same_space = self.global || other.global || self.asid == other.asid;
        let mask = self.vpn_mask & other.vpn_mask;
        self.mode as u8 == other.mode as u8
            && same_space
            && (self.vpn_tag ^ other.vpn_tag) & mask == 0
    }
}

/// A completed walk, ready to be cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlbFill {
    /// Address space of the translation.
    pub asid: u16,
    /// Translated virtual address.
    pub vaddr: VirtAddr,
    /// Resulting physical address.
    pub paddr: PhysAddr,
    /// Raw leaf PTE (after any accessed/dirty update).
    pub pte: u64,
    /// Physical address of the leaf PTE.
    pub pte_addr: PhysAddr,
    /// Level the leaf was found at.
    pub level: u32,
    /// Whether any PTE on the path was global.
    pub global: bool,
}

/// Which translations an address-space fence invalidates.
///
/// Mirrors the operand forms of `SFENCE.VMA`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FenceScope {
    /// Every entry (`rs1 = x0`, `rs2 = x0`).
    All,
    /// Entries mapping the address, in every address space, global ones included.
    Address(VirtAddr),
    /// Non-global entries of one address space.
    Asid(u16),
    /// Non-global entries of one address space mapping the address.
    AddressAsid(VirtAddr, u16),
}

impl FenceScope {
    /// Builds the scope from fence operands; `None` stands for register `x0`.
    pub const fn from_operands(vaddr: Option<u64>, asid: Option<u64>) -> Self {
        match (vaddr, asid) {
            (None, None) => Self::All,
            (Some(va), None) => Self::Address(VirtAddr::new(va)),
            (None, Some(asid)) => Self::Asid(asid as u16),
            (Some(va), Some(asid)) => Self::AddressAsid(VirtAddr::new(va), asid as u16),
        }
    }

    /// Returns `true` if `entry` falls inside this scope.
    const fn covers(&self, entry: &TlbEntry) -> bool {
        match *self {
            Self::All => true,
            Self::Address(va) => entry.matches_addr(va),
            Self::Asid(asid) => !entry.global && entry.asid == asid,
            Self::AddressAsid(va, asid) => {
                !entry.global && entry.asid == asid && entry.matches_addr(va)
            }
        }
    }
}

/// Translation Lookaside Buffer structure.
#[derive(Clone, Debug)]
pub struct Tlb {
    /// Entry slots; `None` is an invalid slot.
    entries: Vec<Option<TlbEntry>>,
    /// Victim selection policy.
    policy: TlbPolicy,
    /// Round-robin eviction pointer.
    next_victim: usize,
    /// Last-use time of each slot, for LRU.
    last_use: Vec<u64>,
    /// Monotonic use counter.
    clock: u64,
}

impl Tlb {
    /// Creates an empty TLB.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of entries (at least one is always provided).
    /// * `policy` - Replacement policy used once every slot is full.
    pub fn new(size: usize, policy: TlbPolicy) -> Self {
        let size = size.max(1);
        Self {
            entries: vec![None; size],
            policy,
            next_victim: 0,
            last_use: vec![0; size],
            clock: 0,
        }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of valid entries.
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Returns `true` if no entry is valid.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Iterates over the valid entries.
    pub fn iter(&self) -> impl Iterator<Item = &TlbEntry> {
        self.entries.iter().flatten()
    }

    /// Returns the entry in slot `index`, if valid.
    pub fn get(&self, index: usize) -> Option<&TlbEntry> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    /// Looks up the translation of `vaddr` in address space `asid`.
    ///
    /// # Returns
    ///
    /// The slot index and a copy of the matching entry, or `None` on a miss.
    pub fn lookup(
        &mut self,
        mode: PagingMode,
        asid: u16,
        vaddr: VirtAddr,
    ) -> Option<(usize, TlbEntry)> {
        let (index, entry) = self.entries.iter().enumerate().find_map(|(i, slot)| {
            slot.filter(|e| e.mode == mode && e.matches_asid(asid) && e.matches_addr(vaddr))
                .map(|e| (i, e))
        })?;
        self.touch(index);
        trace!(vaddr = %vaddr, asid, index, level = entry.level, "tlb hit");
        Some((index, entry))
    }

    /// Caches a completed walk.
    ///
    /// Any entry overlapping the new one in the same address space is
    /// dropped first. When the TLB is full the victim is chosen by the
    /// replacement policy.
    ///
    /// # Returns
    ///
    /// The slot index the entry was installed in.
    pub fn insert(&mut self, params: &PagingParams, fill: TlbFill) -> usize {
        let offset_mask = params.offset_mask(fill.level);
        let vpn_mask = params.vpn_mask() & !params.superpage_ppn_mask(fill.level);
        let entry = TlbEntry {
            asid: fill.asid,
            global: fill.global,
            mode: params.mode,
            vpn_tag: fill.vaddr.page_number() & vpn_mask,
            vpn_mask,
            ppn: fill.paddr.page_number() & !params.superpage_ppn_mask(fill.level),
            offset_mask,
            pte: fill.pte,
            pte_addr: fill.pte_addr,
            level: fill.level,
        };

        for slot in &mut self.entries {
            if slot.is_some_and(|e| e.overlaps(&entry)) {
                *slot = None;
            }
        }

        let index = match self.entries.iter().position(Option::is_none) {
            Some(free) => free,
            None => self.victim(),
        };
        self.entries[index] = Some(entry);
        self.touch(index);
        index
    }

    /// Persists an accessed/dirty update into slot `index`.
    ///
    /// Only the cached PTE changes; the tag and the mapping stay as they are.
    pub fn update_pte(&mut self, index: usize, pte: u64) {
        if let Some(Some(entry)) = self.entries.get_mut(index) {
            entry.pte = pte;
        }
    }

    /// Invalidates the entries covered by `scope`.
    ///
    /// # Returns
    ///
    /// The number of entries dropped.
    pub fn flush(&mut self, scope: FenceScope) -> usize {
        let mut dropped = 0;
        for slot in &mut self.entries {
            if slot.is_some_and(|e| scope.covers(&e)) {
                *slot = None;
                dropped += 1;
            }
        }
        debug!(?scope, dropped, "tlb flush");
        dropped
    }

    /// Invalidates every entry and resets the replacement state.
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.last_use.fill(0);
        self.next_victim = 0;
        self.clock = 0;
    }

    /// Records a use of slot `index` for the replacement policy.
    fn touch(&mut self, index: usize) {
        self.clock += 1;
        self.last_use[index] = self.clock;
    }

    /// Selects the slot to evict from a full TLB.
    fn victim(&mut self) -> usize {
        match self.policy {
            TlbPolicy::RoundRobin => {
                let victim = self.next_victim;
                self.next_victim = (victim + 1) % self.entries.len();
                victim
            }
            TlbPolicy::Lru => self
                .last_use
                .iter()
                .enumerate()
                .min_by_key(|&(_, &t)| t)
                .map_or(0, |(i, _)| i),
        }
    }
}
