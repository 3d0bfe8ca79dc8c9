//! Page Table Entry Codec Unit Tests.
//!
//! Verifies decoding of flags, PPN segments and the Sv39/Sv48 extension
//! region, encoding round-trips, and the validity predicates the walker uses.

use proptest::prelude::*;
use rvsim_vmem::core::units::mmu::params::{PagingParams, SV32, SV39, SV48};
use rvsim_vmem::core::units::mmu::pte::{MemoryType, Pte, PteFlags};

use crate::common::builder::{A, D, G, R, U, V, W, X, make_pte};

// ══════════════════════════════════════════════════════════
// 1. Decoding
// ══════════════════════════════════════════════════════════

#[test]
fn flag_bits() {
    let pte = Pte::decode(make_pte(0x90, R | X | U | G | A | D), &SV32);
    assert_eq!(
        pte.flags,
        PteFlags::V | PteFlags::R | PteFlags::X | PteFlags::U | PteFlags::G | PteFlags::A | PteFlags::D
    );
    assert_eq!(pte.ppn, 0x90);
    assert!(pte.is_leaf());
    assert!(pte.is_user());
    assert!(pte.is_global());
    assert!(pte.is_accessed());
    assert!(pte.is_dirty());
}

#[test]
fn sv39_ppn_segments() {
    let ppn = (0x3FF_FFFF << 18) | (0x155 << 9) | 0x0AA;
    let pte = Pte::decode(make_pte(ppn, R), &SV39);
    assert_eq!(pte.ppn_segment(0, &SV39), 0x0AA);
    assert_eq!(pte.ppn_segment(1, &SV39), 0x155);
    assert_eq!(pte.ppn_segment(2, &SV39), 0x3FF_FFFF);
}

#[test]
fn sv48_top_segment_is_seventeen_bits() {
    let pte = Pte::decode(make_pte(u64::MAX >> 20, R), &SV48);
    assert_eq!(pte.ppn_segment(3, &SV48), 0x1_FFFF);
    assert!(pte.ext.is_clear());
}

#[test]
fn rsw_bits_preserved() {
    let raw = make_pte(0x1, R) | (0b11 << 8);
    let pte = Pte::decode(raw, &SV39);
    assert_eq!(pte.rsw, 0b11);
    assert_eq!(pte.encode(&SV39), raw);
}

#[test]
fn pointer_classification() {
    let pointer = Pte::decode(make_pte(0x80010, 0), &SV32);
    assert!(pointer.is_pointer());
    assert!(!pointer.is_leaf());

    let invalid = Pte::decode(0, &SV32);
    assert!(!invalid.is_valid());
    assert!(!invalid.is_pointer());
}

// ══════════════════════════════════════════════════════════
// 2. Validity
// ══════════════════════════════════════════════════════════

#[test]
fn write_only_is_invalid() {
    assert!(Pte::decode(make_pte(1, W), &SV39).is_invalid(true));
    assert!(Pte::decode(make_pte(1, W | X), &SV39).is_invalid(true));
    assert!(!Pte::decode(make_pte(1, R | W), &SV39).is_invalid(true));
}

#[test]
fn reserved_and_napot_bits_are_invalid() {
    assert!(Pte::decode(make_pte(1, R) | (1 << 54), &SV39).is_invalid(true));
    assert!(Pte::decode(make_pte(1, R) | (1 << 63), &SV39).is_invalid(true));
}

#[test]
fn pbmt_encodings() {
    let nc = Pte::decode(make_pte(1, R) | (1 << 61), &SV39);
    assert!(!nc.is_invalid(true));
    assert!(nc.is_invalid(false));
    assert_eq!(nc.memory_type(), MemoryType::NonCacheable);

    let io = Pte::decode(make_pte(1, R) | (2 << 61), &SV48);
    assert_eq!(io.memory_type(), MemoryType::Io);

    let reserved = Pte::decode(make_pte(1, R) | (3 << 61), &SV39);
    assert!(reserved.is_invalid(true));
}

#[test]
fn pointer_reserved_bits() {
    assert!(!Pte::decode(pointer_raw(0), &SV39).is_malformed_pointer());
    assert!(Pte::decode(pointer_raw(A), &SV39).is_malformed_pointer());
    assert!(Pte::decode(pointer_raw(D), &SV39).is_malformed_pointer());
    assert!(Pte::decode(pointer_raw(U), &SV39).is_malformed_pointer());
    assert!(Pte::decode(pointer_raw(0) | (1 << 61), &SV39).is_malformed_pointer());
}

fn pointer_raw(extra: u64) -> u64 {
    make_pte(0x80010, extra)
}

#[test]
fn valid_bit_required() {
    assert!(Pte::decode(make_pte(1, R) & !V, &SV32).is_invalid(true));
}

// ══════════════════════════════════════════════════════════
// 3. Round-trip
// ══════════════════════════════════════════════════════════

fn raw_pte(params: &'static PagingParams) -> impl Strategy<Value = u64> {
    any::<u64>().prop_map(move |raw| raw & params.pte_mask())
}

proptest! {
    #[test]
    fn sv32_roundtrip(raw in raw_pte(&SV32)) {
        let pte = Pte::decode(raw, &SV32);
        prop_assert_eq!(pte.encode(&SV32), raw);
        prop_assert_eq!(Pte::decode(pte.encode(&SV32), &SV32), pte);
    }

    #[test]
    fn sv39_roundtrip(raw in raw_pte(&SV39)) {
        let pte = Pte::decode(raw, &SV39);
        prop_assert_eq!(pte.encode(&SV39), raw);
        prop_assert_eq!(Pte::decode(pte.encode(&SV39), &SV39), pte);
    }

    #[test]
    fn with_flags_only_adds(raw in raw_pte(&SV48), bits in any::<u8>()) {
        let pte = Pte::decode(raw, &SV48);
        let extra = PteFlags::from_bits_retain(bits);
        let updated = pte.with_flags(extra);
        prop_assert!(updated.flags.contains(pte.flags | extra));
        prop_assert_eq!(updated.ppn, pte.ppn);
        prop_assert_eq!(updated.ext, pte.ext);
    }
}
