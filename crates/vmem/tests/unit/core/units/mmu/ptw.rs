//! Page Table Walker (PTW) Unit Tests.
//!
//! Verifies the walk itself, independent of the TLB:
//! - Leaf at every level for Sv32, Sv39 and Sv48
//! - Misaligned superpages
//! - Invalid and malformed entries at each level
//! - Memory faults while reading PTEs
//! - Global bit accumulation and extension state

use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use rstest::rstest;
use rvsim_vmem::common::{AccessKind, PhysAddr, VirtAddr};
use rvsim_vmem::core::arch::csr::StatusFlags;
use rvsim_vmem::core::arch::mode::PrivilegeMode;
use rvsim_vmem::core::units::mmu::params::{PagingParams, SV32, SV39, SV48};
use rvsim_vmem::core::units::mmu::perm::{AccessRequest, Permit};
use rvsim_vmem::core::units::mmu::pte::{MemoryType, PteFlags};
use rvsim_vmem::core::units::mmu::ptw::{PtwError, PtwResult, page_table_walk};
use rvsim_vmem::soc::{MemoryFault, Ram};

use crate::common::builder::{A, D, G, R, RWXAD, U, W, X, make_pte, map, pointer, vaddr, write_pte};
use crate::common::harness::{MEM_BASE, MEM_SIZE, ROOT_PPN, init_tracing};
use crate::common::mocks::memory::MockPhysMem;

// ══════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════

fn ram() -> Ram {
    init_tracing();
    Ram::new(MEM_BASE, MEM_SIZE)
}

fn req(access: AccessKind) -> AccessRequest {
    AccessRequest {
        access,
        privilege: PrivilegeMode::Supervisor,
        status: StatusFlags::default(),
    }
}

fn walk(params: &PagingParams, mem: &mut Ram, va: u64, access: AccessKind) -> PtwResult {
    page_table_walk(
        params,
        PhysAddr::from_ppn(ROOT_PPN),
        VirtAddr::new(va),
        &req(access),
        true,
        mem,
    )
}

fn walk_error(params: &PagingParams, mem: &mut Ram, va: u64, access: AccessKind) -> PtwError {
    walk(params, mem, va, access).unwrap_err().error
}

// ══════════════════════════════════════════════════════════
// 1. Sv32 Two-Level Walk
// ══════════════════════════════════════════════════════════

#[test]
fn sv32_four_kib_page() {
    let mut mem = ram();
    // Root at 0x8000_0000; VPN[1]=3 points to 0x8001_0000; VPN[0]=5 maps PPN 0x90.
    write_pte(&mut mem, &SV32, ROOT_PPN, 3, pointer(0x80010));
    write_pte(&mut mem, &SV32, 0x80010, 5, make_pte(0x90, R | A));

    let va = vaddr(&SV32, &[5, 3], 0x123);
    let ok = walk(&SV32, &mut mem, va, AccessKind::Read).unwrap();
    assert_eq!(ok.paddr.val(), 0x90123);
    assert_eq!(ok.level, 0);
    assert_eq!(ok.pte_addr.val(), 0x8001_0014);
    assert_eq!(ok.permit, Permit::Clean);
    assert_eq!(ok.ext.pte_reads, 2);
    assert!(!ok.global);
}

#[test]
fn sv32_megapage() {
    let mut mem = ram();
    write_pte(&mut mem, &SV32, ROOT_PPN, 1, make_pte(0x400, RWXAD));

    let va = vaddr(&SV32, &[0x2AB, 1], 0x456);
    let ok = walk(&SV32, &mut mem, va, AccessKind::Write).unwrap();
    assert_eq!(ok.level, 1);
    assert_eq!(ok.paddr.val(), (0x400 << 12) | (0x2AB << 12) | 0x456);
    assert_eq!(ok.ext.pte_reads, 1);
}

#[test]
fn sv32_thirty_four_bit_physical_address() {
    let mut mem = ram();
    write_pte(&mut mem, &SV32, ROOT_PPN, 0, pointer(0x80010));
    write_pte(&mut mem, &SV32, 0x80010, 0, make_pte(0x3F_FFFF, R | A));

    let ok = walk(&SV32, &mut mem, 0x10, AccessKind::Read).unwrap();
    assert_eq!(ok.paddr.val(), 0x3_FFFF_F010);
}

// ══════════════════════════════════════════════════════════
// 2. Sv39 / Sv48 Superpages
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::sv39_4k(&SV39, 0)]
#[case::sv39_2m(&SV39, 1)]
#[case::sv39_1g(&SV39, 2)]
#[case::sv48_4k(&SV48, 0)]
#[case::sv48_2m(&SV48, 1)]
#[case::sv48_1g(&SV48, 2)]
#[case::sv48_512g(&SV48, 3)]
fn leaf_at_level(#[case] params: &'static PagingParams, #[case] level: u32) {
    let mut mem = ram();
    let mut next = ROOT_PPN + 1;
    let va = vaddr(params, &[0x1A5, 0x0F3, 0x12, 0x3][..params.levels as usize], 0xABC);
    // 1 TiB: aligned for every superpage size.
    let base_ppn = 1u64 << 28;
    map(&mut mem, params, ROOT_PPN, &mut next, va, level, make_pte(base_ppn, R | A));

    let ok = walk(params, &mut mem, va, AccessKind::Read).unwrap();
    let offset_mask = params.offset_mask(level);
    assert_eq!(ok.level, level);
    assert_eq!(ok.paddr.val(), (base_ppn << 12) | (va & offset_mask));
    assert_eq!(u32::from(ok.ext.pte_reads), params.levels - level);
}

#[test]
fn sv39_negative_address() {
    let mut mem = ram();
    let mut next = ROOT_PPN + 1;
    let va = vaddr(&SV39, &[1, 2, 0x1FF], 0x8);
    assert_eq!(va >> 39, 0x1FF_FFFF);
    map(&mut mem, &SV39, ROOT_PPN, &mut next, va, 0, make_pte(0x1234, R | A));

    let ok = walk(&SV39, &mut mem, va, AccessKind::Read).unwrap();
    assert_eq!(ok.paddr.val(), 0x1234_008);
}

// ══════════════════════════════════════════════════════════
// 3. Misaligned Superpages
// ══════════════════════════════════════════════════════════

#[rstest]
fn sv32_misaligned_megapage(
    #[values(AccessKind::Read, AccessKind::Write, AccessKind::ReadWrite, AccessKind::Execute)]
    access: AccessKind,
) {
    let mut mem = ram();
    // PPN[0] = 1 on a level-1 leaf.
    write_pte(&mut mem, &SV32, ROOT_PPN, 3, make_pte(0x401, RWXAD));

    let va = vaddr(&SV32, &[5, 3], 0x123);
    assert_eq!(
        walk_error(&SV32, &mut mem, va, access),
        PtwError::MisalignedSuperpage
    );
}

#[rstest]
#[case::sv39_gigapage(&SV39, 2, 1 << 9)]
#[case::sv39_megapage(&SV39, 1, 1)]
#[case::sv48_terapage(&SV48, 3, 1 << 18)]
fn misaligned_ppn(#[case] params: &'static PagingParams, #[case] level: u32, #[case] ppn: u64) {
    let mut mem = ram();
    let mut next = ROOT_PPN + 1;
    let va = vaddr(params, &[0, 0, 1, 1][..params.levels as usize], 0);
    map(&mut mem, params, ROOT_PPN, &mut next, va, level, make_pte(ppn, RWXAD));

    assert_eq!(
        walk_error(params, &mut mem, va, AccessKind::Read),
        PtwError::MisalignedSuperpage
    );
}

// ══════════════════════════════════════════════════════════
// 4. Invalid Entries
// ══════════════════════════════════════════════════════════

#[test]
fn sv32_invalid_leaf() {
    let mut mem = ram();
    write_pte(&mut mem, &SV32, ROOT_PPN, 3, pointer(0x80010));
    write_pte(&mut mem, &SV32, 0x80010, 5, (0x90 << 10) | R);

    let va = vaddr(&SV32, &[5, 3], 0x123);
    let err = walk(&SV32, &mut mem, va, AccessKind::Read).unwrap_err();
    assert_eq!(err.error, PtwError::InvalidPte);
    assert_eq!(err.ext.pte_reads, 2);
}

#[test]
fn invalid_root_entry() {
    let mut mem = ram();
    let err = walk(&SV39, &mut mem, 0x1000, AccessKind::Execute).unwrap_err();
    assert_eq!(err.error, PtwError::InvalidPte);
    assert_eq!(err.ext.pte_reads, 1);
}

#[test]
fn pointer_at_last_level() {
    let mut mem = ram();
    write_pte(&mut mem, &SV32, ROOT_PPN, 0, pointer(0x80010));
    write_pte(&mut mem, &SV32, 0x80010, 0, pointer(0x80011));

    assert_eq!(
        walk_error(&SV32, &mut mem, 0x0, AccessKind::Read),
        PtwError::InvalidPte
    );
}

#[rstest]
#[case::accessed(A)]
#[case::dirty(D)]
#[case::user(U)]
fn malformed_pointer(#[case] bit: u64) {
    let mut mem = ram();
    write_pte(&mut mem, &SV39, ROOT_PPN, 0, make_pte(ROOT_PPN + 1, bit));
    write_pte(&mut mem, &SV39, ROOT_PPN + 1, 0, pointer(ROOT_PPN + 2));
    write_pte(&mut mem, &SV39, ROOT_PPN + 2, 0, make_pte(0x1, R | A));

    assert_eq!(
        walk_error(&SV39, &mut mem, 0x0, AccessKind::Read),
        PtwError::InvalidPte
    );
}

#[test]
fn reserved_extension_bits_on_leaf() {
    let mut mem = ram();
    write_pte(&mut mem, &SV39, ROOT_PPN, 0, make_pte(0, R | A) | (1 << 60));

    assert_eq!(
        walk_error(&SV39, &mut mem, 0x0, AccessKind::Read),
        PtwError::InvalidPte
    );
}

#[test]
fn permission_denied_after_full_walk() {
    let mut mem = ram();
    let mut next = ROOT_PPN + 1;
    map(&mut mem, &SV39, ROOT_PPN, &mut next, 0x4000, 0, make_pte(0x5, R | A));

    let err = walk(&SV39, &mut mem, 0x4000, AccessKind::Write).unwrap_err();
    assert_eq!(err.error, PtwError::NoPermission);
    assert_eq!(err.ext.pte_reads, 3);
}

// ══════════════════════════════════════════════════════════
// 5. Global Bit, A/D and Memory Types
// ══════════════════════════════════════════════════════════

#[test]
fn global_inherited_from_pointer() {
    let mut mem = ram();
    write_pte(&mut mem, &SV39, ROOT_PPN, 0, make_pte(ROOT_PPN + 1, G));
    write_pte(&mut mem, &SV39, ROOT_PPN + 1, 0, pointer(ROOT_PPN + 2));
    write_pte(&mut mem, &SV39, ROOT_PPN + 2, 0, make_pte(0x1, R | A));

    let ok = walk(&SV39, &mut mem, 0x0, AccessKind::Read).unwrap();
    assert!(ok.global);
    assert!(!ok.pte.is_global());
}

#[test]
fn walker_reports_needed_update_without_writing() {
    let mut mem = ram();
    let mut next = ROOT_PPN + 1;
    let leaf = make_pte(0x7, R | W);
    let leaf_addr = map(&mut mem, &SV39, ROOT_PPN, &mut next, 0x7000, 0, leaf);

    let ok = walk(&SV39, &mut mem, 0x7000, AccessKind::Write).unwrap();
    assert_eq!(ok.raw, leaf);
    assert_eq!(ok.pte_addr.val(), leaf_addr);
    assert_eq!(
        ok.permit,
        Permit::NeedsUpdate(ok.pte.with_flags(PteFlags::A | PteFlags::D))
    );
}

#[test]
fn svpbmt_memory_type() {
    let mut mem = ram();
    write_pte(&mut mem, &SV39, ROOT_PPN, 0, make_pte(0, R | W | A | D) | (2 << 61));

    let ok = walk(&SV39, &mut mem, 0x10, AccessKind::Write).unwrap();
    assert_eq!(ok.ext.memory_type, MemoryType::Io);
}

#[test]
fn svpbmt_disabled_rejects_memory_type() {
    let mut mem = ram();
    write_pte(&mut mem, &SV39, ROOT_PPN, 0, make_pte(0, R | A) | (1 << 61));

    let err = page_table_walk(
        &SV39,
        PhysAddr::from_ppn(ROOT_PPN),
        VirtAddr::new(0x10),
        &req(AccessKind::Read),
        false,
        &mut mem,
    )
    .unwrap_err();
    assert_eq!(err.error, PtwError::InvalidPte);
}

#[test]
fn execute_only_page_fetch() {
    let mut mem = ram();
    write_pte(&mut mem, &SV32, ROOT_PPN, 0, pointer(0x80010));
    write_pte(&mut mem, &SV32, 0x80010, 2, make_pte(0x2, X | A));

    assert!(walk(&SV32, &mut mem, 0x2000, AccessKind::Execute).is_ok());
    assert_eq!(
        walk_error(&SV32, &mut mem, 0x2000, AccessKind::Read),
        PtwError::NoPermission
    );
}

// ══════════════════════════════════════════════════════════
// 6. Memory Faults
// ══════════════════════════════════════════════════════════

#[test]
fn pte_read_fault_is_access_fault() {
    let mut mem = MockPhysMem::new();
    let root = PhysAddr::from_ppn(ROOT_PPN);
    mem.expect_read_phys()
        .with(eq(root), eq(8), eq(AccessKind::Read))
        .times(1)
        .returning(|addr, _, _| Err(MemoryFault::Denied { addr: addr.val() }));
    mem.expect_write_phys().never();

    let err = page_table_walk(
        &SV39,
        root,
        VirtAddr::new(0x0),
        &req(AccessKind::Execute),
        true,
        &mut mem,
    )
    .unwrap_err();
    assert_eq!(
        err.error,
        PtwError::AccessFault(MemoryFault::Denied { addr: root.val() })
    );
    assert_eq!(err.ext.pte_reads, 0);
}

#[test]
fn walk_reads_one_pte_per_level() {
    let mut mem = MockPhysMem::new();
    let root = PhysAddr::from_ppn(ROOT_PPN);
    let l2 = PhysAddr::from_ppn(ROOT_PPN + 1);
    let l1 = PhysAddr::from_ppn(ROOT_PPN + 2);
    mem.expect_read_phys()
        .with(eq(root), eq(8), eq(AccessKind::Read))
        .times(1)
        .returning(move |_, _, _| Ok(pointer(ROOT_PPN + 1)));
    mem.expect_read_phys()
        .with(eq(l2), eq(8), eq(AccessKind::Read))
        .times(1)
        .returning(move |_, _, _| Ok(pointer(ROOT_PPN + 2)));
    mem.expect_read_phys()
        .with(eq(l1), eq(8), eq(AccessKind::Read))
        .times(1)
        .returning(|_, _, _| Ok(make_pte(0x200, R | A)));
    mem.expect_write_phys().never();

    let ok = page_table_walk(
        &SV48,
        root,
        VirtAddr::new(0x0),
        &req(AccessKind::Read),
        true,
        &mut mem,
    )
    .unwrap();
    assert_eq!(ok.level, 1);
    assert_eq!(ok.paddr.val(), 0x200 << 12);
    assert_eq!(ok.ext.pte_reads, 3);
}
