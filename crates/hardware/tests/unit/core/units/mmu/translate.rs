//! Translation Property Tests.
//!
//! For every page size, a lookup hits exactly when the address lies in the
//! entry's range and the ASID rule holds, and the physical address keeps the
//! page offset.

use hexsim_core::common::{AccessType, MmuFault, MmuIdx, PhysAddr, Protection, VirtAddr};
use hexsim_core::core::units::mmu::entry::{PageSize, TlbEntry};
use hexsim_core::core::units::mmu::tlb::TlbStore;
use hexsim_core::core::units::mmu::{AddressSpace, Mmu, lookup};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[derive(Clone, Debug)]
struct Placement {
    size: PageSize,
    va_base: u32,
    pa_base: u64,
    asid: u8,
    global: bool,
}

prop_compose! {
    fn arb_placement()(
        class in 0u32..10,
        va_page in any::<u32>(),
        pa_page in 0u64..(1 << 36),
        asid in any::<u8>(),
        global in any::<bool>(),
    ) -> Placement {
        let size = PageSize::from_class(class).unwrap_or(PageSize::Size4K);
        Placement {
            size,
            va_base: (u64::from(va_page) & !size.offset_mask()) as u32,
            pa_base: pa_page & !size.offset_mask(),
            asid,
            global,
        }
    }
}

fn store_with(p: &Placement) -> TlbStore {
    let mut tlb = TlbStore::new();
    let e = TlbEntry::new(p.va_base, p.pa_base, p.size, p.asid)
        .with_perms(true, true, true, true)
        .with_global(p.global);
    let _ = tlb.write(42, e.raw());
    tlb
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn hit_iff_in_range_and_asid_rule(
        p in arb_placement(),
        offset in -(1i64 << 31)..(1i64 << 31),
        query_asid in any::<u8>(),
    ) {
        let tlb = store_with(&p);
        let bytes = p.size.bytes() as i64;
        // Bias the probe towards the page and its neighbours.
        let delta = offset % (3 * bytes) - bytes / 2;
        let va = (i64::from(p.va_base) + delta).rem_euclid(1 << 32) as u32;

        let in_range = u64::from(va) >= u64::from(p.va_base)
            && u64::from(va) < u64::from(p.va_base) + p.size.bytes();
        let asid_ok = p.global || p.asid == query_asid;
        let expected = in_range && asid_ok;

        let result = lookup(&tlb, va, AccessType::Read, query_asid, MmuIdx::Guest);
        prop_assert_eq!(result.is_ok(), expected);
        if let Ok(t) = result {
            let off = u64::from(va) - u64::from(p.va_base);
            prop_assert_eq!(t.paddr, PhysAddr::new(p.pa_base + off));
            prop_assert_eq!(t.page_size, p.size.bytes());
        } else {
            prop_assert_eq!(result, Err(MmuFault::Miss));
        }
    }

    #[test]
    fn shadow_agrees_with_table(
        p in arb_placement(),
        offsets in prop::collection::vec(0u64..(1 << 30), 1..16),
    ) {
        let tlb = store_with(&p);
        let mut mmu = Mmu::new(16);
        let space = AddressSpace { asid: p.asid, mmu_idx: MmuIdx::Guest, enabled: true };
        for off in offsets {
            let va = (u64::from(p.va_base) + (off & p.size.offset_mask())) as u32;
            let direct = lookup(&tlb, va, AccessType::Read, p.asid, MmuIdx::Guest);
            let cached = mmu.translate(&tlb, VirtAddr::new(va), AccessType::Read, space, 1);
            prop_assert_eq!(direct, cached);
        }
    }
}

#[test]
fn disabled_mmu_is_identity() {
    let tlb = TlbStore::new();
    let mut mmu = Mmu::new(8);
    let space = AddressSpace {
        asid: 0,
        mmu_idx: MmuIdx::Kernel,
        enabled: false,
    };
    let t = mmu
        .translate(&tlb, VirtAddr::new(0xdead_b000), AccessType::Write, space, 0)
        .expect("identity map");
    assert_eq!(t.paddr, PhysAddr::new(0xdead_b000));
    assert_eq!(t.prot, Protection::ALL);
}

#[test]
fn stale_generation_is_not_served() {
    let mut tlb = TlbStore::new();
    let _ = tlb.write(0, TlbEntry::new(0x1000, 0x5000, PageSize::Size4K, 0).with_perms(true, true, true, true).raw());
    let mut mmu = Mmu::new(8);
    let space = AddressSpace {
        asid: 0,
        mmu_idx: MmuIdx::Guest,
        enabled: true,
    };
    let _ = mmu.translate(&tlb, VirtAddr::new(0x1000), AccessType::Read, space, 1);

    let _ = tlb.write(0, TlbEntry::new(0x1000, 0x7000, PageSize::Size4K, 0).with_perms(true, true, true, true).raw());
    let t = mmu
        .translate(&tlb, VirtAddr::new(0x1000), AccessType::Read, space, 2)
        .expect("remapped");
    assert_eq!(t.paddr, PhysAddr::new(0x7000));
}
