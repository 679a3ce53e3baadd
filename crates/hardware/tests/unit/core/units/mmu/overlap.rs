//! Overlap Check Tests.
//!
//! The check answers "how many live entries would a candidate collide with":
//! none, exactly one (reported by index) or several.

use hexsim_core::core::units::mmu::entry::{PageSize, TlbEntry};
use hexsim_core::core::units::mmu::tlb::{AsidLookup, Overlap, TlbStore};
use pretty_assertions::{assert_eq, assert_ne};
use proptest::prelude::*;
use rstest::rstest;

fn page(va: u32, size: PageSize, asid: u8) -> TlbEntry {
    TlbEntry::new(va, u64::from(va), size, asid)
}

// ══════════════════════════════════════════════════════════
// 1. Trichotomy
// ══════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// `hits` 4K pages inside the candidate's 64K window, plus decoys that
    /// must be ignored: pages outside the window and pages of another ASID.
    #[test]
    fn result_reflects_intersection_count(
        hits in prop::sample::subsequence((0u32..16).collect::<Vec<_>>(), 0..5),
        outside in prop::sample::subsequence((16u32..32).collect::<Vec<_>>(), 0..5),
        foreign in prop::sample::subsequence((0u32..16).collect::<Vec<_>>(), 0..5),
    ) {
        let window = 0x0040_0000u32;
        let mut tlb = TlbStore::new();
        let mut slot = 0u32;
        let mut hit_slots = Vec::new();
        for p in &hits {
            let _ = tlb.write(slot, page(window + (p << 12), PageSize::Size4K, 5).raw());
            hit_slots.push(slot as usize);
            slot += 1;
        }
        for p in &outside {
            let _ = tlb.write(slot, page(window + (p << 12), PageSize::Size4K, 5).raw());
            slot += 1;
        }
        for p in &foreign {
            let _ = tlb.write(slot, page(window + (p << 12), PageSize::Size4K, 6).raw());
            slot += 1;
        }

        let candidate = page(window, PageSize::Size64K, 5);
        let expected = match hit_slots.as_slice() {
            [] => Overlap::None,
            [only] => Overlap::Single(*only),
            _ => Overlap::Multiple,
        };
        prop_assert_eq!(tlb.check_overlap(candidate, 100), expected);
    }
}

#[rstest]
#[case::none(&[], -2)]
#[case::single(&[0x0040_3000], 0)]
#[case::multiple(&[0x0040_3000, 0x0040_f000], -1)]
fn raw_result_codes(#[case] vas: &[u32], #[case] raw: i32) {
    let mut tlb = TlbStore::new();
    for (i, va) in vas.iter().enumerate() {
        let _ = tlb.write(i as u32, page(*va, PageSize::Size4K, 1).raw());
    }
    let candidate = page(0x0040_0000, PageSize::Size64K, 1);
    assert_eq!(tlb.check_overlap(candidate, 0).to_raw(), raw);
}

// ══════════════════════════════════════════════════════════
// 2. Qualification rules
// ══════════════════════════════════════════════════════════

#[test]
fn invalid_candidate_overlaps_nothing() {
    let mut tlb = TlbStore::new();
    let _ = tlb.write(0, page(0x1000, PageSize::Size4K, 0).raw());
    let candidate = page(0x1000, PageSize::Size4K, 0).with_valid(false);
    assert_eq!(tlb.check_overlap(candidate, 0), Overlap::None);
}

#[test]
fn stored_global_entry_overlaps_any_asid() {
    let mut tlb = TlbStore::new();
    let _ = tlb.write(9, page(0x1000, PageSize::Size4K, 0).with_global(true).raw());
    assert_eq!(tlb.check_overlap(page(0x1000, PageSize::Size4K, 77), 0), Overlap::Single(9));
}

#[test]
fn global_candidate_overlaps_any_asid() {
    let mut tlb = TlbStore::new();
    let _ = tlb.write(9, page(0x1000, PageSize::Size4K, 1).raw());
    let candidate = page(0x1000, PageSize::Size4K, 2).with_global(true);
    assert_eq!(tlb.check_overlap(candidate, 0), Overlap::Single(9));
    assert_eq!(tlb.check_overlap(candidate, 0).to_raw(), 9);
}

#[test]
fn global_candidate_would_create_a_multi_match() {
    let mut tlb = TlbStore::new();
    let _ = tlb.write(9, page(0x1000, PageSize::Size4K, 1).raw());
    let candidate = page(0x1000, PageSize::Size4K, 2).with_global(true);
    assert_ne!(tlb.check_overlap(candidate, 10), Overlap::None);

    let _ = tlb.write(10, candidate.raw());
    assert_eq!(tlb.lookup_by_asid(1, 0x1000), AsidLookup::MultiMatch);
}

#[test]
fn foreign_asid_pages_do_not_overlap() {
    let mut tlb = TlbStore::new();
    let _ = tlb.write(9, page(0x1000, PageSize::Size4K, 1).raw());
    assert_eq!(tlb.check_overlap(page(0x1000, PageSize::Size4K, 2), 0), Overlap::None);
}

#[test]
fn adjacent_pages_do_not_overlap() {
    let mut tlb = TlbStore::new();
    let _ = tlb.write(0, page(0x0, PageSize::Size16K, 1).raw());
    let _ = tlb.write(1, page(0x8000, PageSize::Size16K, 1).raw());
    assert_eq!(tlb.check_overlap(page(0x4000, PageSize::Size16K, 1), 2), Overlap::None);
}

#[test]
fn large_candidate_covers_small_entries() {
    let mut tlb = TlbStore::new();
    let _ = tlb.write(4, page(0x4010_0000, PageSize::Size1M, 3).raw());
    assert_eq!(tlb.check_overlap(page(0x4000_0000, PageSize::Size16M, 3), 0), Overlap::Single(4));
}
