//! Translation Shadow.
//!
//! A per-thread, direct-mapped cache of recent translations at 4 KiB
//! granularity. It sits in front of the linear scan of the shared
//! [`TlbStore`](super::tlb::TlbStore) and is keyed by virtual page, ASID and
//! MMU index. Entries are tagged with the core's shadow generation; bumping the
//! generation (after a valid TLB entry is replaced) invalidates every thread's
//! shadow at once without cross-thread writes.

use crate::common::constants::PAGE_SHIFT;
use crate::common::{MmuIdx, PhysAddr, Protection, Translation};

/// A single cached translation.
#[derive(Clone, Copy, Debug)]
struct ShadowEntry {
    /// Virtual page number (tag).
    vpn: u32,
    /// Physical base of the 4 KiB page.
    ppage: u64,
    /// ASID the translation was made for.
    asid: u8,
    /// MMU index the rights were derived for.
    mmu_idx: MmuIdx,
    /// Rights granted at `mmu_idx`.
    prot: Protection,
    /// Size of the backing TLB page.
    page_size: u64,
    /// Core shadow generation at fill time.
    generation: u64,
    /// Entry validity flag.
    valid: bool,
}

impl Default for ShadowEntry {
    fn default() -> Self {
        Self {
            vpn: 0,
            ppage: 0,
            asid: 0,
            mmu_idx: MmuIdx::Kernel,
            prot: Protection::NONE,
            page_size: 0,
            generation: 0,
            valid: false,
        }
    }
}

/// Direct-mapped translation shadow.
#[derive(Clone, Debug)]
pub struct ShadowTlb {
    /// Vector of shadow entries.
    entries: Vec<ShadowEntry>,
    /// Mask used for indexing (size - 1).
    mask: usize,
    /// Lookups served from the shadow.
    pub hits: u64,
    /// Lookups that fell through to the TLB scan.
    pub misses: u64,
}

impl ShadowTlb {
    /// Creates a shadow with the specified size.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of entries (will be rounded up to the next power of 2, minimum 1).
    pub fn new(size: usize) -> Self {
        let safe_size = size.max(1).next_power_of_two();
        Self {
            entries: vec![ShadowEntry::default(); safe_size],
            mask: safe_size - 1,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Looks up a cached translation.
    ///
    /// # Returns
    ///
    /// The cached translation (with the in-page offset of `va` applied) if the
    /// slot holds a current-generation entry for the same page, ASID and MMU index.
    #[inline]
    pub fn lookup(&mut self, va: u32, asid: u8, mmu_idx: MmuIdx, generation: u64) -> Option<Translation> {
        let vpn = va >> PAGE_SHIFT;
        let entry = self.entries[vpn as usize & self.mask];
        if entry.valid
            && entry.vpn == vpn
            && entry.asid == asid
            && entry.mmu_idx == mmu_idx
            && entry.generation == generation
        {
            self.hits += 1;
            let offset = u64::from(va) & ((1 << PAGE_SHIFT) - 1);
            return Some(Translation::new(
                PhysAddr::new(entry.ppage | offset),
                entry.prot,
                entry.page_size,
            ));
        }
        self.misses += 1;
        None
    }

    /// Caches a translation for the 4 KiB page containing `va`.
    pub fn insert(&mut self, va: u32, asid: u8, mmu_idx: MmuIdx, t: &Translation, generation: u64) {
        let vpn = va >> PAGE_SHIFT;
        self.entries[vpn as usize & self.mask] = ShadowEntry {
            vpn,
            ppage: t.paddr.val() & !((1 << PAGE_SHIFT) - 1),
            asid,
            mmu_idx,
            prot: t.prot,
            page_size: t.page_size,
            generation,
            valid: true,
        };
    }

    /// Flushes all entries.
    pub fn flush(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
    }
}
