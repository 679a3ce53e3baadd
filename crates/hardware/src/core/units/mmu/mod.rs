//! Memory Management Unit (MMU).
//!
//! This module implements Hexagon virtual-to-physical address translation
//! against the software-managed TLB. It includes:
//! 1. **Entries:** The packed 64-bit entry format and page sizes.
//! 2. **TLB Store:** The shared 192-entry table with lookup, probe and overlap check.
//! 3. **Shadow:** A per-thread translation cache invalidated by generation.
//! 4. **Permissions:** Rights derivation and precise permission cause selection.

/// Packed TLB entry format.
pub mod entry;

/// Per-thread translation shadow.
pub mod shadow;

/// Shared TLB store.
pub mod tlb;

use crate::common::{AccessType, MmuFault, MmuIdx, PhysAddr, Protection, Translation, VirtAddr};
use crate::core::arch::trap::cause;

use self::entry::TlbEntry;
use self::shadow::ShadowTlb;
use self::tlb::TlbStore;

/// Translation context of the requesting thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressSpace {
    /// Current ASID (`SSR.ASID`).
    pub asid: u8,
    /// Permission class.
    pub mmu_idx: MmuIdx,
    /// `SYSCFG.MMUEN`.
    pub enabled: bool,
}

/// Returns the rights an entry grants at an MMU index.
///
/// Kernel accesses always get full rights. User accesses get nothing unless the
/// entry's user bit is set; otherwise the entry's R/W/X bits apply.
pub const fn entry_protection(entry: TlbEntry, mmu_idx: MmuIdx) -> Protection {
    match mmu_idx {
        MmuIdx::Kernel => Protection::ALL,
        MmuIdx::User if !entry.user() => Protection::NONE,
        MmuIdx::User | MmuIdx::Guest => Protection::new(entry.read(), entry.write(), entry.exec()),
    }
}

/// Checks an access against an entry and selects the precise cause on denial.
///
/// # Returns
///
/// The granted rights, or the `FETCH_NO_*` / `PRIV_NO_*` cause code.
pub const fn check_access(entry: TlbEntry, access: AccessType, mmu_idx: MmuIdx) -> Result<Protection, u32> {
    let prot = entry_protection(entry, mmu_idx);
    if prot.allows(access) {
        return Ok(prot);
    }
    let user_denied = matches!(mmu_idx, MmuIdx::User) && !entry.user();
    Err(match (access, user_denied) {
        (AccessType::Fetch, true) => cause::FETCH_NO_UPAGE,
        (AccessType::Fetch, false) => cause::FETCH_NO_XPAGE,
        (AccessType::Read, true) => cause::PRIV_NO_UREAD,
        (AccessType::Read, false) => cause::PRIV_NO_READ,
        (AccessType::Write, true) => cause::PRIV_NO_UWRITE,
        (AccessType::Write, false) => cause::PRIV_NO_WRITE,
    })
}

/// Translates `va` against the store without any caching.
///
/// The first entry covering `va` for `asid` (or global) is used.
pub fn lookup(store: &TlbStore, va: u32, access: AccessType, asid: u8, mmu_idx: MmuIdx) -> Result<Translation, MmuFault> {
    let Some((_, entry)) = store.find_match(va, asid) else {
        return Err(MmuFault::Miss);
    };
    let (Some(size), Some(base)) = (entry.page_size(), entry.phys_base()) else {
        return Err(MmuFault::Miss);
    };
    let prot = check_access(entry, access, mmu_idx).map_err(|cause| MmuFault::Permission { cause })?;
    let paddr = base | (u64::from(va) & size.offset_mask());
    Ok(Translation::new(PhysAddr::new(paddr), prot, size.bytes()))
}

/// Per-thread MMU front end.
#[derive(Clone, Debug)]
pub struct Mmu {
    /// Translation shadow in front of the TLB scan.
    pub shadow: ShadowTlb,
}

impl Mmu {
    /// Creates an MMU with a shadow of the given size.
    pub fn new(shadow_size: usize) -> Self {
        Self {
            shadow: ShadowTlb::new(shadow_size),
        }
    }

    /// Translates a virtual address.
    ///
    /// With translation disabled the address maps to itself with full rights
    /// and a 4 KiB page. Otherwise the shadow is consulted first; a shadow hit
    /// that does not grant the access falls through to the scan so the precise
    /// cause is reported.
    ///
    /// # Arguments
    ///
    /// * `store` - The shared TLB.
    /// * `vaddr` - Virtual address to translate.
    /// * `access` - Type of access (Fetch, Read, Write).
    /// * `space` - ASID, MMU index and enable state of the requester.
    /// * `generation` - Current core shadow generation.
    pub fn translate(
        &mut self,
        store: &TlbStore,
        vaddr: VirtAddr,
        access: AccessType,
        space: AddressSpace,
        generation: u64,
    ) -> Result<Translation, MmuFault> {
        if !space.enabled {
            return Ok(Translation::new(
                PhysAddr::new(u64::from(vaddr.val())),
                Protection::ALL,
                crate::common::constants::PAGE_SIZE,
            ));
        }

        let va = vaddr.val();
        if let Some(t) = self.shadow.lookup(va, space.asid, space.mmu_idx, generation) {
            if t.prot.allows(access) {
                return Ok(t);
            }
        }

        let t = lookup(store, va, access, space.asid, space.mmu_idx)?;
        self.shadow.insert(va, space.asid, space.mmu_idx, &t, generation);
        Ok(t)
    }
}
