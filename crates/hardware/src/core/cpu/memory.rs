//! Translation and TLB Maintenance.
//!
//! This module provides the interface between a thread and the shared TLB.
//! It performs the following:
//! 1. **Address Translation:** Resolving the thread's address space and consulting the MMU.
//! 2. **Fill Path:** `tlb_fill`, which raises the matching exception on failure.
//! 3. **TLB Instructions:** `tlbr`, `tlbw`, `tlbp` and the overlap check used before `tlbw`.

use tracing::debug;

use super::HexThread;
use crate::common::{AccessType, MmuFault, MmuIdx, Translation, VirtAddr};
use crate::core::arch::mode::mmu_index;
use crate::core::arch::sreg::{SSR, SSR_ASID, SYSCFG, SYSCFG_MMUEN};
use crate::core::arch::trap::{Event, cause};
use crate::core::units::mmu::AddressSpace;
use crate::core::units::mmu::entry::TlbEntry;
use crate::core::units::mmu::tlb::AsidLookup;

use super::exception::ExceptionInfo;

impl HexThread {
    /// Returns true if `SYSCFG.MMUEN` is set.
    pub fn mmu_enabled(&self) -> bool {
        self.shared.globals.field(SYSCFG, SYSCFG_MMUEN) != 0
    }

    /// Returns the current ASID (`SSR.ASID`).
    pub fn asid(&self) -> u8 {
        SSR_ASID.get(self.sregs.get(SSR)) as u8
    }

    /// Returns the MMU index for the thread's current mode.
    pub fn mmu_index(&self) -> MmuIdx {
        mmu_index(self.sregs.get(SSR), self.shared.globals.get(SYSCFG))
    }

    /// Returns the thread's current translation context.
    pub fn address_space(&self) -> AddressSpace {
        AddressSpace {
            asid: self.asid(),
            mmu_idx: self.mmu_index(),
            enabled: self.mmu_enabled(),
        }
    }

    /// Translates `va` in an explicit MMU index.
    ///
    /// # Returns
    ///
    /// The physical address, granted rights and page size, or the fault.
    pub fn translate(&mut self, va: u32, access: AccessType, mmu_idx: MmuIdx) -> Result<Translation, MmuFault> {
        let space = AddressSpace {
            mmu_idx,
            ..self.address_space()
        };
        let generation = self.shared.generation();
        let store = self.shared.tlb();
        self.mmu.translate(&store, VirtAddr::new(va), access, space, generation)
    }

    /// Translates `va` for the thread's current mode and raises on failure.
    ///
    /// A miss raises the TLB-miss event; a denial raises the precise
    /// permission fault with its specific cause.
    ///
    /// # Returns
    ///
    /// `None` if an exception was latched.
    pub fn tlb_fill(&mut self, va: u32, slot: u32, access: AccessType) -> Option<Translation> {
        let mmu_idx = self.mmu_index();
        match self.translate(va, access, mmu_idx) {
            Ok(t) => Some(t),
            Err(MmuFault::Miss) => {
                self.raise_tlb_miss(va, slot, access);
                None
            }
            Err(MmuFault::Permission { cause }) => {
                self.raise_permission_fault(va, slot, access, cause);
                None
            }
        }
    }

    /// `tlbr`: reads the raw entry at `index`.
    pub fn tlb_read(&self, index: u32) -> u64 {
        self.shared.tlb().read(index)
    }

    /// `tlbw`: writes a raw entry at `index`.
    ///
    /// Replacing a valid entry while translation is enabled invalidates every
    /// thread's translation shadow.
    pub fn tlb_write(&mut self, index: u32, value: u64) {
        let old = self.shared.tlb_mut().write(index, value);
        if old.is_valid() && self.mmu_enabled() {
            debug!(target: "hexsim::mmu", tid = self.tid, index, "valid entry replaced; flushing shadows");
            self.shared.invalidate_shadows();
            self.mmu.shadow.flush();
        }
    }

    /// `tlbp`: probes for the entry covering `va` in `asid`.
    ///
    /// More than one match latches `IMPRECISE/MULTI_TLB_MATCH`.
    ///
    /// # Returns
    ///
    /// The matching index, or the not-found sentinel `0x8000_0000`.
    pub fn tlb_probe(&mut self, asid: u8, va: u32) -> u32 {
        let result = self.shared.tlb().lookup_by_asid(asid, va);
        if result == AsidLookup::MultiMatch {
            self.register_exception(ExceptionInfo::new(
                Event::Imprecise,
                cause::IMPRECISE_MULTI_TLB_MATCH,
                self.pc,
            ));
        }
        result.to_raw()
    }

    /// Checks a candidate entry against the table before it is written at `index`.
    ///
    /// # Returns
    ///
    /// The sole overlapping index, `-2` for none or `-1` for several.
    pub fn tlb_overlap(&self, candidate: u64, index: u32) -> i32 {
        self.shared
            .tlb()
            .check_overlap(TlbEntry::from_raw(candidate), index)
            .to_raw()
    }
}
