//! Exception Registration.
//!
//! Faults detected while a packet executes are not delivered immediately.
//! They are latched in an [`ExceptionInfo`] record and delivered by the
//! dispatcher once the packet ends. This module performs the following:
//! 1. **Recording:** Building exception records with their bad-address slot.
//! 2. **Priority:** Keeping the highest-priority record when a packet raises several.
//! 3. **Raising:** The entry points used by the execution engine (TLB miss,
//!    permission fault, trap, interrupt).

use tracing::{debug, trace};

use super::HexThread;
use crate::common::constants::PAGE_SHIFT;
use crate::common::AccessType;
use crate::core::arch::sreg::{IMASK, SSR, SSR_EX, SSR_IE};
use crate::core::arch::trap::{Event, cause};

/// Where execution resumes after the handler returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resume {
    /// Re-execute the faulting packet (`ELR = pc`).
    Retry,
    /// Continue with the following packet (`ELR = pc + 4`).
    Next,
}

/// The two trap instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapType {
    /// `trap0(#imm)`, the system-call trap.
    Trap0,
    /// `trap1(#imm)`, the monitor trap.
    Trap1,
}

/// A latched exception.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExceptionInfo {
    /// Raw event number (see [`Event::code`]).
    pub event: u32,
    /// Cause code within the event.
    pub cause: u32,
    /// Bad virtual address from slot 0 (also used for fetches).
    pub badva0: u32,
    /// Bad virtual address from slot 1.
    pub badva1: u32,
    /// `badva0` holds an address.
    pub v0: bool,
    /// `badva1` holds an address.
    pub v1: bool,
    /// The merged `BADVA` register should read slot 1.
    pub bvs: bool,
    /// PC of the packet that raised the exception.
    pub pc: u32,
    /// Cause superseded by a double-exception escalation (also written to `DIAG`).
    pub diag: u32,
}

impl ExceptionInfo {
    /// Creates a record for `event`/`cause` raised by the packet at `pc`.
    pub const fn new(event: Event, cause: u32, pc: u32) -> Self {
        Self {
            event: event.code(),
            cause,
            badva0: 0,
            badva1: 0,
            v0: false,
            v1: false,
            bvs: false,
            pc,
            diag: 0,
        }
    }

    /// Attaches a faulting address produced by memory slot `slot`.
    ///
    /// Slot 1 also selects `BADVA1` for the merged `BADVA` read; any other
    /// slot records into `BADVA0`.
    pub const fn with_badva(mut self, slot: u32, va: u32) -> Self {
        if slot == 1 {
            self.badva1 = va;
            self.v1 = true;
            self.bvs = true;
        } else {
            self.badva0 = va;
            self.v0 = true;
            self.bvs = false;
        }
        self
    }

    /// Returns the decoded event, or `None` for a reserved event number.
    pub const fn event_type(&self) -> Option<Event> {
        Event::from_code(self.event)
    }

    /// Combines a newly raised record with the one already latched.
    ///
    /// The lower event number wins; for the same event the lower cause wins.
    /// Two `DOUBLE_EXCEPT` records from different memory slots are merged so
    /// neither slot's address is lost; the merged `BADVA` then reads slot 0.
    #[must_use]
    pub const fn prioritize(self, new: Self) -> Self {
        if new.event < self.event {
            return new;
        }
        if new.event > self.event {
            return self;
        }
        if new.cause < self.cause {
            return new;
        }
        if new.cause == self.cause && new.cause == cause::DOUBLE_EXCEPT {
            let mut merged = self;
            if new.v0 && !self.v0 {
                merged.badva0 = new.badva0;
                merged.v0 = true;
            }
            if new.v1 && !self.v1 {
                merged.badva1 = new.badva1;
                merged.v1 = true;
            }
            // BVS selects slot 0 whenever it holds an address.
            merged.bvs = !merged.v0 && merged.v1;
            return merged;
        }
        self
    }
}

/// Selects the TLB-miss event and cause for an access.
///
/// A fetch from a page other than the one holding `pc` is a next-page miss.
pub const fn tlb_miss_cause(va: u32, pc: u32, access: AccessType) -> (Event, u32) {
    match access {
        AccessType::Fetch if (va >> PAGE_SHIFT) != (pc >> PAGE_SHIFT) => (Event::TlbMissX, cause::TLBMISSX_NEXTPAGE),
        AccessType::Fetch => (Event::TlbMissX, cause::TLBMISSX_NORMAL),
        AccessType::Read => (Event::TlbMissRw, cause::TLBMISSRW_READ),
        AccessType::Write => (Event::TlbMissRw, cause::TLBMISSRW_WRITE),
    }
}

impl HexThread {
    /// Latches an exception, keeping the higher-priority one if another is pending.
    pub fn register_exception(&mut self, info: ExceptionInfo) {
        let latched = match self.exception {
            Some(old) => old.prioritize(info),
            None => info,
        };
        trace!(
            target: "hexsim::int",
            tid = self.tid,
            event = latched.event,
            cause = format_args!("{:#x}", latched.cause),
            "exception latched"
        );
        self.exception = Some(latched);
    }

    /// Returns true if an exception is waiting for dispatch.
    pub const fn has_pending_exception(&self) -> bool {
        self.exception.is_some()
    }

    /// Raises a TLB miss for `va` from memory slot `slot`.
    pub fn raise_tlb_miss(&mut self, va: u32, slot: u32, access: AccessType) {
        let (event, cause) = tlb_miss_cause(va, self.pc, access);
        self.stats.tlb_misses += 1;
        debug!(
            target: "hexsim::mmu",
            tid = self.tid,
            va = format_args!("{va:#010x}"),
            slot,
            ?access,
            "TLB miss"
        );
        self.register_exception(ExceptionInfo::new(event, cause, self.pc).with_badva(slot, va));
    }

    /// Raises a precise permission fault for `va` with the given cause.
    ///
    /// `access` is informational; the cause already encodes the access kind.
    pub fn raise_permission_fault(&mut self, va: u32, slot: u32, access: AccessType, cause: u32) {
        self.stats.perm_faults += 1;
        debug!(
            target: "hexsim::mmu",
            tid = self.tid,
            va = format_args!("{va:#010x}"),
            slot,
            ?access,
            cause = format_args!("{cause:#x}"),
            "permission fault"
        );
        self.register_exception(ExceptionInfo::new(Event::Precise, cause, self.pc).with_badva(slot, va));
    }

    /// Registers a `trap0`/`trap1` executed by the packet at `pc`.
    ///
    /// The 8-bit immediate becomes the cause code.
    pub fn register_trap(&mut self, trap: TrapType, imm: u32, pc: u32) {
        let event = match trap {
            TrapType::Trap0 => Event::Trap0,
            TrapType::Trap1 => Event::Trap1,
        };
        self.register_exception(ExceptionInfo::new(event, imm & 0xff, pc));
    }

    /// Raises external interrupt line `n` if the thread currently accepts it.
    ///
    /// An interrupt is accepted when `SSR.IE` is set, no exception is active
    /// and the line is not masked in `IMASK`.
    ///
    /// # Returns
    ///
    /// `true` if the interrupt was latched.
    pub fn raise_interrupt(&mut self, n: u8) -> bool {
        let ssr = self.sregs.get(SSR);
        let masked = self.sregs.get(IMASK) & (1 << (n & 0xf)) != 0;
        if !SSR_IE.is_set(ssr) || SSR_EX.is_set(ssr) || masked {
            trace!(target: "hexsim::int", tid = self.tid, line = n, "interrupt not accepted");
            return false;
        }
        let line = n & 0xf;
        self.register_exception(ExceptionInfo::new(Event::Interrupt(line), cause::interrupt(line), self.pc));
        true
    }
}
