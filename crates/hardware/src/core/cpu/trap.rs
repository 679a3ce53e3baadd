//! Exception Dispatch.
//!
//! This module delivers the latched exception of a thread. It performs the
//! following:
//! 1. **Double Faults:** Escalating to `PRECISE/DOUBLE_EXCEPT` when `SSR.EX` is already set.
//! 2. **Bad Address Latching:** Copying `BADVA0/1` and the `SSR.V0/V1/BVS` bits.
//! 3. **Event Handling:** Per-event actions (system-call shim, TLB lock, broadcast, reset).
//! 4. **Redirection:** `ELR`, `SSR.CAUSE`, `SSR.EX` and `PC = EVB | event << 2`.
//! 5. **Return Handling:** `rte`.
//!
//! Unknown event or cause combinations are emulator defects and abort with
//! [`HexError`].

use tracing::{debug, error};

use super::HexThread;
use super::exception::{ExceptionInfo, Resume, TrapType};
use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::{HexError, Result};
use crate::core::arch::sreg::{
    BADVA0, BADVA1, DIAG, ELR, EVB, MODECTL, MODECTL_W, SSR, SSR_BVS, SSR_CAUSE, SSR_EX, SSR_V0,
    SSR_V1,
};
use crate::core::arch::trap::{Event, cause};
use crate::core::lock::{Acquire, LockKind};
use crate::soc::traits::{SyscallShim, TrapEntry};

/// Outcome of dispatching a thread's latched exception.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing was latched.
    Idle,
    /// The thread was redirected to its handler.
    Vectored {
        /// Event delivered (after double-fault escalation).
        event: Event,
        /// Cause written to `SSR.CAUSE`.
        cause: u32,
        /// New PC.
        vector: u32,
    },
    /// An imprecise event must be delivered to every running or waiting thread.
    Broadcast {
        /// Imprecise cause code.
        cause: u32,
    },
    /// The thread performed a soft reset.
    Reset,
}

/// Returns true for the `PRECISE` cause codes the core knows how to deliver.
const fn is_known_precise(c: u32) -> bool {
    matches!(
        c,
        cause::BIU_PRECISE
            | cause::UNSUPPORTED_HVX_64B
            | cause::DOUBLE_EXCEPT
            | cause::FETCH_NO_XPAGE
            | cause::FETCH_NO_UPAGE
            | cause::INVALID_OPCODE
            | cause::NO_COPROC_ENABLE
            | cause::NO_COPROC2_ENABLE
            | cause::PRIV_USER_NO_GINSN
            | cause::PRIV_USER_NO_SINSN
            | cause::REG_WRITE_CONFLICT
            | cause::PC_NOT_ALIGNED
            | cause::MISALIGNED_LOAD
            | cause::MISALIGNED_STORE
            | cause::PRIV_NO_READ
            | cause::PRIV_NO_WRITE
            | cause::PRIV_NO_UREAD
            | cause::PRIV_NO_UWRITE
            | cause::COPROC_LDST
            | cause::STACK_LIMIT
            | cause::VWCTRL_WINDOW_MISS
    )
}

impl HexThread {
    /// Delivers the latched exception, if any.
    ///
    /// # Arguments
    ///
    /// * `shim` - Receives plain `trap0`/`trap1` system calls.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::UnknownEvent`] or [`HexError::UnknownCause`] for
    /// combinations the architecture does not define. The latched record is
    /// consumed either way.
    pub fn do_interrupt(&mut self, shim: &mut dyn SyscallShim) -> Result<Dispatch> {
        let Some(mut info) = self.exception.take() else {
            return Ok(Dispatch::Idle);
        };

        let ssr = self.sregs.get(SSR);
        if SSR_EX.is_set(ssr) {
            debug!(
                target: "hexsim::int",
                tid = self.tid,
                event = info.event,
                cause = format_args!("{:#x}", info.cause),
                "double exception"
            );
            self.stats.double_exceptions += 1;
            info.diag = info.cause;
            self.shared.globals.set(DIAG, info.diag);
            info.event = Event::Precise.code();
            info.cause = cause::DOUBLE_EXCEPT;
        }
        self.latch_badva(&info);

        let Some(event) = info.event_type() else {
            return Err(self.fatal_event(&info));
        };

        let resume = match event {
            Event::Trap0 | Event::Trap1 => {
                if info.cause == 0 {
                    let entry = TrapEntry {
                        trap: if event == Event::Trap0 { TrapType::Trap0 } else { TrapType::Trap1 },
                        cause: info.cause,
                        ssr: self.sregs.get(SSR),
                        pc: info.pc,
                    };
                    shim.handle_trap(&mut self.regs, entry);
                }
                Resume::Next
            }
            Event::TlbMissX => match info.cause {
                cause::TLBMISSX_NORMAL | cause::TLBMISSX_NEXTPAGE => self.lock_for_fill(),
                _ => return Err(self.fatal_cause(&info)),
            },
            Event::TlbMissRw => match info.cause {
                cause::TLBMISSRW_READ | cause::TLBMISSRW_WRITE => self.lock_for_fill(),
                _ => return Err(self.fatal_cause(&info)),
            },
            Event::Imprecise => match info.cause {
                cause::IMPRECISE_NMI | cause::IMPRECISE_MULTI_TLB_MATCH => {
                    debug!(
                        target: "hexsim::int",
                        tid = self.tid,
                        cause = format_args!("{:#x}", info.cause),
                        "imprecise broadcast"
                    );
                    return Ok(Dispatch::Broadcast { cause: info.cause });
                }
                _ => return Err(self.fatal_cause(&info)),
            },
            Event::Precise if is_known_precise(info.cause) => Resume::Retry,
            Event::FpTrap if info.cause == cause::FPTRAP_BADFLOAT => Resume::Next,
            Event::Debug if info.cause == cause::DEBUG_SINGLESTEP => Resume::Retry,
            Event::Interrupt(n) if info.cause == cause::interrupt(n) => {
                let _ = self
                    .shared
                    .globals
                    .fetch_and(MODECTL, !(1 << (MODECTL_W.shift + self.tid as u32)));
                Resume::Retry
            }
            Event::Reset => {
                self.soft_reset();
                return Ok(Dispatch::Reset);
            }
            Event::Precise | Event::FpTrap | Event::Debug | Event::Interrupt(_) => {
                return Err(self.fatal_cause(&info));
            }
        };

        let vector = self.enter_handler(event, info.cause, info.pc, resume);
        Ok(Dispatch::Vectored {
            event,
            cause: info.cause,
            vector,
        })
    }

    /// Redirects the thread for a core-wide imprecise event.
    ///
    /// A thread already inside a handler takes `PRECISE/DOUBLE_EXCEPT`
    /// instead. A waiting thread is woken.
    pub fn enter_imprecise(&mut self, imprecise_cause: u32) -> Dispatch {
        let _ = self
            .shared
            .globals
            .fetch_and(MODECTL, !(1 << (MODECTL_W.shift + self.tid as u32)));
        let (event, cause) = if SSR_EX.is_set(self.sregs.get(SSR)) {
            self.stats.double_exceptions += 1;
            self.shared.globals.set(DIAG, imprecise_cause);
            (Event::Precise, cause::DOUBLE_EXCEPT)
        } else {
            (Event::Imprecise, imprecise_cause)
        };
        let vector = self.enter_handler(event, cause, self.pc, Resume::Retry);
        Dispatch::Vectored { event, cause, vector }
    }

    /// Returns from an exception handler: `PC = ELR`, `SSR.EX` cleared.
    pub fn rte(&mut self) {
        self.pc = self.sregs.get(ELR);
        self.sregs.set_field(SSR, SSR_EX, 0);
        debug!(target: "hexsim::int", tid = self.tid, pc = format_args!("{:#010x}", self.pc), "rte");
    }

    /// Saves the resume PC, marks the exception active and jumps to the vector.
    fn enter_handler(&mut self, event: Event, cause: u32, pc: u32, resume: Resume) -> u32 {
        let elr = match resume {
            Resume::Retry => pc,
            Resume::Next => pc.wrapping_add(INSTRUCTION_SIZE),
        };
        self.sregs.set(ELR, elr);
        self.sregs.set_field(SSR, SSR_CAUSE, cause);
        self.sregs.set_field(SSR, SSR_EX, 1);

        let vector = self.shared.globals.get(EVB) | (event.code() << 2);
        self.pc = vector;
        self.stats.exceptions_taken += 1;
        debug!(
            target: "hexsim::int",
            tid = self.tid,
            %event,
            cause = format_args!("{cause:#x}"),
            elr = format_args!("{elr:#010x}"),
            vector = format_args!("{vector:#010x}"),
            "enter handler"
        );
        vector
    }

    /// Copies the record's faulting addresses into `BADVA0/1` and `SSR.V0/V1/BVS`.
    fn latch_badva(&mut self, info: &ExceptionInfo) {
        if info.v0 {
            self.sregs.set(BADVA0, info.badva0);
        }
        if info.v1 {
            self.sregs.set(BADVA1, info.badva1);
        }
        if info.v0 || info.v1 {
            self.sregs.set_field(SSR, SSR_V0, u32::from(info.v0));
            self.sregs.set_field(SSR, SSR_V1, u32::from(info.v1));
            self.sregs.set_field(SSR, SSR_BVS, u32::from(info.bvs));
        }
    }

    /// Takes the TLB lock for the guest fill handler.
    ///
    /// On contention the thread waits at the vector until ownership is
    /// handed to it.
    fn lock_for_fill(&mut self) -> Resume {
        if self.shared.tlb_lock.acquire(&self.shared.globals, self.tid) == Acquire::Contended {
            self.stats.lock_contentions += 1;
            debug!(target: "hexsim::lock", tid = self.tid, lock = %LockKind::Tlb, "miss handler waits for lock");
        }
        Resume::Retry
    }

    fn fatal_event(&self, info: &ExceptionInfo) -> HexError {
        error!(
            target: "hexsim::int",
            tid = self.tid,
            event = format_args!("{:#x}", info.event),
            cause = format_args!("{:#x}", info.cause),
            pc = format_args!("{:#010x}", info.pc),
            "unsupported event"
        );
        HexError::UnknownEvent {
            tid: self.tid,
            event: info.event,
            cause: info.cause,
            pc: info.pc,
        }
    }

    fn fatal_cause(&self, info: &ExceptionInfo) -> HexError {
        let badva0 = self.sregs.get(BADVA0);
        let badva1 = self.sregs.get(BADVA1);
        error!(
            target: "hexsim::int",
            tid = self.tid,
            event = format_args!("{:#x}", info.event),
            cause = format_args!("{:#x}", info.cause),
            pc = format_args!("{:#010x}", info.pc),
            badva0 = format_args!("{badva0:#010x}"),
            badva1 = format_args!("{badva1:#010x}"),
            "unknown cause"
        );
        self.regs.dump();
        HexError::UnknownCause {
            tid: self.tid,
            event: info.event,
            cause: info.cause,
            pc: info.pc,
            badva0,
            badva1,
        }
    }
}
