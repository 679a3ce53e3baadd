//! Reset and Thread Lifecycle.
//!
//! This module implements the per-thread half of reset and the instructions
//! that move threads between running, waiting and stopped. It performs the
//! following:
//! 1. **Thread Reset:** Zeroing private state and soft-resetting to `EVB`.
//! 2. **Start/Stop:** `MODECTL.E` maintenance.
//! 3. **Wait/Resume:** `MODECTL.W` maintenance.
//! 4. **Scheduling:** Deciding whether a thread may execute its next packet.
//!
//! The core-global half of reset (TLB, global registers, cycle counter)
//! belongs to [`SharedCore::reset`](crate::core::shared::SharedCore::reset)
//! and is only ever run on behalf of thread 0.

use tracing::debug;

use super::HexThread;
use crate::core::arch::sreg::{EVB, HTID, MODECTL, MODECTL_E, MODECTL_W, SSR, SSR_CAUSE, SSR_EX};
use crate::core::arch::trap::cause;
use crate::core::lock::LockState;

impl HexThread {
    /// Per-thread reset.
    ///
    /// Clears the register files, per-thread system registers, pending stores,
    /// the latched exception and both lock states, then soft-resets.
    pub fn reset(&mut self) {
        self.regs.clear();
        self.sregs.clear();
        self.sregs.set(HTID, self.tid as u32);
        self.pending_stores.clear();
        self.exception = None;
        self.shared.tlb_lock.set_state(self.tid, LockState::Unlocked);
        self.shared.k0_lock.set_state(self.tid, LockState::Unlocked);
        self.mmu.shadow.flush();
        self.soft_reset();
    }

    /// Soft reset: `SSR` cleared then set to an active `RESET` exception, `PC = EVB`.
    pub fn soft_reset(&mut self) {
        self.sregs.set(SSR, 0);
        self.sregs.set_field(SSR, SSR_CAUSE, cause::RESET);
        self.sregs.set_field(SSR, SSR_EX, 1);
        self.pc = self.shared.globals.get(EVB);
        debug!(target: "hexsim::reset", tid = self.tid, pc = format_args!("{:#010x}", self.pc), "soft reset");
    }

    /// Returns the thread-count mask of valid thread bits.
    fn thread_mask(&self) -> u32 {
        (1u32 << self.shared.thread_count()) - 1
    }

    /// `start(Rs)`: enables the threads in `mask`.
    ///
    /// # Returns
    ///
    /// The threads that were not already enabled; the caller soft-resets them.
    pub fn start(&mut self, mask: u32) -> u32 {
        let mask = mask & self.thread_mask();
        let prev = self.shared.globals.fetch_or(MODECTL, MODECTL_E.set(0, mask));
        let started = mask & !MODECTL_E.get(prev);
        debug!(target: "hexsim::reset", tid = self.tid, mask = format_args!("{mask:#x}"), started = format_args!("{started:#x}"), "start");
        started
    }

    /// `stop`: disables this thread.
    pub fn stop(&mut self) {
        let bit = 1u32 << self.tid;
        let _ = self
            .shared
            .globals
            .fetch_and(MODECTL, !(MODECTL_E.set(0, bit) | MODECTL_W.set(0, bit)));
        debug!(target: "hexsim::reset", tid = self.tid, "stop");
    }

    /// `wait`: parks this thread until it is resumed or interrupted.
    ///
    /// The thread continues at `next_pc` when it wakes.
    pub fn wait(&mut self, next_pc: u32) {
        self.pc = next_pc;
        let _ = self
            .shared
            .globals
            .fetch_or(MODECTL, MODECTL_W.set(0, 1 << self.tid));
        debug!(target: "hexsim::reset", tid = self.tid, "wait");
    }

    /// `resume(Rs)`: wakes the waiting threads in `mask`.
    pub fn resume(&mut self, mask: u32) {
        let mask = mask & self.thread_mask();
        let _ = self.shared.globals.fetch_and(MODECTL, !MODECTL_W.set(0, mask));
        debug!(target: "hexsim::reset", tid = self.tid, mask = format_args!("{mask:#x}"), "resume");
    }

    /// Returns true if `MODECTL.E` is set for this thread.
    pub fn is_enabled(&self) -> bool {
        self.shared.globals.field(MODECTL, MODECTL_E) & (1 << self.tid) != 0
    }

    /// Returns true if `MODECTL.W` is set for this thread.
    pub fn is_waiting(&self) -> bool {
        self.shared.globals.field(MODECTL, MODECTL_W) & (1 << self.tid) != 0
    }

    /// Returns true if the thread may execute its next packet.
    ///
    /// The thread must be enabled, not in `wait`, and not waiting for either lock.
    pub fn is_runnable(&self) -> bool {
        self.is_enabled()
            && !self.is_waiting()
            && self.shared.tlb_lock.state(self.tid) != LockState::Waiting
            && self.shared.k0_lock.state(self.tid) != LockState::Waiting
    }
}
