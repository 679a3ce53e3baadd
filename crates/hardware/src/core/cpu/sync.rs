//! Lock Instructions.
//!
//! `tlblock`/`tlbunlock` and `k0lock`/`k0unlock` on top of the shared
//! [`LockArbiter`](crate::core::lock::LockArbiter). A contended acquire leaves
//! the PC on the locking instruction; the thread re-executes it once it has
//! been made owner.

use super::HexThread;
use crate::core::lock::{Acquire, LockKind, LockState, Release};

impl HexThread {
    /// Acquires a lock.
    ///
    /// # Arguments
    ///
    /// * `kind` - Which lock.
    /// * `next_pc` - PC of the following packet; taken only if the thread owns the lock afterwards.
    pub fn lock_acquire(&mut self, kind: LockKind, next_pc: u32) -> Acquire {
        let result = self.shared.arbiter(kind).acquire(&self.shared.globals, self.tid);
        if result.advances() {
            self.pc = next_pc;
        } else {
            self.stats.lock_contentions += 1;
        }
        result
    }

    /// Releases a lock and advances to `next_pc`.
    ///
    /// A release by a non-owner changes nothing but the PC.
    pub fn lock_release(&mut self, kind: LockKind, next_pc: u32) -> Release {
        let result = self.shared.arbiter(kind).release(&self.shared.globals, self.tid);
        self.pc = next_pc;
        result
    }

    /// Returns this thread's state for a lock.
    pub fn lock_state(&self, kind: LockKind) -> LockState {
        self.shared.arbiter(kind).state(self.tid)
    }

    /// `tlblock`.
    pub fn tlblock(&mut self, next_pc: u32) -> Acquire {
        self.lock_acquire(LockKind::Tlb, next_pc)
    }

    /// `tlbunlock`.
    pub fn tlbunlock(&mut self, next_pc: u32) -> Release {
        self.lock_release(LockKind::Tlb, next_pc)
    }

    /// `k0lock`.
    pub fn k0lock(&mut self, next_pc: u32) -> Acquire {
        self.lock_acquire(LockKind::K0, next_pc)
    }

    /// `k0unlock`.
    pub fn k0unlock(&mut self, next_pc: u32) -> Release {
        self.lock_release(LockKind::K0, next_pc)
    }
}
