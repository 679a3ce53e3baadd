//! Cross-Thread Lock Arbiter.
//!
//! Hexagon exposes two core-wide mutual-exclusion primitives to the guest: the
//! TLB lock (`tlblock`/`tlbunlock`, also taken implicitly on every TLB miss)
//! and the kernel lock (`k0lock`/`k0unlock`). Both consist of one bit in
//! `SYSCFG` plus a per-thread state. This module implements:
//! 1. **Lock States:** `Unlocked`, `Waiting` and `Owner`, held in atomics.
//! 2. **Acquire:** Set the bit or mark the caller as waiting.
//! 3. **Release:** Hand the lock to the nearest following waiting thread.
//!
//! A waiting thread is not blocked on any host primitive. Its PC simply stays
//! on the locking instruction and the scheduler skips it until it is made
//! owner. Hardware threads are stepped cooperatively, so an acquire or release
//! is never interleaved with another thread's lock operation.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering, fence};

use tracing::{debug, trace};

use crate::common::constants::MAX_THREADS;
use crate::core::arch::sreg::{Field, SYSCFG, SYSCFG_K0LOCK, SYSCFG_TLBLOCK};
use crate::core::shared::GlobalSregs;

/// Per-thread lock state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LockState {
    /// Neither holding nor waiting for the lock.
    #[default]
    Unlocked = 0,
    /// Re-presenting the locking instruction until ownership is handed over.
    Waiting = 1,
    /// Holding the lock.
    Owner = 2,
}

impl LockState {
    /// Decodes a stored state; unknown values read as `Unlocked`.
    pub const fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Waiting,
            2 => Self::Owner,
            _ => Self::Unlocked,
        }
    }
}

/// Which core-wide lock an arbiter guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockKind {
    /// The TLB lock (`SYSCFG.TLBLOCK`).
    Tlb,
    /// The kernel lock (`SYSCFG.K0LOCK`).
    K0,
}

impl LockKind {
    /// Returns the `SYSCFG` field holding the lock bit.
    pub const fn field(self) -> Field {
        match self {
            Self::Tlb => SYSCFG_TLBLOCK,
            Self::K0 => SYSCFG_K0LOCK,
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tlb => "tlb",
            Self::K0 => "k0",
        })
    }
}

/// Outcome of an acquire attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acquire {
    /// The lock was free and now belongs to the caller.
    Acquired,
    /// The caller already owned the lock.
    AlreadyOwner,
    /// The lock is held elsewhere; the caller is now waiting.
    Contended,
}

impl Acquire {
    /// Returns true if the thread may advance past the locking instruction.
    pub const fn advances(self) -> bool {
        matches!(self, Self::Acquired | Self::AlreadyOwner)
    }
}

/// Outcome of a release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// The caller did not own the lock; nothing changed.
    NotOwner,
    /// The lock is free.
    Released,
    /// Ownership passed directly to the given waiting thread.
    HandedOff(usize),
}

/// Lock-state machine shared by all threads of a core.
///
/// The same implementation serves both the TLB lock and the k0 lock; only the
/// `SYSCFG` bit differs.
pub struct LockArbiter {
    kind: LockKind,
    states: [AtomicU8; MAX_THREADS],
    thread_count: usize,
}

impl fmt::Debug for LockArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let states: Vec<LockState> = (0..self.thread_count).map(|t| self.state(t)).collect();
        f.debug_struct("LockArbiter")
            .field("kind", &self.kind)
            .field("states", &states)
            .finish()
    }
}

impl LockArbiter {
    /// Creates an arbiter with every thread unlocked.
    pub fn new(kind: LockKind, thread_count: usize) -> Self {
        Self {
            kind,
            states: std::array::from_fn(|_| AtomicU8::new(LockState::Unlocked as u8)),
            thread_count: thread_count.clamp(1, MAX_THREADS),
        }
    }

    /// Returns which lock this arbiter guards.
    pub const fn kind(&self) -> LockKind {
        self.kind
    }

    /// Returns a thread's current state.
    pub fn state(&self, tid: usize) -> LockState {
        LockState::from_u8(self.states[tid].load(Ordering::SeqCst))
    }

    /// Stores a thread's state and publishes it to every other thread.
    pub fn set_state(&self, tid: usize, state: LockState) {
        self.states[tid].store(state as u8, Ordering::SeqCst);
        fence(Ordering::SeqCst);
    }

    /// Returns the owning thread, if any.
    pub fn owner(&self) -> Option<usize> {
        (0..self.thread_count).find(|&t| self.state(t) == LockState::Owner)
    }

    /// Returns true if any thread is waiting for the lock.
    pub fn has_waiters(&self) -> bool {
        (0..self.thread_count).any(|t| self.state(t) == LockState::Waiting)
    }

    fn bit(&self) -> u32 {
        self.kind.field().in_place()
    }

    /// Returns true if the lock bit in `SYSCFG` is set.
    pub fn is_locked(&self, globals: &GlobalSregs) -> bool {
        globals.get(SYSCFG) & self.bit() != 0
    }

    /// Attempts to take the lock for `tid`.
    ///
    /// If the bit was clear it is set and `tid` becomes owner. Otherwise `tid`
    /// is marked waiting and must re-issue the locking instruction.
    pub fn acquire(&self, globals: &GlobalSregs, tid: usize) -> Acquire {
        if self.state(tid) == LockState::Owner {
            trace!(target: "hexsim::lock", tid, lock = %self.kind, "re-acquire by owner");
            return Acquire::AlreadyOwner;
        }
        let prev = globals.fetch_or(SYSCFG, self.bit());
        if prev & self.bit() == 0 {
            self.set_state(tid, LockState::Owner);
            debug!(target: "hexsim::lock", tid, lock = %self.kind, "acquired");
            Acquire::Acquired
        } else {
            self.set_state(tid, LockState::Waiting);
            debug!(target: "hexsim::lock", tid, lock = %self.kind, owner = ?self.owner(), "waiting");
            Acquire::Contended
        }
    }

    /// Releases the lock held by `tid`.
    ///
    /// The next owner is the waiting thread nearest after `tid` in thread-id
    /// order, wrapping around. When there is one, the lock bit stays set on its
    /// behalf; otherwise the bit is cleared.
    pub fn release(&self, globals: &GlobalSregs, tid: usize) -> Release {
        if !self.is_locked(globals) || self.state(tid) != LockState::Owner {
            debug!(
                target: "hexsim::lock",
                tid,
                lock = %self.kind,
                state = ?self.state(tid),
                "release by non-owner ignored"
            );
            return Release::NotOwner;
        }
        self.set_state(tid, LockState::Unlocked);

        let n = self.thread_count;
        for d in 1..n {
            let candidate = (tid + d) % n;
            if self.state(candidate) == LockState::Waiting {
                self.set_state(candidate, LockState::Owner);
                let _ = globals.fetch_or(SYSCFG, self.bit());
                debug!(target: "hexsim::lock", from = tid, to = candidate, lock = %self.kind, "handed off");
                return Release::HandedOff(candidate);
            }
        }

        let _ = globals.fetch_and(SYSCFG, !self.bit());
        debug!(target: "hexsim::lock", tid, lock = %self.kind, "released");
        Release::Released
    }

    /// Returns every thread to `Unlocked`.
    pub fn reset(&self) {
        for tid in 0..MAX_THREADS {
            self.set_state(tid, LockState::Unlocked);
        }
    }
}
