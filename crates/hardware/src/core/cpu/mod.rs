//! Hardware Thread Definition and Construction.
//!
//! This module defines `HexThread`, the complete privileged state of one
//! Hexagon hardware thread. It coordinates the following:
//! 1. **State Management:** Registers, PC, per-thread system registers and the latched exception.
//! 2. **Shared State:** A handle on the core-wide [`SharedCore`] (TLB, global registers, locks).
//! 3. **Construction Order:** Thread 0 allocates the shared block; every other thread borrows it.
//!
//! Behaviour is split across submodules:
//! - [`exception`]: registering exceptions, TLB misses, permission faults and interrupts.
//! - [`trap`]: dispatching the latched exception to its vector.
//! - [`memory`]: translation and the TLB maintenance instructions.
//! - [`sreg`]: system register access and cache no-ops.
//! - [`sync`]: the TLB and k0 lock instructions.
//! - [`reset`]: per-thread reset and the thread lifecycle instructions.

/// Exception registration and priority.
pub mod exception;

/// Translation and TLB maintenance.
pub mod memory;

/// Per-thread and thread lifecycle reset.
pub mod reset;

/// System register access.
pub mod sreg;

/// Lock instructions.
pub mod sync;

/// Exception dispatch.
pub mod trap;

use std::sync::Arc;

use tracing::debug;

use crate::common::{HexError, PhysAddr, RegisterFile, Result};
use crate::core::arch::sreg::ThreadSregs;
use crate::core::shared::{CoreParams, SharedCore};
use crate::core::units::mmu::Mmu;
use crate::stats::CoreStats;

pub use self::exception::{ExceptionInfo, Resume, TrapType};
pub use self::trap::Dispatch;

/// A store buffered until its packet commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingStore {
    /// Translated destination.
    pub paddr: PhysAddr,
    /// Value to store (low `width` bytes are significant).
    pub value: u64,
    /// Access width in bytes.
    pub width: u8,
}

/// Privileged state of one hardware thread.
#[derive(Debug)]
pub struct HexThread {
    tid: usize,
    /// General, predicate and vector registers.
    pub regs: RegisterFile,
    /// Program counter.
    pub pc: u32,
    /// Per-thread system registers (0-15).
    pub sregs: ThreadSregs,
    /// Exception latched for the current packet, if any.
    pub exception: Option<ExceptionInfo>,
    /// Stores buffered for the current packet.
    pub pending_stores: Vec<PendingStore>,
    /// Translation front end.
    pub mmu: Mmu,
    shared: Arc<SharedCore>,
    stats: CoreStats,
}

impl HexThread {
    /// Creates thread 0 together with the core's shared block.
    ///
    /// The shared block is reset (core-global reset) before the thread's own
    /// reset runs.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Config`] if `params` does not validate.
    pub fn new_primary(params: CoreParams) -> Result<Self> {
        let shared = Arc::new(SharedCore::new(params)?);
        Ok(Self::build(0, shared))
    }

    /// Creates thread `tid` on a core whose shared block already exists.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::InvalidThread`] for thread 0 (which must be created
    /// with [`HexThread::new_primary`]) or an id beyond the core's thread count.
    pub fn new_secondary(tid: usize, shared: &Arc<SharedCore>) -> Result<Self> {
        if tid == 0 || tid >= shared.thread_count() {
            return Err(HexError::InvalidThread {
                tid,
                count: shared.thread_count(),
            });
        }
        Ok(Self::build(tid, Arc::clone(shared)))
    }

    fn build(tid: usize, shared: Arc<SharedCore>) -> Self {
        let mut thread = Self {
            tid,
            regs: RegisterFile::new(),
            pc: 0,
            sregs: ThreadSregs::default(),
            exception: None,
            pending_stores: Vec::new(),
            mmu: Mmu::new(shared.params().shadow_tlb_size),
            shared,
            stats: CoreStats::default(),
        };
        thread.reset();
        debug!(target: "hexsim::reset", tid, "thread realized");
        thread
    }

    /// Hardware thread id.
    pub const fn tid(&self) -> usize {
        self.tid
    }

    /// Handle on the core-wide shared state.
    pub const fn shared(&self) -> &Arc<SharedCore> {
        &self.shared
    }

    /// Returns the thread's statistics, including its translation shadow counters.
    pub const fn stats(&self) -> CoreStats {
        CoreStats {
            shadow_hits: self.mmu.shadow.hits,
            shadow_misses: self.mmu.shadow.misses,
            ..self.stats
        }
    }

    /// Buffers a store for the current packet.
    pub fn queue_store(&mut self, paddr: PhysAddr, value: u64, width: u8) {
        self.pending_stores.push(PendingStore { paddr, value, width });
    }

    /// Removes and returns the buffered stores in program order.
    pub fn take_stores(&mut self) -> Vec<PendingStore> {
        std::mem::take(&mut self.pending_stores)
    }
}
