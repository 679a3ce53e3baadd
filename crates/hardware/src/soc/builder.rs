//! Core construction and the top-level `HexCore` type.
//!
//! This module assembles a complete core from configuration. It performs:
//! 1. **Construction:** Thread 0 allocates the shared block; the remaining
//!    threads are realized against it in order.
//! 2. **Dispatch:** Delivering latched exceptions, including the core-wide
//!    broadcast of imprecise events.
//! 3. **Lifecycle:** `start`/`resume` across threads, full reset and cycle accounting.
//! 4. **Persistence:** Capturing and restoring [`CoreSnapshot`]s.

use std::sync::Arc;

use tracing::{debug, info};

use crate::common::reg::REGISTER_IMAGE_BYTES;
use crate::common::{HexError, Result};
use crate::config::Config;
use crate::core::arch::sreg::{GLOBAL_START, NUM_GLOBAL_SREGS};
use crate::core::cpu::{Dispatch, HexThread};
use crate::core::lock::LockState;
use crate::core::shared::{CoreParams, SharedCore};
use crate::soc::snapshot::{CoreSnapshot, ThreadSnapshot};
use crate::soc::traits::{NullShim, SyscallShim};
use crate::stats::CoreStats;

/// A Hexagon core: its hardware threads and the system-call shim.
pub struct HexCore {
    threads: Vec<HexThread>,
    shim: Box<dyn SyscallShim>,
}

impl std::fmt::Debug for HexCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HexCore")
            .field("threads", &self.threads.len())
            .field("shared", self.shared())
            .finish_non_exhaustive()
    }
}

impl HexCore {
    /// Builds a core from resolved parameters with a [`NullShim`].
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Config`] if `params` does not validate.
    pub fn new(params: CoreParams) -> Result<Self> {
        let primary = HexThread::new_primary(params)?;
        let shared = Arc::clone(primary.shared());
        let mut threads = Vec::with_capacity(params.thread_count);
        threads.push(primary);
        for tid in 1..params.thread_count {
            threads.push(HexThread::new_secondary(tid, &shared)?);
        }
        info!(
            target: "hexsim::reset",
            threads = params.thread_count,
            rev = format_args!("{:#06x}", params.rev),
            "core built"
        );
        Ok(Self {
            threads,
            shim: Box::new(NullShim),
        })
    }

    /// Builds a core from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Config`] if the configuration does not validate.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.to_params()?)
    }

    /// Replaces the system-call shim.
    #[must_use]
    pub fn with_shim(mut self, shim: Box<dyn SyscallShim>) -> Self {
        self.shim = shim;
        self
    }

    /// Shared core state.
    pub fn shared(&self) -> &Arc<SharedCore> {
        self.threads[0].shared()
    }

    /// Number of hardware threads.
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Returns a thread.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::InvalidThread`] for an id beyond the thread count.
    pub fn thread(&self, tid: usize) -> Result<&HexThread> {
        let count = self.threads.len();
        self.threads.get(tid).ok_or(HexError::InvalidThread { tid, count })
    }

    /// Returns a thread mutably.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::InvalidThread`] for an id beyond the thread count.
    pub fn thread_mut(&mut self, tid: usize) -> Result<&mut HexThread> {
        let count = self.threads.len();
        self.threads.get_mut(tid).ok_or(HexError::InvalidThread { tid, count })
    }

    /// Iterates over all threads.
    pub fn threads(&self) -> impl Iterator<Item = &HexThread> {
        self.threads.iter()
    }

    /// Delivers the exception latched by thread `tid`.
    ///
    /// Imprecise events are fanned out to every thread that is running or
    /// waiting, the raising thread included.
    ///
    /// # Errors
    ///
    /// Propagates the fatal errors of [`HexThread::do_interrupt`].
    pub fn dispatch(&mut self, tid: usize) -> Result<Dispatch> {
        let count = self.threads.len();
        let thread = self
            .threads
            .get_mut(tid)
            .ok_or(HexError::InvalidThread { tid, count })?;
        let result = thread.do_interrupt(self.shim.as_mut())?;
        if let Dispatch::Broadcast { cause } = result {
            let _ = self.broadcast_imprecise(cause);
        }
        Ok(result)
    }

    /// Redirects every running or waiting thread to the imprecise vector.
    ///
    /// # Returns
    ///
    /// The ids of the redirected threads.
    pub fn broadcast_imprecise(&mut self, cause: u32) -> Vec<usize> {
        let mut redirected = Vec::new();
        for thread in &mut self.threads {
            if thread.is_enabled() || thread.is_waiting() {
                let _ = thread.enter_imprecise(cause);
                redirected.push(thread.tid());
            }
        }
        debug!(target: "hexsim::int", cause = format_args!("{cause:#x}"), ?redirected, "imprecise broadcast");
        redirected
    }

    /// Executes `start(mask)` on behalf of thread `tid`; newly started threads soft-reset.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::InvalidThread`] for an unknown `tid`.
    pub fn start(&mut self, tid: usize, mask: u32) -> Result<u32> {
        let started = self.thread_mut(tid)?.start(mask);
        for thread in &mut self.threads {
            if started & (1 << thread.tid()) != 0 {
                thread.soft_reset();
            }
        }
        Ok(started)
    }

    /// Executes `resume(mask)` on behalf of thread `tid`.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::InvalidThread`] for an unknown `tid`.
    pub fn resume(&mut self, tid: usize, mask: u32) -> Result<()> {
        self.thread_mut(tid)?.resume(mask);
        Ok(())
    }

    /// Ids of the threads that may execute their next packet.
    pub fn runnable_threads(&self) -> Vec<usize> {
        self.threads
            .iter()
            .filter(|t| t.is_runnable())
            .map(HexThread::tid)
            .collect()
    }

    /// Advances the processor cycle counter.
    pub fn tick(&self, cycles: u64) {
        self.shared().tick(cycles);
    }

    /// Core-global reset followed by every thread's reset.
    pub fn full_reset(&mut self) {
        self.shared().reset();
        for thread in &mut self.threads {
            thread.reset();
        }
    }

    /// Statistics summed over all threads.
    pub fn stats(&self) -> CoreStats {
        self.threads.iter().map(HexThread::stats).fold(CoreStats::default(), |a, b| a + b)
    }

    /// Captures the complete architectural state.
    pub fn snapshot(&self) -> CoreSnapshot {
        let shared = self.shared();
        CoreSnapshot {
            tlb: shared.tlb().raw_entries(),
            globals: shared.globals.snapshot(),
            pcycle: shared.pcycle(),
            threads: self
                .threads
                .iter()
                .map(|t| ThreadSnapshot {
                    pc: t.pc,
                    sregs: t.sregs.as_words().to_vec(),
                    regs: t.regs.to_le_bytes(),
                    tlb_lock: t.shared().tlb_lock.state(t.tid()) as u8,
                    k0_lock: t.shared().k0_lock.state(t.tid()) as u8,
                })
                .collect(),
        }
    }

    /// Restores state captured by [`HexCore::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`HexError::ImageSize`] if the snapshot does not match this
    /// core's geometry. Nothing is modified in that case.
    pub fn restore(&mut self, snap: &CoreSnapshot) -> Result<()> {
        if snap.threads.len() != self.threads.len() {
            return Err(HexError::ImageSize {
                what: "thread list",
                expected: self.threads.len(),
                actual: snap.threads.len(),
            });
        }
        if snap.globals.len() != NUM_GLOBAL_SREGS {
            return Err(HexError::ImageSize {
                what: "global system registers",
                expected: NUM_GLOBAL_SREGS,
                actual: snap.globals.len(),
            });
        }
        let mut sregs = Vec::with_capacity(snap.threads.len());
        for t in &snap.threads {
            let words: [u32; GLOBAL_START] = t.sregs.as_slice().try_into().map_err(|_| HexError::ImageSize {
                what: "thread system registers",
                expected: GLOBAL_START,
                actual: t.sregs.len(),
            })?;
            if t.regs.len() != REGISTER_IMAGE_BYTES {
                return Err(HexError::ImageSize {
                    what: "register file",
                    expected: REGISTER_IMAGE_BYTES,
                    actual: t.regs.len(),
                });
            }
            sregs.push(words);
        }

        let shared = Arc::clone(self.shared());
        shared.tlb_mut().load_raw_entries(&snap.tlb)?;
        shared.globals.restore(&snap.globals)?;
        shared.set_pcycle(snap.pcycle);
        for ((thread, t), words) in self.threads.iter_mut().zip(&snap.threads).zip(sregs) {
            thread.pc = t.pc;
            thread.sregs.load_words(words);
            thread.regs.load_le_bytes(&t.regs)?;
            thread.exception = None;
            thread.pending_stores.clear();
            shared.tlb_lock.set_state(thread.tid(), LockState::from_u8(t.tlb_lock));
            shared.k0_lock.set_state(thread.tid(), LockState::from_u8(t.k0_lock));
            thread.mmu.shadow.flush();
        }
        shared.invalidate_shadows();
        debug!(target: "hexsim::reset", threads = self.threads.len(), "snapshot restored");
        Ok(())
    }
}
