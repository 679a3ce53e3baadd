//! Core-Shared State.
//!
//! Everything the hardware threads of one core share lives in a single
//! [`SharedCore`] block. Thread 0 allocates it (and performs the core-global
//! reset); every other thread holds an `Arc` clone. This module provides:
//! 1. **Global System Registers:** Atomic storage for registers 16-63.
//! 2. **TLB Store:** The shared table behind a reader/writer lock.
//! 3. **Lock Arbiters:** The TLB and k0 arbiters.
//! 4. **Counters:** The shadow generation and the processor cycle counter.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering, fence};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::common::constants::MAX_THREADS;
use crate::common::{HexError, Result};
use crate::core::arch::sreg::{
    self, CFGBASE, EVB, Field, GLOBAL_START, MODECTL, MODECTL_E, NUM_GLOBAL_SREGS, PCYCLEHI,
    PCYCLELO, REV, SYSCFG, SYSCFG_PCYCLEEN,
};
use crate::core::lock::{LockArbiter, LockKind};
use crate::core::units::mmu::tlb::TlbStore;

/// Boot-time parameters of a core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreParams {
    /// Number of hardware threads (1..=8).
    pub thread_count: usize,
    /// Initial `EVB`; every thread starts here after reset.
    pub boot_vector: u32,
    /// Physical address of the configuration table.
    pub cfgtable_base: u32,
    /// Value of the `REV` register.
    pub rev: u32,
    /// Slots in each thread's translation shadow.
    pub shadow_tlb_size: usize,
}

impl Default for CoreParams {
    fn default() -> Self {
        Self {
            thread_count: 6,
            boot_vector: 0,
            cfgtable_base: 0xd800_0000,
            rev: 0x8d68,
            shadow_tlb_size: 64,
        }
    }
}

impl CoreParams {
    /// Checks the parameters a core can be built from.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Config`] if the thread count is outside `1..=8`, the
    /// shadow size is zero or the boot vector is not word aligned.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_THREADS).contains(&self.thread_count) {
            return Err(HexError::Config(format!(
                "thread_count must be between 1 and {MAX_THREADS}, got {}",
                self.thread_count
            )));
        }
        if self.shadow_tlb_size == 0 {
            return Err(HexError::Config("shadow_tlb_size must be non-zero".into()));
        }
        if self.boot_vector & 3 != 0 {
            return Err(HexError::Config(format!(
                "boot_vector {:#x} is not word aligned",
                self.boot_vector
            )));
        }
        Ok(())
    }
}

/// Global system registers (numbers 16-63).
pub struct GlobalSregs {
    regs: [AtomicU32; NUM_GLOBAL_SREGS],
}

impl std::fmt::Debug for GlobalSregs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalSregs")
            .field("evb", &format_args!("{:#010x}", self.get(EVB)))
            .field("modectl", &format_args!("{:#010x}", self.get(MODECTL)))
            .field("syscfg", &format_args!("{:#010x}", self.get(SYSCFG)))
            .finish_non_exhaustive()
    }
}

impl Default for GlobalSregs {
    fn default() -> Self {
        Self {
            regs: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }
}

impl GlobalSregs {
    /// Storage for `reg`, or `None` outside the global range.
    #[inline]
    fn slot(&self, reg: usize) -> Option<&AtomicU32> {
        reg.checked_sub(GLOBAL_START).and_then(|i| self.regs.get(i))
    }

    /// Reads a global register; numbers outside 16-63 read as zero.
    pub fn get(&self, reg: usize) -> u32 {
        self.slot(reg).map_or(0, |r| r.load(Ordering::SeqCst))
    }

    /// Writes a global register; numbers outside 16-63 are ignored.
    pub fn set(&self, reg: usize, val: u32) {
        if let Some(r) = self.slot(reg) {
            r.store(val, Ordering::SeqCst);
            fence(Ordering::SeqCst);
        }
    }

    /// Atomically ORs bits into a register and returns the previous value.
    pub fn fetch_or(&self, reg: usize, bits: u32) -> u32 {
        let prev = self.slot(reg).map_or(0, |r| r.fetch_or(bits, Ordering::SeqCst));
        fence(Ordering::SeqCst);
        prev
    }

    /// Atomically ANDs a mask into a register and returns the previous value.
    pub fn fetch_and(&self, reg: usize, mask: u32) -> u32 {
        let prev = self.slot(reg).map_or(0, |r| r.fetch_and(mask, Ordering::SeqCst));
        fence(Ordering::SeqCst);
        prev
    }

    /// Reads one field of a register.
    pub fn field(&self, reg: usize, field: Field) -> u32 {
        field.get(self.get(reg))
    }

    /// Atomically replaces one field of a register and returns the previous register value.
    pub fn set_field(&self, reg: usize, field: Field, val: u32) -> u32 {
        let prev = self.slot(reg).map_or(0, |r| {
            r.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |old| Some(field.set(old, val)))
                .unwrap_or_else(|old| old)
        });
        fence(Ordering::SeqCst);
        prev
    }

    /// Zeroes every global register.
    pub fn clear(&self) {
        for r in &self.regs {
            r.store(0, Ordering::SeqCst);
        }
        fence(Ordering::SeqCst);
    }

    /// Returns a copy of all register values.
    pub fn snapshot(&self) -> Vec<u32> {
        self.regs.iter().map(|r| r.load(Ordering::SeqCst)).collect()
    }

    /// Overwrites all registers from `words`.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::ImageSize`] unless `words` holds exactly one value
    /// per global register. Nothing is written in that case.
    pub fn restore(&self, words: &[u32]) -> Result<()> {
        if words.len() != NUM_GLOBAL_SREGS {
            return Err(HexError::ImageSize {
                what: "global system registers",
                expected: NUM_GLOBAL_SREGS,
                actual: words.len(),
            });
        }
        for (r, &w) in self.regs.iter().zip(words) {
            r.store(w, Ordering::SeqCst);
        }
        fence(Ordering::SeqCst);
        Ok(())
    }
}

/// State shared by every hardware thread of a core.
#[derive(Debug)]
pub struct SharedCore {
    params: CoreParams,
    tlb: RwLock<TlbStore>,
    /// Global system registers.
    pub globals: GlobalSregs,
    /// Arbiter for the TLB lock.
    pub tlb_lock: LockArbiter,
    /// Arbiter for the kernel lock.
    pub k0_lock: LockArbiter,
    shadow_generation: AtomicU64,
    pcycle: AtomicU64,
}

impl SharedCore {
    /// Allocates the shared block and performs the core-global reset.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Config`] if `params` does not validate.
    pub fn new(params: CoreParams) -> Result<Self> {
        params.validate()?;
        let core = Self {
            params,
            tlb: RwLock::new(TlbStore::new()),
            globals: GlobalSregs::default(),
            tlb_lock: LockArbiter::new(LockKind::Tlb, params.thread_count),
            k0_lock: LockArbiter::new(LockKind::K0, params.thread_count),
            shadow_generation: AtomicU64::new(0),
            pcycle: AtomicU64::new(0),
        };
        core.reset();
        Ok(core)
    }

    /// Core-global reset.
    ///
    /// Zeroes the TLB, the global registers and the cycle counter, then
    /// programs the boot vector, configuration base and revision. Only thread 0
    /// is enabled afterwards.
    pub fn reset(&self) {
        self.tlb_mut().reset();
        self.globals.clear();
        self.pcycle.store(0, Ordering::SeqCst);
        self.globals.set(EVB, self.params.boot_vector);
        self.globals.set(CFGBASE, self.params.cfgtable_base >> 16);
        self.globals.set(REV, self.params.rev);
        self.globals.set(MODECTL, MODECTL_E.set(0, 1));
        self.invalidate_shadows();
        debug!(
            target: "hexsim::reset",
            evb = format_args!("{:#010x}", self.params.boot_vector),
            rev = format_args!("{:#06x}", self.params.rev),
            threads = self.params.thread_count,
            "core reset"
        );
    }

    /// Returns the boot parameters.
    pub const fn params(&self) -> &CoreParams {
        &self.params
    }

    /// Returns the number of hardware threads.
    pub const fn thread_count(&self) -> usize {
        self.params.thread_count
    }

    /// Returns the arbiter for a lock.
    pub const fn arbiter(&self, kind: LockKind) -> &LockArbiter {
        match kind {
            LockKind::Tlb => &self.tlb_lock,
            LockKind::K0 => &self.k0_lock,
        }
    }

    /// Read access to the TLB.
    pub fn tlb(&self) -> RwLockReadGuard<'_, TlbStore> {
        self.tlb.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the TLB.
    pub fn tlb_mut(&self) -> RwLockWriteGuard<'_, TlbStore> {
        self.tlb.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current shadow generation.
    pub fn generation(&self) -> u64 {
        self.shadow_generation.load(Ordering::SeqCst)
    }

    /// Invalidates every thread's translation shadow.
    pub fn invalidate_shadows(&self) {
        let _ = self.shadow_generation.fetch_add(1, Ordering::SeqCst);
        fence(Ordering::SeqCst);
    }

    /// Returns the 64-bit processor cycle counter.
    pub fn pcycle(&self) -> u64 {
        self.pcycle.load(Ordering::SeqCst)
    }

    /// Overwrites the processor cycle counter.
    pub fn set_pcycle(&self, val: u64) {
        self.pcycle.store(val, Ordering::SeqCst);
    }

    /// Advances the cycle counter if `SYSCFG.PCYCLEEN` is set.
    pub fn tick(&self, cycles: u64) {
        if self.globals.field(SYSCFG, SYSCFG_PCYCLEEN) != 0 {
            let _ = self.pcycle.fetch_add(cycles, Ordering::SeqCst);
        }
    }

    /// Reads a global register, resolving the cycle-counter halves.
    pub fn read_global(&self, reg: usize) -> u32 {
        match reg {
            PCYCLELO => self.pcycle() as u32,
            PCYCLEHI => (self.pcycle() >> 32) as u32,
            _ => self.globals.get(reg),
        }
    }

    /// Writes a global register.
    ///
    /// `REV` is read-only. The `SYSCFG` lock bits are owned by the arbiters
    /// and survive the write. Toggling `SYSCFG.MMUEN` invalidates the
    /// translation shadows.
    pub fn write_global(&self, reg: usize, val: u32) {
        match reg {
            REV => {}
            PCYCLELO => self.set_pcycle((self.pcycle() & !0xffff_ffff) | u64::from(val)),
            PCYCLEHI => self.set_pcycle((self.pcycle() & 0xffff_ffff) | (u64::from(val) << 32)),
            SYSCFG => {
                let locks = sreg::SYSCFG_TLBLOCK.in_place() | sreg::SYSCFG_K0LOCK.in_place();
                let old = self.globals.get(SYSCFG);
                let _ = self.globals.fetch_and(SYSCFG, locks);
                let _ = self.globals.fetch_or(SYSCFG, val & !locks);
                if (old ^ val) & sreg::SYSCFG_MMUEN.in_place() != 0 {
                    self.invalidate_shadows();
                }
            }
            _ => self.globals.set(reg, val),
        }
    }
}
