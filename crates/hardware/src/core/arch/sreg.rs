//! System Register definitions.
//!
//! This module describes the Hexagon system register space. It provides:
//! 1. **Register Numbers:** Per-thread registers (0-15) and global registers (16-63).
//! 2. **Field Layout:** `Field` descriptors for the packed `SSR`, `SYSCFG` and `MODECTL` words.
//! 3. **Register Storage:** `ThreadSregs`, the private register block of one hardware thread.
//!
//! Packed registers are plain integers with named bit ranges; nothing relies on
//! compiler bitfield layout, so raw images stay bit-exact.

use crate::common::constants::NUM_SREGS;

/// Scratch register 0.
pub const SGP0: usize = 0;
/// Scratch register 1.
pub const SGP1: usize = 1;
/// Software thread id.
pub const STID: usize = 2;
/// Exception link register (resume PC).
pub const ELR: usize = 3;
/// Faulting virtual address from slot 0.
pub const BADVA0: usize = 4;
/// Faulting virtual address from slot 1.
pub const BADVA1: usize = 5;
/// Supervisor status register.
pub const SSR: usize = 6;
/// Core control register.
pub const CCR: usize = 7;
/// Hardware thread id (read-only).
pub const HTID: usize = 8;
/// Merged bad virtual address, selected by `SSR.BVS`.
pub const BADVA: usize = 9;
/// Per-thread interrupt mask.
pub const IMASK: usize = 10;
/// Guest exception vector base.
pub const GEVB: usize = 11;

/// First global (core-shared) register number.
pub const GLOBAL_START: usize = 16;
/// Number of global registers.
pub const NUM_GLOBAL_SREGS: usize = NUM_SREGS - GLOBAL_START;

/// Exception vector base.
pub const EVB: usize = 16;
/// Thread enable/wait mode control.
pub const MODECTL: usize = 17;
/// System configuration.
pub const SYSCFG: usize = 18;
/// Interrupt pending and auto-disable.
pub const IPENDAD: usize = 20;
/// Vectored interrupt id.
pub const VID: usize = 21;
/// Vectored interrupt id, second controller.
pub const VID1: usize = 22;
/// Best-wait priority.
pub const BESTWAIT: usize = 23;
/// Scheduler configuration.
pub const SCHEDCFG: usize = 25;
/// Configuration table base (physical address >> 16).
pub const CFGBASE: usize = 27;
/// Diagnostic register; holds the superseded cause on a double exception.
pub const DIAG: usize = 28;
/// Core revision id.
pub const REV: usize = 29;
/// Processor cycle counter, low word.
pub const PCYCLELO: usize = 30;
/// Processor cycle counter, high word.
pub const PCYCLEHI: usize = 31;

/// Returns true if `reg` is one of the per-thread registers.
pub const fn is_thread_local(reg: usize) -> bool {
    reg < GLOBAL_START
}

/// A bit range inside a 32-bit packed register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Position of the least significant bit.
    pub shift: u32,
    /// Width in bits (1..=32).
    pub width: u32,
}

impl Field {
    /// Creates a field descriptor.
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    /// Returns the unshifted value mask.
    pub const fn mask(self) -> u32 {
        ((1u64 << self.width) - 1) as u32
    }

    /// Returns the field mask positioned inside the register.
    pub const fn in_place(self) -> u32 {
        self.mask() << self.shift
    }

    /// Extracts the field from `reg`.
    pub const fn get(self, reg: u32) -> u32 {
        (reg >> self.shift) & self.mask()
    }

    /// Returns `reg` with the field replaced by `val` (truncated to the field width).
    pub const fn set(self, reg: u32, val: u32) -> u32 {
        (reg & !self.in_place()) | ((val & self.mask()) << self.shift)
    }

    /// Returns true if a one-bit field is set.
    pub const fn is_set(self, reg: u32) -> bool {
        self.get(reg) != 0
    }
}

/// `SSR.CAUSE`: cause code of the last exception taken.
pub const SSR_CAUSE: Field = Field::new(0, 8);
/// `SSR.ASID`: current address space id.
pub const SSR_ASID: Field = Field::new(8, 8);
/// `SSR.UM`: user mode.
pub const SSR_UM: Field = Field::new(16, 1);
/// `SSR.EX`: exception active.
pub const SSR_EX: Field = Field::new(17, 1);
/// `SSR.IE`: interrupts enabled.
pub const SSR_IE: Field = Field::new(18, 1);
/// `SSR.GM`: guest mode.
pub const SSR_GM: Field = Field::new(19, 1);
/// `SSR.V0`: `BADVA0` holds a valid address.
pub const SSR_V0: Field = Field::new(20, 1);
/// `SSR.V1`: `BADVA1` holds a valid address.
pub const SSR_V1: Field = Field::new(21, 1);
/// `SSR.BVS`: `BADVA` reads return `BADVA1` when set.
pub const SSR_BVS: Field = Field::new(22, 1);

/// `SYSCFG.MMUEN`: address translation enabled.
pub const SYSCFG_MMUEN: Field = Field::new(0, 1);
/// `SYSCFG.ICEN`: instruction cache enabled.
pub const SYSCFG_ICEN: Field = Field::new(1, 1);
/// `SYSCFG.DCEN`: data cache enabled.
pub const SYSCFG_DCEN: Field = Field::new(2, 1);
/// `SYSCFG.GIE`: global interrupt enable.
pub const SYSCFG_GIE: Field = Field::new(4, 1);
/// `SYSCFG.PCYCLEEN`: cycle counter enabled.
pub const SYSCFG_PCYCLEEN: Field = Field::new(6, 1);
/// `SYSCFG.TLBLOCK`: the shared TLB lock is held.
pub const SYSCFG_TLBLOCK: Field = Field::new(11, 1);
/// `SYSCFG.K0LOCK`: the kernel (k0) lock is held.
pub const SYSCFG_K0LOCK: Field = Field::new(12, 1);

/// `MODECTL.E`: per-thread enable bits.
pub const MODECTL_E: Field = Field::new(0, 8);
/// `MODECTL.W`: per-thread wait bits.
pub const MODECTL_W: Field = Field::new(16, 8);

/// Private system registers of one hardware thread (numbers 0-15).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreadSregs {
    regs: [u32; GLOBAL_START],
}

impl ThreadSregs {
    /// Reads a per-thread register without side effects.
    pub const fn get(&self, reg: usize) -> u32 {
        self.regs[reg]
    }

    /// Writes a per-thread register without side effects.
    pub const fn set(&mut self, reg: usize, val: u32) {
        self.regs[reg] = val;
    }

    /// Replaces one field of a per-thread register.
    pub const fn set_field(&mut self, reg: usize, field: Field, val: u32) {
        self.regs[reg] = field.set(self.regs[reg], val);
    }

    /// Zeroes every register.
    pub const fn clear(&mut self) {
        self.regs = [0; GLOBAL_START];
    }

    /// Returns the raw register words.
    pub const fn as_words(&self) -> &[u32; GLOBAL_START] {
        &self.regs
    }

    /// Overwrites all registers from raw words.
    pub const fn load_words(&mut self, words: [u32; GLOBAL_START]) {
        self.regs = words;
    }
}
