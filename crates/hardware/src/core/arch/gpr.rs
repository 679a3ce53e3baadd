//! Hexagon General-Purpose Register File.
//!
//! This module implements the 32 general-purpose registers (`r0`-`r31`) of a
//! hardware thread. There is no hardwired zero register; `r29`,
//! `r30` and `r31` double as SP, FP and LR by convention only.

use tracing::debug;

use crate::common::constants::NUM_GPRS;

/// General-Purpose Register file.
#[derive(Clone, Debug, Default)]
pub struct Gpr {
    regs: [u32; NUM_GPRS],
}

impl Gpr {
    /// Creates a new register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a general-purpose register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    pub fn read(&self, idx: usize) -> u32 {
        self.regs[idx]
    }

    /// Writes a value to a general-purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 32-bit value to write.
    pub fn write(&mut self, idx: usize, val: u32) {
        self.regs[idx] = val;
    }

    /// Zeroes all registers.
    pub fn clear(&mut self) {
        self.regs = [0; NUM_GPRS];
    }

    /// Dumps the register contents in pairs at debug level.
    pub fn dump(&self) {
        for i in (0..NUM_GPRS).step_by(2) {
            debug!(
                target: "hexsim::regs",
                "r{:<2}={:#010x} r{:<2}={:#010x}",
                i,
                self.regs[i],
                i + 1,
                self.regs[i + 1]
            );
        }
    }
}
