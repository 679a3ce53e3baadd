//! HVX Vector Register File.
//!
//! Storage for the 32 vector registers of a hardware thread. The core never
//! interprets vector contents; it only zeroes them on reset and exposes raw
//! bytes to the persistence layer.

use crate::common::constants::{NUM_VREGS, VREG_BYTES};

/// Vector register file (`v0`-`v31`, 128 bytes each).
#[derive(Clone, Debug)]
pub struct VectorRegs {
    regs: Box<[[u8; VREG_BYTES]; NUM_VREGS]>,
}

impl Default for VectorRegs {
    fn default() -> Self {
        Self {
            regs: Box::new([[0; VREG_BYTES]; NUM_VREGS]),
        }
    }
}

impl VectorRegs {
    /// Returns the bytes of register `idx`.
    pub fn read(&self, idx: usize) -> &[u8; VREG_BYTES] {
        &self.regs[idx]
    }

    /// Overwrites register `idx`.
    pub fn write(&mut self, idx: usize, val: &[u8; VREG_BYTES]) {
        self.regs[idx] = *val;
    }

    /// Zeroes all vector registers.
    pub fn clear(&mut self) {
        for reg in self.regs.iter_mut() {
            *reg = [0; VREG_BYTES];
        }
    }
}
