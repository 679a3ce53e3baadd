//! Unified Register File.
//!
//! This module provides the `RegisterFile` struct, which groups the per-thread
//! user-visible registers. It provides:
//! 1. **Unified Storage:** General, predicate and vector registers of one hardware thread.
//! 2. **Abstraction:** A single set of methods for reading and writing register values.
//! 3. **Persistence:** Raw little-endian images for the state persistence layer.

use crate::common::constants::{NUM_GPRS, NUM_PREDS, NUM_VREGS, VREG_BYTES};
use crate::common::error::{HexError, Result};
use crate::core::arch::gpr::Gpr;
use crate::core::arch::vreg::VectorRegs;

/// Byte length of [`RegisterFile::to_le_bytes`].
pub const REGISTER_IMAGE_BYTES: usize = NUM_GPRS * 4 + NUM_PREDS + NUM_VREGS * VREG_BYTES;

/// Register file containing the general, predicate and vector registers of one thread.
#[derive(Clone, Debug, Default)]
pub struct RegisterFile {
    gpr: Gpr,
    preds: [u8; NUM_PREDS],
    vregs: VectorRegs,
}

impl RegisterFile {
    /// Creates a new register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a general-purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    pub fn read(&self, idx: usize) -> u32 {
        self.gpr.read(idx)
    }

    /// Writes a general-purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 32-bit value to write.
    pub fn write(&mut self, idx: usize, val: u32) {
        self.gpr.write(idx, val);
    }

    /// Reads predicate register `p{idx}`.
    pub fn read_pred(&self, idx: usize) -> u8 {
        self.preds[idx]
    }

    /// Writes predicate register `p{idx}`.
    pub fn write_pred(&mut self, idx: usize, val: u8) {
        self.preds[idx] = val;
    }

    /// Returns the bytes of vector register `v{idx}`.
    pub fn read_v(&self, idx: usize) -> &[u8; VREG_BYTES] {
        self.vregs.read(idx)
    }

    /// Overwrites vector register `v{idx}`.
    pub fn write_v(&mut self, idx: usize, val: &[u8; VREG_BYTES]) {
        self.vregs.write(idx, val);
    }

    /// Zeroes every register.
    pub fn clear(&mut self) {
        self.gpr.clear();
        self.preds = [0; NUM_PREDS];
        self.vregs.clear();
    }

    /// Serialises the register file as GPRs, then predicates, then vector registers.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(REGISTER_IMAGE_BYTES);
        for i in 0..NUM_GPRS {
            out.extend_from_slice(&self.gpr.read(i).to_le_bytes());
        }
        out.extend_from_slice(&self.preds);
        for i in 0..NUM_VREGS {
            out.extend_from_slice(self.vregs.read(i));
        }
        out
    }

    /// Restores the register file from an image produced by [`Self::to_le_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`HexError::ImageSize`] if `bytes` is not exactly
    /// [`REGISTER_IMAGE_BYTES`] long.
    pub fn load_le_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != REGISTER_IMAGE_BYTES {
            return Err(HexError::ImageSize {
                what: "register file",
                expected: REGISTER_IMAGE_BYTES,
                actual: bytes.len(),
            });
        }
        let (gprs, rest) = bytes.split_at(NUM_GPRS * 4);
        let (preds, vregs) = rest.split_at(NUM_PREDS);
        for (i, word) in gprs.chunks_exact(4).enumerate() {
            self.gpr
                .write(i, u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
        }
        self.preds.copy_from_slice(preds);
        for (i, chunk) in vregs.chunks_exact(VREG_BYTES).enumerate() {
            let mut v = [0u8; VREG_BYTES];
            v.copy_from_slice(chunk);
            self.vregs.write(i, &v);
        }
        Ok(())
    }

    /// Dumps the general-purpose registers through the `tracing` debug channel.
    pub fn dump(&self) {
        self.gpr.dump();
    }
}
