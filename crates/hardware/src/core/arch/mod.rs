//! Hexagon architecture-specific components.
//!
//! This module contains the architectural state of a hardware thread.
//! It includes the following modules:
//! 1. **GPRs:** General-purpose register file.
//! 2. **Vector Registers:** HVX register file.
//! 3. **Modes:** CPU mode definitions and MMU class selection.
//! 4. **System Registers:** Register numbers, packed field layout and per-thread storage.
//! 5. **Traps:** Event types and cause codes.

/// General-purpose register file implementation.
pub mod gpr;

/// CPU mode definitions.
pub mod mode;

/// System register definitions.
pub mod sreg;

/// Exception event types and cause codes.
pub mod trap;

/// HVX vector register file.
pub mod vreg;
