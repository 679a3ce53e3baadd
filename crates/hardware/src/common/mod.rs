//! Common utilities and types used throughout the Hexagon core emulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the emulator. It includes:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Constants:** Core-wide constants for paging, the TLB and register files.
//! 3. **Memory Access:** Access types, MMU indices and protection bits.
//! 4. **Error Handling:** Host errors, MMU faults and translation results.
//! 5. **Register Management:** The per-thread GPR, predicate and vector register file.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the emulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types and translation results.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{NUM_TLB_ENTRIES, PAGE_SHIFT, TLB_NOT_FOUND};
pub use data::{AccessType, MmuIdx, Protection};
pub use error::{HexError, MmuFault, Result, Translation};
pub use reg::RegisterFile;
