//! Global Core Constants.
//!
//! This module defines core-wide constants used across the emulator. It includes:
//! 1. **Paging Constants:** Page granule, offsets and masks for translation.
//! 2. **TLB Geometry:** Entry count and the probe sentinel returned by `tlbp`.
//! 3. **Register File Geometry:** GPR, predicate, vector and system register counts.

/// Number of bits to shift to convert between bytes and 4 KiB pages.
pub const PAGE_SHIFT: u32 = 12;

/// Smallest page size in bytes (4 KiB).
pub const PAGE_SIZE: u64 = 1 << PAGE_SHIFT;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: u32 = (PAGE_SIZE - 1) as u32;

/// Number of entries in the shared, software-managed TLB.
pub const NUM_TLB_ENTRIES: usize = 192;

/// Index space of the TLB as seen by `tlbw`/`tlbr` (next power of two above the entry count).
pub const TLB_INDEX_SPACE: usize = NUM_TLB_ENTRIES.next_power_of_two();

/// Value returned by a TLB probe when no entry matches.
pub const TLB_NOT_FOUND: u32 = 0x8000_0000;

/// Number of 32-bit general-purpose registers per hardware thread.
pub const NUM_GPRS: usize = 32;

/// Number of 8-bit predicate registers per hardware thread.
pub const NUM_PREDS: usize = 4;

/// Number of vector registers per hardware thread.
pub const NUM_VREGS: usize = 32;

/// Width of one vector register in bytes (1024-bit HVX mode).
pub const VREG_BYTES: usize = 128;

/// Total system register space (per-thread and global).
pub const NUM_SREGS: usize = 64;

/// Maximum number of hardware threads in one core.
pub const MAX_THREADS: usize = 8;

/// Size of one instruction word; trap instructions always occupy a solo packet of one word.
pub const INSTRUCTION_SIZE: u32 = 4;
