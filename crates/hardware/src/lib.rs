//! Hexagon privileged core emulation library.
//!
//! This crate models the privileged execution machinery of a multi-threaded
//! Hexagon DSP core with the following:
//! 1. **MMU:** The shared 192-entry software-managed TLB, translation, probe and overlap check.
//! 2. **Exceptions:** Event/cause classification, registration priority, double
//!    exceptions, vectoring and the core-wide imprecise broadcast.
//! 3. **Locks:** The TLB and k0 lock arbiter with round-robin handoff.
//! 4. **Lifecycle:** Core-global and per-thread reset, start/stop/wait/resume.
//! 5. **Assembly:** Configuration, the top-level `HexCore`, snapshots and statistics.
//!
//! Instruction decoding, memory maps and floating-point arithmetic live
//! outside this crate and drive it through [`HexThread`]'s entry points.

/// Common types and constants (addresses, register file, access types, errors).
pub mod common;
/// Core configuration (defaults, machine presets).
pub mod config;
/// Hardware threads, MMU, shared state and lock arbiter.
pub mod core;
/// Core assembly, system-call shim interface and snapshots.
pub mod soc;
/// Per-thread statistics.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// One hardware thread.
pub use crate::core::HexThread;
/// Top-level core; construct with `HexCore::new` or `HexCore::from_config`.
pub use crate::soc::HexCore;
