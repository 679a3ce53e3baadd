//! Core processor implementation.
//!
//! This module contains the privileged model of a Hexagon core: the
//! architectural state of each hardware thread, the MMU, the state the threads
//! share and the cross-thread lock arbiter.

/// Architecture-specific components (system registers, register files, modes, events).
pub mod arch;

/// Hardware thread implementation (exceptions, dispatch, TLB access, lifecycle).
pub mod cpu;

/// Cross-thread TLB and k0 lock arbiter.
pub mod lock;

/// State shared by all hardware threads of a core.
pub mod shared;

/// Functional units (MMU).
pub mod units;

pub use self::cpu::HexThread;
pub use self::shared::{CoreParams, SharedCore};
