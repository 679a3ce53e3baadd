//! Core assembly and external collaborators.
//!
//! This module organizes what sits around the hardware threads: the
//! top-level `HexCore`, the system-call shim interface and state snapshots.

/// Core construction and the top-level `HexCore` type.
pub mod builder;

/// Core state snapshots.
pub mod snapshot;

/// System-call shim interface.
pub mod traits;

pub use builder::HexCore;
