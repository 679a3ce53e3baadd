//! Hexagon CPU Modes.
//!
//! This module defines the execution modes of a hardware thread and how they
//! map onto MMU permission classes. It implements the following:
//! 1. **Mode Classification:** User, Guest and Monitor modes.
//! 2. **Derivation:** Computing the mode from `SSR` and `SYSCFG`.
//! 3. **Observability:** Human-readable naming and display formatting.

use crate::common::MmuIdx;
use crate::core::arch::sreg::{SSR_EX, SSR_GM, SSR_UM, SYSCFG_MMUEN};

/// Hexagon execution modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CpuMode {
    /// Unprivileged application code.
    User = 0,

    /// Guest operating system.
    Guest = 1,

    /// Monitor (hypervisor) mode, also entered on every exception.
    Monitor = 2,
}

impl CpuMode {
    /// Derives the mode from the `SSR` register.
    ///
    /// An active exception always runs in monitor mode; otherwise `UM` wins over
    /// `GM`.
    pub const fn from_ssr(ssr: u32) -> Self {
        if SSR_EX.is_set(ssr) {
            Self::Monitor
        } else if SSR_UM.is_set(ssr) {
            Self::User
        } else if SSR_GM.is_set(ssr) {
            Self::Guest
        } else {
            Self::Monitor
        }
    }

    /// Returns the human-readable name of the mode.
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Guest => "Guest",
            Self::Monitor => "Monitor",
        }
    }
}

impl std::fmt::Display for CpuMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Selects the MMU permission class for a thread.
///
/// With translation disabled every access runs with kernel rights.
///
/// # Arguments
///
/// * `ssr` - The thread's supervisor status register.
/// * `syscfg` - The core's system configuration register.
pub const fn mmu_index(ssr: u32, syscfg: u32) -> MmuIdx {
    if !SYSCFG_MMUEN.is_set(syscfg) {
        return MmuIdx::Kernel;
    }
    match CpuMode::from_ssr(ssr) {
        CpuMode::User => MmuIdx::User,
        CpuMode::Guest => MmuIdx::Guest,
        CpuMode::Monitor => MmuIdx::Kernel,
    }
}
