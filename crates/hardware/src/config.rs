//! Configuration system for the Hexagon core emulator.
//!
//! This module defines the configuration structures used to build a core. It provides:
//! 1. **Defaults:** Baseline boot and sizing constants.
//! 2. **Structures:** `Config` with `general` and `machine` sections.
//! 3. **Machine Presets:** `MachineKind`, which fixes revision, thread count and
//!    configuration-table base for a known part.
//!
//! Configuration is supplied as JSON (see [`Config::from_json`]) or built with
//! `Config::default()`. [`Config::to_params`] validates it and resolves presets
//! into the [`CoreParams`] consumed by the core.

use serde::Deserialize;

use crate::common::Result;
use crate::core::shared::CoreParams;

/// Default configuration constants for the core.
mod defaults {
    /// Boot vector; `EVB` after reset and the first PC of every thread.
    pub const BOOT_VECTOR: u32 = 0x0000_0000;

    /// Physical base of the configuration table on every supported part.
    pub const CFGTABLE_BASE: u32 = 0xd800_0000;

    /// Slots in each thread's translation shadow.
    pub const SHADOW_TLB_SIZE: usize = 64;
}

/// Known Hexagon parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum MachineKind {
    /// V66 with 1 MiB L2, four threads.
    #[serde(alias = "v66g_1024")]
    V66g1024,
    /// V68 with 1 MiB L2, six threads.
    #[default]
    #[serde(alias = "v68n_1024")]
    V68n1024,
    /// V69 with 1 MiB L2, six threads.
    #[serde(alias = "v69na_1024")]
    V69na1024,
    /// V73 with 1 MiB L2, six threads.
    #[serde(alias = "v73na_1024")]
    V73na1024,
}

impl MachineKind {
    /// Returns the value of the `REV` register.
    pub const fn rev(self) -> u32 {
        match self {
            Self::V66g1024 => 0x8d66,
            Self::V68n1024 => 0x8d68,
            Self::V69na1024 => 0x8c69,
            Self::V73na1024 => 0x8c73,
        }
    }

    /// Returns the default hardware thread count.
    pub const fn thread_count(self) -> usize {
        match self {
            Self::V66g1024 => 4,
            Self::V68n1024 | Self::V69na1024 | Self::V73na1024 => 6,
        }
    }

    /// Returns the configuration-table base address.
    pub const fn cfgtable_base(self) -> u32 {
        defaults::CFGTABLE_BASE
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use hexsim_core::config::{Config, MachineKind};
///
/// let json = r#"{
///     "machine": { "kind": "V73na1024", "thread_count": 2, "boot_vector": 4096 },
///     "general": { "shadow_tlb_size": 32 }
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.machine.kind, MachineKind::V73na1024);
/// let params = config.to_params().unwrap();
/// assert_eq!(params.thread_count, 2);
/// assert_eq!(params.rev, 0x8c73);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Emulator-side settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Part selection and boot parameters.
    #[serde(default)]
    pub machine: MachineConfig,
}

/// Emulator-side settings that do not affect architectural state.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Slots in each thread's translation shadow (rounded up to a power of two).
    #[serde(default = "GeneralConfig::default_shadow_tlb_size")]
    pub shadow_tlb_size: usize,
}

impl GeneralConfig {
    /// Returns the default shadow size.
    fn default_shadow_tlb_size() -> usize {
        defaults::SHADOW_TLB_SIZE
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            shadow_tlb_size: defaults::SHADOW_TLB_SIZE,
        }
    }
}

/// Part selection and boot parameters.
///
/// Unset overrides fall back to the [`MachineKind`] preset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineConfig {
    /// Part preset.
    #[serde(default)]
    pub kind: MachineKind,
    /// Hardware thread count override.
    #[serde(default)]
    pub thread_count: Option<usize>,
    /// Boot vector.
    #[serde(default)]
    pub boot_vector: u32,
    /// Configuration-table base override.
    #[serde(default)]
    pub cfgtable_base: Option<u32>,
    /// `REV` override.
    #[serde(default)]
    pub rev: Option<u32>,
}

impl Config {
    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Json`](crate::common::HexError::Json) for malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the configuration and resolves presets.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Config`](crate::common::HexError::Config) if the thread count is outside `1..=8`, the
    /// shadow size is zero or the boot vector is not word aligned.
    pub fn to_params(&self) -> Result<CoreParams> {
        let m = &self.machine;
        let params = CoreParams {
            thread_count: m.thread_count.unwrap_or_else(|| m.kind.thread_count()),
            boot_vector: m.boot_vector,
            cfgtable_base: m.cfgtable_base.unwrap_or_else(|| m.kind.cfgtable_base()),
            rev: m.rev.unwrap_or_else(|| m.kind.rev()),
            shadow_tlb_size: self.general.shadow_tlb_size,
        };
        params.validate()?;
        Ok(params)
    }
}
