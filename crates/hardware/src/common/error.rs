//! Error and Translation Result definitions.
//!
//! This module defines the failure modes of the core. It provides:
//! 1. **Host Errors:** `HexError`, raised for conditions that abort emulation
//!    (emulator defects such as an unknown event/cause pair) or reject host input.
//! 2. **MMU Faults:** `MmuFault`, the guest-recoverable outcome of a failed translation.
//! 3. **Translation Results:** The physical address, rights and page size of a hit.

use std::fmt;

use thiserror::Error;

use super::addr::PhysAddr;
use super::data::Protection;

/// Errors surfaced to the host operator.
///
/// Guest-visible conditions (TLB misses, permission faults, double exceptions,
/// imprecise multi-matches) are never reported through this type; they are
/// delivered to the guest as vectored exceptions.
#[derive(Debug, Error)]
pub enum HexError {
    /// An exception was latched with a cause code the event type does not define.
    #[error(
        "thread {tid}: event {event:#x} has unknown cause {cause:#x} \
         (pc={pc:#010x} badva0={badva0:#010x} badva1={badva1:#010x})"
    )]
    UnknownCause {
        /// Hardware thread that latched the exception.
        tid: usize,
        /// Event type number.
        event: u32,
        /// Offending cause code.
        cause: u32,
        /// PC of the faulting packet.
        pc: u32,
        /// Contents of `BADVA0`.
        badva0: u32,
        /// Contents of `BADVA1`.
        badva1: u32,
    },

    /// An event number outside the architectural event table.
    #[error("thread {tid}: unsupported event {event:#x} (cause {cause:#x}) at pc={pc:#010x}")]
    UnknownEvent {
        /// Hardware thread that latched the exception.
        tid: usize,
        /// Raw event number.
        event: u32,
        /// Cause code supplied with the event.
        cause: u32,
        /// PC of the faulting packet.
        pc: u32,
    },

    /// A thread index beyond the core's configured thread count.
    #[error("hardware thread {tid} does not exist (core has {count} threads)")]
    InvalidThread {
        /// Requested thread index.
        tid: usize,
        /// Number of threads in the core.
        count: usize,
    },

    /// A raw state image has the wrong length.
    #[error("{what} image is {actual} bytes, expected {expected}")]
    ImageSize {
        /// Which block the image belongs to.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The configuration is structurally valid JSON but semantically wrong.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration or snapshot could not be parsed.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, HexError>;

/// Reason a translation did not produce a usable mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MmuFault {
    /// No valid entry covers the address for the current ASID.
    Miss,
    /// An entry matched but denied the access; `cause` is the precise cause code.
    Permission {
        /// One of the `FETCH_NO_*` / `PRIV_NO_*` cause codes.
        cause: u32,
    },
}

impl fmt::Display for MmuFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miss => write!(f, "TlbMiss"),
            Self::Permission { cause } => write!(f, "PermissionFault({cause:#x})"),
        }
    }
}

/// Successful virtual-to-physical translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    /// Translated physical address (page base plus in-page offset).
    pub paddr: PhysAddr,
    /// Rights granted for the page at the requested MMU index.
    pub prot: Protection,
    /// Size of the matching page in bytes.
    pub page_size: u64,
}

impl Translation {
    /// Creates a translation result.
    #[inline]
    pub const fn new(paddr: PhysAddr, prot: Protection, page_size: u64) -> Self {
        Self {
            paddr,
            prot,
            page_size,
        }
    }
}
