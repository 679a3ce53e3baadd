//! Core state snapshots.
//!
//! A [`CoreSnapshot`] captures every piece of architectural state a core
//! holds: the raw TLB words, the global and per-thread system registers, the
//! register files and the lock states. TLB entries are stored as the exact
//! 64-bit words the guest wrote; nothing is decoded or recomputed.

use serde::{Deserialize, Serialize};

use crate::common::Result;

/// State of one hardware thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    /// Program counter.
    pub pc: u32,
    /// Per-thread system registers 0-15.
    pub sregs: Vec<u32>,
    /// Little-endian register file image (GPRs, predicates, vectors).
    pub regs: Vec<u8>,
    /// TLB lock state.
    pub tlb_lock: u8,
    /// k0 lock state.
    pub k0_lock: u8,
}

/// State of a whole core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreSnapshot {
    /// Raw TLB entry words in index order.
    pub tlb: Vec<u64>,
    /// Global system registers 16-63.
    pub globals: Vec<u32>,
    /// Processor cycle counter.
    pub pcycle: u64,
    /// Per-thread state in thread-id order.
    pub threads: Vec<ThreadSnapshot>,
}

impl CoreSnapshot {
    /// Serialises the snapshot to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Json`](crate::common::HexError::Json) if serialisation fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::Json`](crate::common::HexError::Json) for malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
