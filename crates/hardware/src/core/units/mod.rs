//! Functional units of a hardware thread.
//!
//! This module contains the units a thread consults outside its register
//! state. Currently that is the memory management unit with the shared TLB.

/// Memory Management Unit with the shared TLB and per-thread shadow.
pub mod mmu;
