//! Core statistics collection and reporting.
//!
//! This module tracks privileged-path activity for each hardware thread. It provides:
//! 1. **Translation:** Shadow hits/misses, TLB misses and permission faults.
//! 2. **Exceptions:** Exceptions taken and double exceptions.
//! 3. **Locking:** Contended acquires of the TLB and k0 locks.
//!
//! Per-thread counters are summed with `+` to obtain core totals.

use std::fmt;
use std::ops::{Add, AddAssign};

/// Per-thread statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreStats {
    /// Translations served by the shadow.
    pub shadow_hits: u64,
    /// Translations that needed a TLB scan.
    pub shadow_misses: u64,
    /// Translations that found no entry.
    pub tlb_misses: u64,
    /// Translations denied by entry permissions.
    pub perm_faults: u64,
    /// Exceptions and interrupts delivered to a handler.
    pub exceptions_taken: u64,
    /// Exceptions escalated to `DOUBLE_EXCEPT`.
    pub double_exceptions: u64,
    /// Lock acquires that had to wait.
    pub lock_contentions: u64,
}

impl CoreStats {
    /// Returns the shadow hit rate in percent (0 when there were no lookups).
    pub fn shadow_hit_rate(&self) -> f64 {
        let total = self.shadow_hits + self.shadow_misses;
        if total == 0 {
            0.0
        } else {
            self.shadow_hits as f64 / total as f64 * 100.0
        }
    }
}

impl Add for CoreStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            shadow_hits: self.shadow_hits + rhs.shadow_hits,
            shadow_misses: self.shadow_misses + rhs.shadow_misses,
            tlb_misses: self.tlb_misses + rhs.tlb_misses,
            perm_faults: self.perm_faults + rhs.perm_faults,
            exceptions_taken: self.exceptions_taken + rhs.exceptions_taken,
            double_exceptions: self.double_exceptions + rhs.double_exceptions,
            lock_contentions: self.lock_contentions + rhs.lock_contentions,
        }
    }
}

impl AddAssign for CoreStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for CoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "HEXAGON CORE STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(
            f,
            "  shadow.hits            {} ({:.2}%)",
            self.shadow_hits,
            self.shadow_hit_rate()
        )?;
        writeln!(f, "  shadow.misses          {}", self.shadow_misses)?;
        writeln!(f, "  tlb.misses             {}", self.tlb_misses)?;
        writeln!(f, "  tlb.perm_faults        {}", self.perm_faults)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "  exceptions.taken       {}", self.exceptions_taken)?;
        writeln!(f, "  exceptions.double      {}", self.double_exceptions)?;
        writeln!(f, "  locks.contended        {}", self.lock_contentions)
    }
}
