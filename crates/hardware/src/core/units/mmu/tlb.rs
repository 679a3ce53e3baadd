//! Shared TLB Store.
//!
//! The Hexagon TLB is a flat, software-managed table of 192 packed entries
//! shared by every hardware thread of a core. It is not a cache of a page
//! table: the guest fill handler writes entries explicitly by index. This
//! module implements:
//! 1. **Indexed Access:** `read`/`write` with the architectural index normalisation.
//! 2. **Translation Lookup:** First-match scan by virtual address and ASID.
//! 3. **Software Probe:** `lookup_by_asid`, which detects multiple matches.
//! 4. **Overlap Check:** Interval intersection used before inserting an entry.
//! 5. **Raw Images:** Bit-exact little-endian persistence of the whole table.

use tracing::{debug, trace};

use super::entry::TlbEntry;
use crate::common::constants::{NUM_TLB_ENTRIES, TLB_INDEX_SPACE, TLB_NOT_FOUND};
use crate::common::{HexError, Result};

/// Size in bytes of a raw TLB image.
pub const TLB_IMAGE_BYTES: usize = NUM_TLB_ENTRIES * 8;

/// Maps a guest-supplied index onto a slot.
///
/// The index is first reduced modulo the power-of-two index space, then any
/// value past the last slot wraps back by one capacity.
#[inline]
pub const fn normalize_index(index: u32) -> usize {
    let idx = index as usize & (TLB_INDEX_SPACE - 1);
    if idx >= NUM_TLB_ENTRIES {
        idx - NUM_TLB_ENTRIES
    } else {
        idx
    }
}

/// Result of a software probe (`tlbp`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsidLookup {
    /// Exactly one entry matched.
    Hit(usize),
    /// No entry matched.
    Miss,
    /// Two or more entries matched; an imprecise exception must be raised.
    MultiMatch,
}

impl AsidLookup {
    /// Returns the guest-visible probe result: the index, or the not-found sentinel.
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Hit(index) => index as u32,
            Self::Miss | Self::MultiMatch => TLB_NOT_FOUND,
        }
    }
}

/// Result of an overlap check against a candidate entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlap {
    /// Exactly one stored entry intersects the candidate.
    Single(usize),
    /// No stored entry intersects the candidate.
    None,
    /// Two or more stored entries intersect the candidate.
    Multiple,
}

impl Overlap {
    /// Returns the guest-visible encoding: the index, `-2` for none, `-1` for several.
    pub const fn to_raw(self) -> i32 {
        match self {
            Self::Single(index) => index as i32,
            Self::None => -2,
            Self::Multiple => -1,
        }
    }
}

/// The shared 192-entry translation table.
#[derive(Clone, PartialEq, Eq)]
pub struct TlbStore {
    entries: Box<[TlbEntry; NUM_TLB_ENTRIES]>,
}

impl Default for TlbStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TlbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let valid = self.entries.iter().filter(|e| e.is_valid()).count();
        write!(f, "TlbStore {{ valid: {valid}/{NUM_TLB_ENTRIES} }}")
    }
}

impl TlbStore {
    /// Creates a table with every entry invalid.
    pub fn new() -> Self {
        Self {
            entries: Box::new([TlbEntry::INVALID; NUM_TLB_ENTRIES]),
        }
    }

    /// Invalidates every entry.
    pub fn reset(&mut self) {
        self.entries.fill(TlbEntry::INVALID);
    }

    /// Returns the stored word at a (normalised) index.
    #[inline]
    pub fn read(&self, index: u32) -> u64 {
        self.entries[normalize_index(index)].raw()
    }

    /// Returns the entry at a slot.
    #[inline]
    pub fn entry(&self, slot: usize) -> TlbEntry {
        self.entries[slot]
    }

    /// Stores a raw word at a (normalised) index.
    ///
    /// # Returns
    ///
    /// The entry that was replaced, so the caller can decide whether cached
    /// translations must be dropped.
    pub fn write(&mut self, index: u32, value: u64) -> TlbEntry {
        let slot = normalize_index(index);
        let old = std::mem::replace(&mut self.entries[slot], TlbEntry::from_raw(value));
        if old.is_valid() {
            debug!(target: "hexsim::mmu", index = slot, "replacing {old} with {}", self.entries[slot]);
        } else {
            trace!(target: "hexsim::mmu", index = slot, "write {}", self.entries[slot]);
        }
        old
    }

    /// Iterates over all slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, TlbEntry)> + '_ {
        self.entries.iter().copied().enumerate()
    }

    /// Returns the first entry that covers `va` for `asid`.
    ///
    /// Multiple matches are not detected here; under correct guest behaviour
    /// the match is unique.
    pub fn find_match(&self, va: u32, asid: u8) -> Option<(usize, TlbEntry)> {
        self.iter().find(|(_, e)| e.matches(va, asid))
    }

    /// Software probe: finds the entry covering `va` for `asid` and verifies it is unique.
    pub fn lookup_by_asid(&self, asid: u8, va: u32) -> AsidLookup {
        let mut found = AsidLookup::Miss;
        for (slot, entry) in self.iter() {
            if !entry.matches(va, asid) {
                continue;
            }
            if found != AsidLookup::Miss {
                debug!(target: "hexsim::mmu", asid, va = format_args!("{va:#010x}"), "multiple TLB matches");
                return AsidLookup::MultiMatch;
            }
            found = AsidLookup::Hit(slot);
        }
        found
    }

    /// Counts stored entries whose virtual interval intersects the candidate's.
    ///
    /// A stored entry is considered when both it and the candidate are valid
    /// and either the ASIDs match or one of the two is global. `index` is the
    /// slot the guest intends to write and is used for diagnostics only.
    pub fn check_overlap(&self, candidate: TlbEntry, index: u32) -> Overlap {
        if !candidate.is_valid() {
            return Overlap::None;
        }
        let mut result = Overlap::None;
        for (slot, entry) in self.iter() {
            let shared_space = entry.is_global() || candidate.is_global() || entry.asid() == candidate.asid();
            if !entry.is_valid() || !shared_space {
                continue;
            }
            if !entry.intersects(candidate) {
                continue;
            }
            result = match result {
                Overlap::None => Overlap::Single(slot),
                Overlap::Single(_) | Overlap::Multiple => Overlap::Multiple,
            };
        }
        trace!(
            target: "hexsim::mmu",
            index = normalize_index(index),
            result = result.to_raw(),
            "overlap check for {candidate}"
        );
        result
    }

    /// Returns the raw entry words in index order.
    pub fn raw_entries(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.raw()).collect()
    }

    /// Replaces the whole table from raw words.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::ImageSize`] unless exactly 192 words are supplied.
    pub fn load_raw_entries(&mut self, words: &[u64]) -> Result<()> {
        if words.len() != NUM_TLB_ENTRIES {
            return Err(HexError::ImageSize {
                what: "TLB",
                expected: NUM_TLB_ENTRIES,
                actual: words.len(),
            });
        }
        for (slot, &word) in self.entries.iter_mut().zip(words) {
            *slot = TlbEntry::from_raw(word);
        }
        Ok(())
    }

    /// Serialises the table as little-endian 64-bit words.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.entries.iter().flat_map(|e| e.raw().to_le_bytes()).collect()
    }

    /// Restores the table from a little-endian image.
    ///
    /// # Errors
    ///
    /// Returns [`HexError::ImageSize`] if the image is not exactly
    /// [`TLB_IMAGE_BYTES`] long; the table is left untouched.
    pub fn load_le_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != TLB_IMAGE_BYTES {
            return Err(HexError::ImageSize {
                what: "TLB",
                expected: TLB_IMAGE_BYTES,
                actual: bytes.len(),
            });
        }
        for (slot, chunk) in self.entries.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *slot = TlbEntry::from_raw(u64::from_le_bytes(word));
        }
        Ok(())
    }
}
