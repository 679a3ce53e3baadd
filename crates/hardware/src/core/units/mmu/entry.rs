//! Packed TLB Entry.
//!
//! A Hexagon TLB entry is a single 64-bit word. This module provides accessors
//! over that word with named bit ranges, so that the raw value written by the
//! guest is exactly what is stored, read back and serialized.
//!
//! Layout (bit ranges are `[lo, hi)`):
//!
//! | Bits    | Field | Meaning                                              |
//! |---------|-------|------------------------------------------------------|
//! | 0..24   | PPD   | Physical page descriptor; lowest set bit = size class |
//! | 24..28  | C     | Cacheability attribute                               |
//! | 28      | U     | User accessible                                      |
//! | 29      | R     | Readable                                             |
//! | 30      | W     | Writable                                             |
//! | 31      | X     | Executable                                           |
//! | 32..52  | VPN   | Virtual page number                                  |
//! | 52..60  | ASID  | Address space id                                     |
//! | 60      | ATR   | Auxiliary attribute                                  |
//! | 61      | PA35  | Physical address bit 35 (PPD extension)              |
//! | 62      | G     | Global (matches any ASID)                            |
//! | 63      | V     | Valid                                                |

use std::fmt;

use crate::common::constants::PAGE_SHIFT;

/// A named bit range inside a TLB entry.
#[derive(Clone, Copy, Debug)]
struct Bits {
    shift: u32,
    width: u32,
}

impl Bits {
    const fn mask(self) -> u64 {
        (1u64 << self.width) - 1
    }

    const fn get(self, raw: u64) -> u64 {
        (raw >> self.shift) & self.mask()
    }

    const fn set(self, raw: u64, val: u64) -> u64 {
        (raw & !(self.mask() << self.shift)) | ((val & self.mask()) << self.shift)
    }
}

const PPD: Bits = Bits { shift: 0, width: 24 };
const CACHE: Bits = Bits { shift: 24, width: 4 };
const USER: Bits = Bits { shift: 28, width: 1 };
const READ: Bits = Bits { shift: 29, width: 1 };
const WRITE: Bits = Bits { shift: 30, width: 1 };
const EXEC: Bits = Bits { shift: 31, width: 1 };
const VPN: Bits = Bits { shift: 32, width: 20 };
const ASID: Bits = Bits { shift: 52, width: 8 };
const ATR: Bits = Bits { shift: 60, width: 1 };
const PA35: Bits = Bits { shift: 61, width: 1 };
const GLOBAL: Bits = Bits { shift: 62, width: 1 };
const VALID: Bits = Bits { shift: 63, width: 1 };

/// Architectural page sizes, 4 KiB through 1 GiB in powers of four.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageSize {
    /// 4 KiB.
    Size4K = 0,
    /// 16 KiB.
    Size16K = 1,
    /// 64 KiB.
    Size64K = 2,
    /// 256 KiB.
    Size256K = 3,
    /// 1 MiB.
    Size1M = 4,
    /// 4 MiB.
    Size4M = 5,
    /// 16 MiB.
    Size16M = 6,
    /// 64 MiB.
    Size64M = 7,
    /// 256 MiB.
    Size256M = 8,
    /// 1 GiB.
    Size1G = 9,
}

impl PageSize {
    /// Every size class in ascending order.
    pub const ALL: [Self; 10] = [
        Self::Size4K,
        Self::Size16K,
        Self::Size64K,
        Self::Size256K,
        Self::Size1M,
        Self::Size4M,
        Self::Size16M,
        Self::Size64M,
        Self::Size256M,
        Self::Size1G,
    ];

    /// Decodes a size class (the PPD lowest-set-bit position).
    pub const fn from_class(class: u32) -> Option<Self> {
        if class < Self::ALL.len() as u32 {
            Some(Self::ALL[class as usize])
        } else {
            None
        }
    }

    /// Returns the size class number.
    pub const fn class(self) -> u32 {
        self as u32
    }

    /// Returns the page size in bytes.
    pub const fn bytes(self) -> u64 {
        (1u64 << PAGE_SHIFT) << (2 * self.class())
    }

    /// Returns the mask selecting the in-page offset.
    pub const fn offset_mask(self) -> u64 {
        self.bytes() - 1
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.bytes();
        if bytes >= 1 << 30 {
            write!(f, "{}G", bytes >> 30)
        } else if bytes >= 1 << 20 {
            write!(f, "{}M", bytes >> 20)
        } else {
            write!(f, "{}K", bytes >> 10)
        }
    }
}

/// One packed 64-bit TLB entry.
///
/// The wrapper never re-encodes: `TlbEntry::from_raw(v).raw() == v` for every `v`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TlbEntry(u64);

impl TlbEntry {
    /// The all-zero (invalid) entry.
    pub const INVALID: Self = Self(0);

    /// Wraps a raw entry word.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw entry word.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Builds a valid, non-global entry with no access rights.
    ///
    /// # Arguments
    ///
    /// * `vaddr` - Virtual base address; bits below the page size are dropped.
    /// * `paddr` - Physical base address (up to 36 bits); bits below the page size are dropped.
    /// * `size` - Page size class.
    /// * `asid` - Owning address space.
    pub const fn new(vaddr: u32, paddr: u64, size: PageSize, asid: u8) -> Self {
        let class = size.class();
        let vpn = (vaddr as u64 & !size.offset_mask()) >> PAGE_SHIFT;
        let pn = (paddr & !size.offset_mask()) >> PAGE_SHIFT;
        let full = ((pn << 1) & !((1u64 << (class + 1)) - 1)) | (1u64 << class);

        let mut raw = VALID.set(0, 1);
        raw = VPN.set(raw, vpn);
        raw = ASID.set(raw, asid as u64);
        raw = PPD.set(raw, full);
        raw = PA35.set(raw, full >> 24);
        Self(raw)
    }

    /// Returns the entry with the R/W/X/U permission bits replaced.
    pub const fn with_perms(self, read: bool, write: bool, exec: bool, user: bool) -> Self {
        let mut raw = READ.set(self.0, read as u64);
        raw = WRITE.set(raw, write as u64);
        raw = EXEC.set(raw, exec as u64);
        raw = USER.set(raw, user as u64);
        Self(raw)
    }

    /// Returns the entry with the global bit replaced.
    pub const fn with_global(self, global: bool) -> Self {
        Self(GLOBAL.set(self.0, global as u64))
    }

    /// Returns the entry with the valid bit replaced.
    pub const fn with_valid(self, valid: bool) -> Self {
        Self(VALID.set(self.0, valid as u64))
    }

    /// Returns the entry with the ASID replaced.
    pub const fn with_asid(self, asid: u8) -> Self {
        Self(ASID.set(self.0, asid as u64))
    }

    /// Returns the entry with the cacheability attribute replaced.
    pub const fn with_cache(self, cache: u8) -> Self {
        Self(CACHE.set(self.0, cache as u64))
    }

    /// Valid bit.
    #[inline]
    pub const fn is_valid(self) -> bool {
        VALID.get(self.0) != 0
    }

    /// Global bit.
    #[inline]
    pub const fn is_global(self) -> bool {
        GLOBAL.get(self.0) != 0
    }

    /// Address space id.
    #[inline]
    pub const fn asid(self) -> u8 {
        ASID.get(self.0) as u8
    }

    /// Virtual page number (4 KiB granularity).
    #[inline]
    pub const fn vpn(self) -> u32 {
        VPN.get(self.0) as u32
    }

    /// Raw physical page descriptor (without PA35).
    #[inline]
    pub const fn ppd(self) -> u32 {
        PPD.get(self.0) as u32
    }

    /// Cacheability attribute.
    pub const fn cache_attr(self) -> u8 {
        CACHE.get(self.0) as u8
    }

    /// Auxiliary attribute bit.
    pub const fn atr(self) -> bool {
        ATR.get(self.0) != 0
    }

    /// User-accessible bit.
    pub const fn user(self) -> bool {
        USER.get(self.0) != 0
    }

    /// Read permission bit.
    pub const fn read(self) -> bool {
        READ.get(self.0) != 0
    }

    /// Write permission bit.
    pub const fn write(self) -> bool {
        WRITE.get(self.0) != 0
    }

    /// Execute permission bit.
    pub const fn exec(self) -> bool {
        EXEC.get(self.0) != 0
    }

    /// Decodes the page size from the PPD's lowest set bit.
    ///
    /// An all-zero PPD is treated as a 4 KiB page. A lowest set bit above the
    /// 1 GiB class has no architectural meaning and yields `None`; such an
    /// entry never matches.
    pub const fn page_size(self) -> Option<PageSize> {
        let ppd = self.ppd();
        if ppd == 0 {
            return Some(PageSize::Size4K);
        }
        PageSize::from_class(ppd.trailing_zeros())
    }

    /// Returns the virtual interval `[start, end)` covered by the entry.
    pub const fn va_range(self) -> Option<(u64, u64)> {
        let Some(size) = self.page_size() else {
            return None;
        };
        let start = ((self.vpn() as u64) << PAGE_SHIFT) & !size.offset_mask();
        Some((start, start + size.bytes()))
    }

    /// Returns the physical base address of the page.
    pub const fn phys_base(self) -> Option<u64> {
        let Some(size) = self.page_size() else {
            return None;
        };
        let full = (PA35.get(self.0) << 24) | PPD.get(self.0);
        Some(((full >> 1) << PAGE_SHIFT) & !size.offset_mask())
    }

    /// Returns true if the entry is valid and covers `va` for `asid`.
    ///
    /// Global entries match every ASID.
    pub const fn matches(self, va: u32, asid: u8) -> bool {
        if !self.is_valid() || !(self.is_global() || self.asid() == asid) {
            return false;
        }
        match self.va_range() {
            Some((start, end)) => (va as u64) >= start && (va as u64) < end,
            None => false,
        }
    }

    /// Returns true if the virtual intervals of `self` and `other` intersect.
    pub const fn intersects(self, other: Self) -> bool {
        match (self.va_range(), other.va_range()) {
            (Some((a_start, a_end)), Some((b_start, b_end))) => a_start < b_end && b_start < a_end,
            _ => false,
        }
    }
}

impl fmt::Debug for TlbEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TlbEntry({:#018x})", self.0)
    }
}

impl fmt::Display for TlbEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "<invalid {:#018x}>", self.0);
        }
        let size = self.page_size();
        let (start, phys) = (self.va_range(), self.phys_base());
        match (size, start, phys) {
            (Some(size), Some((va, _)), Some(pa)) => write!(
                f,
                "va={va:#010x} pa={pa:#011x} size={size} asid={} {}{}{}{}{} c={:#x}",
                self.asid(),
                if self.is_global() { 'G' } else { '-' },
                if self.read() { 'R' } else { '-' },
                if self.write() { 'W' } else { '-' },
                if self.exec() { 'X' } else { '-' },
                if self.user() { 'U' } else { '-' },
                self.cache_attr(),
            ),
            _ => write!(f, "<bad size {:#018x}>", self.0),
        }
    }
}
