//! Exception Event Types and Cause Codes.
//!
//! Hexagon classifies every exception in two levels: an **event type** that
//! selects the vector (`EVB | event << 2`) and a **cause code** that is written
//! to `SSR.CAUSE` and is only meaningful within its event type. This module
//! provides:
//! 1. **Event Classification:** The `Event` enum with its architectural numbering.
//! 2. **Cause Codes:** The `cause` constants understood by the dispatcher.

use std::fmt;

/// Architectural exception event types.
///
/// The numeric value (see [`Event::code`]) doubles as the priority ordinal when
/// several exceptions are registered in one packet: lower wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Hardware or software reset.
    Reset,
    /// Imprecise, core-wide event (NMI, multiple TLB match).
    Imprecise,
    /// Precise exception pinned to the faulting packet.
    Precise,
    /// Instruction-fetch TLB miss.
    TlbMissX,
    /// Data load/store TLB miss.
    TlbMissRw,
    /// `trap0` instruction.
    Trap0,
    /// `trap1` instruction.
    Trap1,
    /// Floating-point trap.
    FpTrap,
    /// Debug event (single-step).
    Debug,
    /// External interrupt line 0..=15.
    Interrupt(u8),
}

impl Event {
    /// Returns the architectural event number.
    pub const fn code(self) -> u32 {
        match self {
            Self::Reset => 0x0,
            Self::Imprecise => 0x1,
            Self::Precise => 0x2,
            Self::TlbMissX => 0x4,
            Self::TlbMissRw => 0x6,
            Self::Trap0 => 0x8,
            Self::Trap1 => 0x9,
            Self::FpTrap => 0xb,
            Self::Debug => 0xc,
            Self::Interrupt(n) => 0x10 + (n & 0xf) as u32,
        }
    }

    /// Decodes an architectural event number.
    ///
    /// # Returns
    ///
    /// `None` for reserved numbers (0x3, 0x5, 0x7, 0xa, 0xd-0xf, >= 0x20).
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x0 => Self::Reset,
            0x1 => Self::Imprecise,
            0x2 => Self::Precise,
            0x4 => Self::TlbMissX,
            0x6 => Self::TlbMissRw,
            0x8 => Self::Trap0,
            0x9 => Self::Trap1,
            0xb => Self::FpTrap,
            0xc => Self::Debug,
            0x10..=0x1f => Self::Interrupt((code - 0x10) as u8),
            _ => return None,
        })
    }

    /// Returns the human-readable event name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reset => "RESET",
            Self::Imprecise => "IMPRECISE",
            Self::Precise => "PRECISE",
            Self::TlbMissX => "TLB_MISS_X",
            Self::TlbMissRw => "TLB_MISS_RW",
            Self::Trap0 => "TRAP0",
            Self::Trap1 => "TRAP1",
            Self::FpTrap => "FPTRAP",
            Self::Debug => "DEBUG",
            Self::Interrupt(_) => "INT",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt(n) => write!(f, "INT{n:X}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Cause codes written to `SSR.CAUSE`.
pub mod cause {
    /// Reset.
    pub const RESET: u32 = 0x000;
    /// Precise bus error.
    pub const BIU_PRECISE: u32 = 0x001;
    /// 64-byte HVX mode not supported.
    pub const UNSUPPORTED_HVX_64B: u32 = 0x002;
    /// Exception raised while `SSR.EX` was already set.
    pub const DOUBLE_EXCEPT: u32 = 0x003;
    /// Fetch from a page without execute permission.
    pub const FETCH_NO_XPAGE: u32 = 0x011;
    /// User-mode fetch from a page without the user bit.
    pub const FETCH_NO_UPAGE: u32 = 0x012;
    /// Invalid packet or opcode.
    pub const INVALID_OPCODE: u32 = 0x015;
    /// Coprocessor instruction while the coprocessor is disabled.
    pub const NO_COPROC_ENABLE: u32 = 0x016;
    /// Second coprocessor instruction while it is disabled.
    pub const NO_COPROC2_ENABLE: u32 = 0x018;
    /// Guest-only instruction executed in user mode.
    pub const PRIV_USER_NO_GINSN: u32 = 0x01a;
    /// Supervisor-only instruction executed in user mode.
    pub const PRIV_USER_NO_SINSN: u32 = 0x01b;
    /// Two writes to the same register in one packet.
    pub const REG_WRITE_CONFLICT: u32 = 0x01d;
    /// Branch target not aligned.
    pub const PC_NOT_ALIGNED: u32 = 0x01e;
    /// Misaligned load.
    pub const MISALIGNED_LOAD: u32 = 0x020;
    /// Misaligned store.
    pub const MISALIGNED_STORE: u32 = 0x021;
    /// Load from a page without read permission.
    pub const PRIV_NO_READ: u32 = 0x022;
    /// Store to a page without write permission.
    pub const PRIV_NO_WRITE: u32 = 0x023;
    /// User-mode load from a page without the user bit.
    pub const PRIV_NO_UREAD: u32 = 0x024;
    /// User-mode store to a page without the user bit.
    pub const PRIV_NO_UWRITE: u32 = 0x025;
    /// Coprocessor load/store fault.
    pub const COPROC_LDST: u32 = 0x026;
    /// Stack limit violation.
    pub const STACK_LIMIT: u32 = 0x027;
    /// Vector window control miss.
    pub const VWCTRL_WINDOW_MISS: u32 = 0x029;
    /// Non-maskable interrupt.
    pub const IMPRECISE_NMI: u32 = 0x043;
    /// More than one TLB entry matched a translation.
    pub const IMPRECISE_MULTI_TLB_MATCH: u32 = 0x044;
    /// Fetch TLB miss inside the current packet's page.
    pub const TLBMISSX_NORMAL: u32 = 0x060;
    /// Fetch TLB miss on the page following the current packet.
    pub const TLBMISSX_NEXTPAGE: u32 = 0x061;
    /// Load TLB miss.
    pub const TLBMISSRW_READ: u32 = 0x070;
    /// Store TLB miss.
    pub const TLBMISSRW_WRITE: u32 = 0x071;
    /// Single-step debug event.
    pub const DEBUG_SINGLESTEP: u32 = 0x080;
    /// Floating-point exception flagged by `USR`.
    pub const FPTRAP_BADFLOAT: u32 = 0x0bf;
    /// Interrupt 0; interrupt `n` uses `INT0 + n`.
    pub const INT0: u32 = 0x0c0;

    /// Returns the cause code reported for interrupt line `n`.
    pub const fn interrupt(n: u8) -> u32 {
        INT0 + (n & 0xf) as u32
    }
}
