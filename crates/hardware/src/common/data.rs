//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the emulator.
//! These types are used for the following:
//! 1. **Permission Validation:** Checking execute/read/write permissions against TLB entries.
//! 2. **Fault Generation:** Selecting the TLB-miss event and the precise permission cause code.
//! 3. **Privilege Selection:** Choosing the MMU index that gates user-page access.

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Instruction fetch access. Requires execute (X) permission.
    Fetch,

    /// Data read access. Requires read (R) permission.
    Read,

    /// Data write access. Requires write (W) permission.
    Write,
}

/// Privilege level used to gate a translation.
///
/// Derived from `SYSCFG.MMUEN` and the `SSR.EX`/`SSR.UM`/`SSR.GM` bits; see
/// [`CpuMode`](crate::core::arch::mode::CpuMode).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MmuIdx {
    /// User-mode access: pages without the U bit are denied.
    User = 0,
    /// Guest-mode access: per-entry R/W/X apply, U is ignored.
    Guest = 1,
    /// Monitor/kernel access: always granted full rights.
    Kernel = 2,
}

/// Access rights granted by a translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Protection(u8);

impl Protection {
    /// Read permission bit.
    pub const READ: u8 = 1 << 0;
    /// Write permission bit.
    pub const WRITE: u8 = 1 << 1;
    /// Execute permission bit.
    pub const EXEC: u8 = 1 << 2;

    /// No rights at all.
    pub const NONE: Self = Self(0);
    /// Read, write and execute.
    pub const ALL: Self = Self(Self::READ | Self::WRITE | Self::EXEC);

    /// Builds a protection value from individual rights.
    pub const fn new(read: bool, write: bool, exec: bool) -> Self {
        Self(
            (if read { Self::READ } else { 0 })
                | (if write { Self::WRITE } else { 0 })
                | (if exec { Self::EXEC } else { 0 }),
        )
    }

    /// Returns the raw permission bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if the readable bit is set.
    pub const fn can_read(self) -> bool {
        self.0 & Self::READ != 0
    }

    /// Returns true if the writable bit is set.
    pub const fn can_write(self) -> bool {
        self.0 & Self::WRITE != 0
    }

    /// Returns true if the executable bit is set.
    pub const fn can_exec(self) -> bool {
        self.0 & Self::EXEC != 0
    }

    /// Returns true if these rights satisfy `access`.
    pub const fn allows(self, access: AccessType) -> bool {
        match access {
            AccessType::Fetch => self.can_exec(),
            AccessType::Read => self.can_read(),
            AccessType::Write => self.can_write(),
        }
    }
}
