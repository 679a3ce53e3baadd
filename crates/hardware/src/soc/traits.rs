//! System-call shim interface.
//!
//! Plain `trap0`/`trap1` instructions (cause 0) are forwarded to a host-side
//! shim that emulates the guest's system calls. This module defines:
//! 1. **Trap Entry:** The status snapshot handed to the shim.
//! 2. **Shim Trait:** `SyscallShim`, implemented by the host.
//! 3. **Null Shim:** A shim that ignores every call.

use crate::common::RegisterFile;
use crate::core::cpu::TrapType;

/// Status snapshot at trap entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapEntry {
    /// Which trap instruction was executed.
    pub trap: TrapType,
    /// Cause code of the trap (always 0 for forwarded calls).
    pub cause: u32,
    /// `SSR` at the time of the trap.
    pub ssr: u32,
    /// PC of the trapping packet.
    pub pc: u32,
}

/// Host-side handler for guest system calls.
///
/// The shim may read and write the calling thread's general registers to pass
/// arguments and results.
pub trait SyscallShim {
    /// Handles a plain `trap0` or `trap1`.
    fn handle_trap(&mut self, regs: &mut RegisterFile, entry: TrapEntry);
}

/// A shim that ignores every system call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullShim;

impl SyscallShim for NullShim {
    fn handle_trap(&mut self, _regs: &mut RegisterFile, _entry: TrapEntry) {}
}
