//! Mock implementations of the crate's host-facing traits.

use hexsim_core::common::RegisterFile;
use hexsim_core::soc::traits::{SyscallShim, TrapEntry};
use mockall::mock;

mock! {
    pub Shim {}

    impl SyscallShim for Shim {
        fn handle_trap(&mut self, regs: &mut RegisterFile, entry: TrapEntry);
    }
}
