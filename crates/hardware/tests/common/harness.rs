//! Test Harness.
//!
//! `TestContext` wraps a fully built [`HexCore`] and offers shortcuts for the
//! state most tests need to arrange: running (non-exception) threads, MMU
//! enable, user/guest mode and TLB contents.

use hexsim_core::HexCore;
use hexsim_core::core::CoreParams;
use hexsim_core::core::HexThread;
use hexsim_core::core::arch::sreg::{
    MODECTL, MODECTL_E, SSR, SSR_ASID, SSR_EX, SSR_GM, SSR_UM, SYSCFG, SYSCFG_MMUEN,
};
use hexsim_core::core::units::mmu::entry::{PageSize, TlbEntry};
use tracing_subscriber::EnvFilter;

/// Exception vector base used by every harness core.
pub const TEST_EVB: u32 = 0x0010_0000;

/// Installs a test-writer subscriber once per process. `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Core parameters for a harness core with `threads` hardware threads.
pub fn params(threads: usize) -> CoreParams {
    CoreParams {
        thread_count: threads,
        boot_vector: TEST_EVB,
        ..CoreParams::default()
    }
}

/// A readable, writable, executable user page.
pub fn rwx_user(va: u32, pa: u64, size: PageSize, asid: u8) -> TlbEntry {
    TlbEntry::new(va, pa, size, asid).with_perms(true, true, true, true)
}

pub struct TestContext {
    pub core: HexCore,
}

impl TestContext {
    pub fn new(threads: usize) -> Self {
        init_tracing();
        let core = HexCore::new(params(threads)).expect("harness core");
        Self { core }
    }

    pub fn thread(&mut self, tid: usize) -> &mut HexThread {
        self.core.thread_mut(tid).expect("thread exists")
    }

    /// Enables every thread and clears the reset exception so each one runs
    /// at `pc` in monitor mode.
    pub fn running(threads: usize, pc: u32) -> Self {
        let mut ctx = Self::new(threads);
        let mask = (1u32 << threads) - 1;
        ctx.core.shared().globals.set(MODECTL, MODECTL_E.set(0, mask));
        for tid in 0..threads {
            let t = ctx.thread(tid);
            t.sregs.set_field(SSR, SSR_EX, 0);
            t.pc = pc;
        }
        ctx
    }

    pub fn enable_mmu(&mut self) {
        let syscfg = self.core.shared().read_global(SYSCFG);
        self.thread(0).write_sreg(SYSCFG, SYSCFG_MMUEN.set(syscfg, 1));
    }

    /// Puts `tid` into user mode on `asid`.
    pub fn enter_user(&mut self, tid: usize, asid: u8) {
        let t = self.thread(tid);
        t.sregs.set_field(SSR, SSR_UM, 1);
        t.sregs.set_field(SSR, SSR_ASID, u32::from(asid));
    }

    /// Puts `tid` into guest mode on `asid`.
    pub fn enter_guest(&mut self, tid: usize, asid: u8) {
        let t = self.thread(tid);
        t.sregs.set_field(SSR, SSR_UM, 0);
        t.sregs.set_field(SSR, SSR_GM, 1);
        t.sregs.set_field(SSR, SSR_ASID, u32::from(asid));
    }

    pub fn write_entry(&mut self, index: u32, entry: TlbEntry) {
        self.thread(0).tlb_write(index, entry.raw());
    }
}
