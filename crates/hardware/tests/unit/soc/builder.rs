//! Core assembly tests: construction, the shim hook and aggregate statistics.

use hexsim_core::common::{AccessType, HexError};
use hexsim_core::core::arch::sreg::{SSR, SSR_EX};
use hexsim_core::core::arch::trap::Event;
use hexsim_core::core::cpu::{Dispatch, TrapType};
use hexsim_core::HexCore;
use hexsim_core::core::{CoreParams, HexThread, SharedCore};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::{TEST_EVB, TestContext, params};
use crate::common::mocks::MockShim;

#[test]
fn threads_share_one_core_block() {
    let ctx = TestContext::new(3);
    let shared = ctx.core.shared();
    for t in ctx.core.threads() {
        assert!(std::sync::Arc::ptr_eq(t.shared(), shared));
    }
    assert_eq!(ctx.core.thread_count(), 3);
}

#[test]
fn thread_lookup_is_bounds_checked() {
    let ctx = TestContext::new(2);
    assert!(matches!(ctx.core.thread(2), Err(HexError::InvalidThread { tid: 2, count: 2 })));
}

#[rstest]
#[case::no_threads(0)]
#[case::one_past_the_limit(9)]
#[case::far_past_the_limit(64)]
fn out_of_range_thread_counts_are_rejected(#[case] threads: usize) {
    assert!(matches!(HexCore::new(params(threads)), Err(HexError::Config(_))));
    assert!(matches!(HexThread::new_primary(params(threads)), Err(HexError::Config(_))));
    assert!(matches!(SharedCore::new(params(threads)), Err(HexError::Config(_))));
}

#[test]
fn largest_core_builds_every_thread() {
    let mut core = HexCore::new(params(8)).expect("eight threads");
    assert_eq!(core.thread_count(), 8);
    core.full_reset();
    assert_eq!(core.thread(7).expect("thread").tid(), 7);
}

#[rstest]
#[case::zero_shadow(CoreParams { shadow_tlb_size: 0, ..params(2) })]
#[case::unaligned_vector(CoreParams { boot_vector: 0x1002, ..params(2) })]
fn invalid_params_are_rejected(#[case] bad: CoreParams) {
    assert!(matches!(bad.validate(), Err(HexError::Config(_))));
    assert!(matches!(HexCore::new(bad), Err(HexError::Config(_))));
}

#[test]
fn dispatch_routes_trap0_to_installed_shim() {
    let mut shim = MockShim::new();
    let _ = shim.expect_handle_trap().times(1).returning(|regs, entry| regs.write(1, entry.pc));

    let mut core = HexCore::new(params(2)).expect("core").with_shim(Box::new(shim));
    let t = core.thread_mut(1).expect("thread");
    t.sregs.set_field(SSR, SSR_EX, 0);
    t.pc = 0x3000;
    t.register_trap(TrapType::Trap0, 0, 0x3000);

    let result = core.dispatch(1).expect("dispatch");
    assert_eq!(
        result,
        Dispatch::Vectored {
            event: Event::Trap0,
            cause: 0,
            vector: TEST_EVB | (Event::Trap0.code() << 2),
        }
    );
    assert_eq!(core.thread(1).expect("thread").regs.read(1), 0x3000);
}

#[test]
fn stats_sum_over_threads() {
    let mut ctx = TestContext::running(3, 0x100);
    ctx.enable_mmu();
    for tid in 0..3 {
        let _ = ctx.thread(tid).tlb_fill(0x4000_0000, 0, AccessType::Write);
        let _ = ctx.core.dispatch(tid).expect("dispatch");
    }
    let stats = ctx.core.stats();
    assert_eq!(stats.tlb_misses, 3);
    assert_eq!(stats.exceptions_taken, 3);
    assert_eq!(stats.lock_contentions, 2);
}

#[test]
fn tick_advances_cycle_counter_when_enabled() {
    use hexsim_core::core::arch::sreg::{SYSCFG, SYSCFG_PCYCLEEN};

    let mut ctx = TestContext::running(1, 0);
    ctx.core.tick(10);
    assert_eq!(ctx.core.shared().pcycle(), 0);
    ctx.thread(0).write_sreg(SYSCFG, SYSCFG_PCYCLEEN.in_place());
    ctx.core.tick(10);
    assert_eq!(ctx.core.shared().pcycle(), 10);
}
