//! Lock Instruction Tests.
//!
//! The thread-level view of the arbiter: which instructions advance the PC,
//! how a contended thread is parked and how handoff makes it runnable.

use hexsim_core::core::lock::{Acquire, LockKind, LockState, Release};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::TestContext;

const PC: u32 = 0x0000_2000;
const NEXT: u32 = PC + 4;

#[rstest]
#[case(LockKind::Tlb)]
#[case(LockKind::K0)]
fn acquire_wait_release_handoff(#[case] kind: LockKind) {
    let mut ctx = TestContext::running(2, PC);

    assert_eq!(ctx.thread(0).lock_acquire(kind, NEXT), Acquire::Acquired);
    assert_eq!(ctx.thread(0).pc, NEXT);

    assert_eq!(ctx.thread(1).lock_acquire(kind, NEXT), Acquire::Contended);
    assert_eq!(ctx.thread(1).pc, PC);
    assert!(!ctx.thread(1).is_runnable());
    assert_eq!(ctx.core.runnable_threads(), vec![0]);

    assert_eq!(ctx.thread(0).lock_release(kind, NEXT + 4), Release::HandedOff(1));
    assert_eq!(ctx.thread(0).pc, NEXT + 4);
    assert_eq!(ctx.thread(1).lock_state(kind), LockState::Owner);
    assert!(ctx.thread(1).is_runnable());

    // The woken thread re-executes its lock instruction and moves on.
    assert_eq!(ctx.thread(1).lock_acquire(kind, NEXT), Acquire::AlreadyOwner);
    assert_eq!(ctx.thread(1).pc, NEXT);
}

#[test]
fn named_instructions_pick_their_lock() {
    let mut ctx = TestContext::running(2, PC);
    assert_eq!(ctx.thread(0).tlblock(NEXT), Acquire::Acquired);
    assert_eq!(ctx.thread(1).k0lock(NEXT), Acquire::Acquired);
    assert_eq!(ctx.thread(0).lock_state(LockKind::K0), LockState::Unlocked);
    assert_eq!(ctx.thread(1).k0unlock(NEXT), Release::Released);
    assert_eq!(ctx.thread(0).tlbunlock(NEXT), Release::Released);
}

#[test]
fn unlock_by_non_owner_still_advances() {
    let mut ctx = TestContext::running(2, PC);
    let _ = ctx.thread(0).tlblock(NEXT);
    assert_eq!(ctx.thread(1).tlbunlock(NEXT), Release::NotOwner);
    assert_eq!(ctx.thread(1).pc, NEXT);
    assert_eq!(ctx.core.shared().tlb_lock.owner(), Some(0));
}

#[test]
fn contention_is_counted() {
    let mut ctx = TestContext::running(3, PC);
    let _ = ctx.thread(0).k0lock(NEXT);
    let _ = ctx.thread(1).k0lock(NEXT);
    let _ = ctx.thread(2).k0lock(NEXT);
    assert_eq!(ctx.core.stats().lock_contentions, 2);
}
