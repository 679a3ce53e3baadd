//! Lock Arbiter Tests.
//!
//! Exercises the arbiter directly against a core's global registers:
//! acquisition, contention, round-robin handoff and the mutual exclusion
//! invariant.

use hexsim_core::core::SharedCore;
use hexsim_core::core::arch::sreg::{SYSCFG, SYSCFG_K0LOCK, SYSCFG_TLBLOCK};
use hexsim_core::core::lock::{Acquire, LockKind, LockState, Release};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::harness::params;

fn shared(threads: usize) -> SharedCore {
    SharedCore::new(params(threads)).expect("valid params")
}

// ══════════════════════════════════════════════════════════
// 1. Acquire
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(LockKind::Tlb)]
#[case(LockKind::K0)]
fn uncontended_acquire_sets_bit(#[case] kind: LockKind) {
    let core = shared(4);
    let lock = core.arbiter(kind);
    assert_eq!(lock.acquire(&core.globals, 2), Acquire::Acquired);
    assert_eq!(lock.state(2), LockState::Owner);
    assert!(lock.is_locked(&core.globals));
    assert_eq!(core.globals.get(SYSCFG) & kind.field().in_place(), kind.field().in_place());
}

#[test]
fn owner_reacquire_is_a_no_op() {
    let core = shared(2);
    assert_eq!(core.tlb_lock.acquire(&core.globals, 0), Acquire::Acquired);
    assert_eq!(core.tlb_lock.acquire(&core.globals, 0), Acquire::AlreadyOwner);
    assert_eq!(core.tlb_lock.owner(), Some(0));
}

#[test]
fn contended_acquire_waits() {
    let core = shared(2);
    let _ = core.tlb_lock.acquire(&core.globals, 0);
    assert_eq!(core.tlb_lock.acquire(&core.globals, 1), Acquire::Contended);
    assert_eq!(core.tlb_lock.state(1), LockState::Waiting);
    assert!(core.tlb_lock.has_waiters());
}

#[test]
fn locks_are_independent() {
    let core = shared(2);
    let _ = core.tlb_lock.acquire(&core.globals, 0);
    assert_eq!(core.k0_lock.acquire(&core.globals, 1), Acquire::Acquired);
    let syscfg = core.globals.get(SYSCFG);
    assert!(SYSCFG_TLBLOCK.is_set(syscfg) && SYSCFG_K0LOCK.is_set(syscfg));
}

// ══════════════════════════════════════════════════════════
// 2. Release and handoff
// ══════════════════════════════════════════════════════════

#[test]
fn release_without_waiters_clears_bit() {
    let core = shared(3);
    let _ = core.k0_lock.acquire(&core.globals, 1);
    assert_eq!(core.k0_lock.release(&core.globals, 1), Release::Released);
    assert!(!core.k0_lock.is_locked(&core.globals));
    assert_eq!(core.k0_lock.state(1), LockState::Unlocked);
}

#[test]
fn release_hands_off_to_waiter() {
    let core = shared(2);
    let _ = core.tlb_lock.acquire(&core.globals, 0);
    let _ = core.tlb_lock.acquire(&core.globals, 1);

    assert_eq!(core.tlb_lock.release(&core.globals, 0), Release::HandedOff(1));
    assert_eq!(core.tlb_lock.state(0), LockState::Unlocked);
    assert_eq!(core.tlb_lock.state(1), LockState::Owner);
    assert!(core.tlb_lock.is_locked(&core.globals));
}

#[rstest]
#[case::never_locked(false)]
#[case::locked_by_other(true)]
fn release_by_non_owner_is_ignored(#[case] held: bool) {
    let core = shared(3);
    if held {
        let _ = core.tlb_lock.acquire(&core.globals, 0);
    }
    assert_eq!(core.tlb_lock.release(&core.globals, 2), Release::NotOwner);
    assert_eq!(core.tlb_lock.is_locked(&core.globals), held);
    assert_eq!(core.tlb_lock.owner(), held.then_some(0));
}

#[test]
fn handoff_skips_non_waiting_threads() {
    let core = shared(6);
    let _ = core.tlb_lock.acquire(&core.globals, 4);
    let _ = core.tlb_lock.acquire(&core.globals, 1);
    let _ = core.tlb_lock.acquire(&core.globals, 3);
    // From 4 the scan visits 5, 0, 1: thread 1 is next even though 3 asked later.
    assert_eq!(core.tlb_lock.release(&core.globals, 4), Release::HandedOff(1));
    assert_eq!(core.tlb_lock.release(&core.globals, 1), Release::HandedOff(3));
    assert_eq!(core.tlb_lock.release(&core.globals, 3), Release::Released);
}

// ══════════════════════════════════════════════════════════
// 3. Fairness and exclusion
// ══════════════════════════════════════════════════════════

prop_compose! {
    fn arb_contention()(n in 2usize..=8)(
        n in Just(n),
        owner in 0..n,
        waiters in prop::collection::vec(any::<bool>(), n),
    ) -> (usize, usize, Vec<bool>) {
        (n, owner, waiters)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn winner_is_nearest_following_waiter((n, owner, waiters) in arb_contention()) {
        let core = shared(n);
        let lock = &core.tlb_lock;
        prop_assert_eq!(lock.acquire(&core.globals, owner), Acquire::Acquired);
        let waiting: Vec<usize> = (0..n).filter(|&t| t != owner && waiters[t]).collect();
        for &t in &waiting {
            prop_assert_eq!(lock.acquire(&core.globals, t), Acquire::Contended);
        }

        let expected = waiting.iter().copied().min_by_key(|&w| (w + n - owner) % n);
        let result = lock.release(&core.globals, owner);
        match expected {
            Some(w) => prop_assert_eq!(result, Release::HandedOff(w)),
            None => prop_assert_eq!(result, Release::Released),
        }
    }

    #[test]
    fn at_most_one_owner(
        n in 2usize..=8,
        ops in prop::collection::vec((0usize..8, any::<bool>()), 1..64),
    ) {
        let core = shared(n);
        let lock = &core.k0_lock;
        for (tid, acquire) in ops {
            let tid = tid % n;
            // A waiting thread is parked; only owners and idle threads act.
            if lock.state(tid) == LockState::Waiting {
                continue;
            }
            if acquire {
                let _ = lock.acquire(&core.globals, tid);
            } else {
                let _ = lock.release(&core.globals, tid);
            }
            let owners = (0..n).filter(|&t| lock.state(t) == LockState::Owner).count();
            prop_assert!(owners <= 1);
            prop_assert_eq!(owners == 1, lock.is_locked(&core.globals));
        }
    }
}
