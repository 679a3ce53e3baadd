//! System register layout tests.

use hexsim_core::core::arch::sreg::{
    self, Field, MODECTL_E, MODECTL_W, SSR, SSR_ASID, SSR_CAUSE, SSR_EX, ThreadSregs,
};
use pretty_assertions::assert_eq;

#[test]
fn field_set_preserves_neighbours() {
    let reg = 0xffff_ffff;
    let updated = SSR_ASID.set(reg, 0x12);
    assert_eq!(SSR_ASID.get(updated), 0x12);
    assert_eq!(updated & !SSR_ASID.in_place(), reg & !SSR_ASID.in_place());
}

#[test]
fn field_value_is_truncated_to_width() {
    assert_eq!(SSR_CAUSE.set(0, 0x1ff), 0xff);
    assert!(SSR_EX.is_set(SSR_EX.set(0, 3)));
}

#[test]
fn modectl_halves_are_disjoint() {
    assert_eq!(MODECTL_E.in_place() & MODECTL_W.in_place(), 0);
    assert_eq!(Field::new(16, 8).in_place(), 0x00ff_0000);
}

#[test]
fn thread_local_split() {
    assert!(sreg::is_thread_local(sreg::SSR));
    assert!(sreg::is_thread_local(sreg::GEVB));
    assert!(!sreg::is_thread_local(sreg::EVB));
    assert!(!sreg::is_thread_local(sreg::PCYCLEHI));
}

#[test]
fn thread_sregs_field_update() {
    let mut regs = ThreadSregs::default();
    regs.set_field(SSR, SSR_ASID, 9);
    regs.set_field(SSR, SSR_EX, 1);
    assert_eq!(SSR_ASID.get(regs.get(SSR)), 9);
    assert!(SSR_EX.is_set(regs.get(SSR)));
    regs.clear();
    assert_eq!(regs.get(SSR), 0);
}
