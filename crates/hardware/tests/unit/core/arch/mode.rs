//! CPU mode derivation tests.

use hexsim_core::common::MmuIdx;
use hexsim_core::core::arch::mode::{CpuMode, mmu_index};
use hexsim_core::core::arch::sreg::{SSR_EX, SSR_GM, SSR_UM, SYSCFG_MMUEN};
use rstest::rstest;

const fn ssr(um: u32, gm: u32, ex: u32) -> u32 {
    SSR_UM.set(SSR_GM.set(SSR_EX.set(0, ex), gm), um)
}

#[rstest]
#[case(ssr(1, 0, 0), CpuMode::User)]
#[case(ssr(1, 1, 0), CpuMode::User)]
#[case(ssr(0, 1, 0), CpuMode::Guest)]
#[case(ssr(0, 0, 0), CpuMode::Monitor)]
#[case(ssr(1, 1, 1), CpuMode::Monitor)]
fn mode_from_ssr(#[case] value: u32, #[case] mode: CpuMode) {
    assert_eq!(CpuMode::from_ssr(value), mode);
}

#[rstest]
#[case(ssr(1, 0, 0), MmuIdx::User)]
#[case(ssr(0, 1, 0), MmuIdx::Guest)]
#[case(ssr(0, 0, 0), MmuIdx::Kernel)]
#[case(ssr(1, 0, 1), MmuIdx::Kernel)]
fn mmu_index_with_translation_on(#[case] value: u32, #[case] idx: MmuIdx) {
    assert_eq!(mmu_index(value, SYSCFG_MMUEN.in_place()), idx);
}

#[test]
fn mmu_off_is_always_kernel() {
    assert_eq!(mmu_index(ssr(1, 0, 0), 0), MmuIdx::Kernel);
}

#[test]
fn display_names() {
    assert_eq!(CpuMode::Guest.to_string(), "Guest");
}
