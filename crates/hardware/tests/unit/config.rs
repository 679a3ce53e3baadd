//! Configuration Tests.
//!
//! Machine presets, explicit overrides and validation.

use hexsim_core::common::HexError;
use hexsim_core::config::{Config, MachineKind};
use hexsim_core::HexCore;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("v66g_1024", 4, 0x8d66)]
#[case("v68n_1024", 6, 0x8d68)]
#[case("v69na_1024", 6, 0x8c69)]
#[case("v73na_1024", 6, 0x8c73)]
fn presets(#[case] kind: &str, #[case] threads: usize, #[case] rev: u32) {
    let json = format!(r#"{{ "machine": {{ "kind": "{kind}" }} }}"#);
    let params = Config::from_json(&json).expect("parses").to_params().expect("valid");
    assert_eq!(params.thread_count, threads);
    assert_eq!(params.rev, rev);
    assert_eq!(params.cfgtable_base, 0xd800_0000);
}

#[test]
fn default_machine_is_v68() {
    assert_eq!(Config::default().machine.kind, MachineKind::V68n1024);
}

#[test]
fn overrides_beat_presets() {
    let json = r#"{
        "general": { "shadow_tlb_size": 128 },
        "machine": {
            "kind": "V66g1024",
            "thread_count": 2,
            "boot_vector": 65536,
            "cfgtable_base": 3221225472,
            "rev": 4660
        }
    }"#;
    let params = Config::from_json(json).expect("parses").to_params().expect("valid");
    assert_eq!(params.thread_count, 2);
    assert_eq!(params.boot_vector, 0x1_0000);
    assert_eq!(params.cfgtable_base, 0xc000_0000);
    assert_eq!(params.rev, 0x1234);
    assert_eq!(params.shadow_tlb_size, 128);
}

#[rstest]
#[case::no_threads(r#"{ "machine": { "thread_count": 0 } }"#)]
#[case::too_many_threads(r#"{ "machine": { "thread_count": 9 } }"#)]
#[case::no_shadow(r#"{ "general": { "shadow_tlb_size": 0 } }"#)]
#[case::unaligned_vector(r#"{ "machine": { "boot_vector": 2 } }"#)]
fn rejected_configs(#[case] json: &str) {
    let err = Config::from_json(json).expect("parses").to_params().unwrap_err();
    assert!(matches!(err, HexError::Config(_)), "{err}");
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(Config::from_json("{ machine: }"), Err(HexError::Json(_))));
}

#[test]
fn core_builds_from_config() {
    let json = r#"{ "machine": { "kind": "v66g_1024", "boot_vector": 4096 } }"#;
    let config = Config::from_json(json).expect("parses");
    let core = HexCore::from_config(&config).expect("core");
    assert_eq!(core.thread_count(), 4);
    assert_eq!(core.thread(3).expect("thread").pc, 0x1000);
}
