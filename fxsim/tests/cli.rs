//! CLI integration tests for fxsim
//!
//! These run the real binary against the built-in presets.

use assert_cmd::Command;
use predicates::prelude::*;

fn fxsim() -> Command {
    Command::cargo_bin("fxsim").unwrap()
}

#[test]
fn test_presets_lists_every_preset() {
    fxsim()
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("fountain"))
        .stdout(predicate::str::contains("sparks"))
        .stdout(predicate::str::contains("smoke"))
        .stdout(predicate::str::contains("vortex"));
}

#[test]
fn test_simulate_reports_emitters() {
    fxsim()
        .args(["simulate", "fountain", "--ticks", "30", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jet"))
        .stdout(predicate::str::contains("mist"))
        .stdout(predicate::str::contains("Summary:"));
}

#[test]
fn test_simulate_is_deterministic() {
    let run = || {
        fxsim()
            .args(["simulate", "vortex", "-n", "45", "-s", "3"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_simulate_with_preview() {
    fxsim()
        .args(["simulate", "smoke", "--preview", "1", "--alpha", "0.25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 -> 1 (0.25)"));
}

#[test]
fn test_simulate_rejects_unknown_lod() {
    fxsim()
        .args(["simulate", "sparks", "--lod", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid LOD index 5"));
}

#[test]
fn test_simulate_rejects_zero_tick_length() {
    fxsim()
        .args(["simulate", "sparks", "--dt", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tick length must be positive"));
}

#[test]
fn test_layout_shows_sub_image_record() {
    fxsim()
        .args(["layout", "smoke"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SubUv"))
        .stdout(predicate::str::contains("SubImage (RandomBlend)"))
        .stdout(predicate::str::contains("Sub-images:    4x4"));
}

#[test]
fn test_layout_unknown_emitter() {
    fxsim()
        .args(["layout", "fountain", "--emitter", "spray"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no emitter named 'spray'"));
}

#[test]
fn test_compact_verifies_fused_emitter() {
    fxsim()
        .args(["compact", "fountain", "--verify", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not fusable"))
        .stdout(predicate::str::contains("mist: OK"));
}

#[test]
fn test_compact_without_candidates() {
    fxsim()
        .args(["compact", "smoke"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No emitter of this preset"));
}
