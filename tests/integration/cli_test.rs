//! Integration tests for the clipsync CLI

use assert_cmd::Command;
use predicates::prelude::*;

use super::helpers::{fixtures_dir, temp_file};

/// clipsync with logging silenced and no user config.
fn clipsync() -> Command {
    let mut cmd = Command::cargo_bin("clipsync").expect("binary should build");
    cmd.env_remove("RUST_LOG")
        .env("CLIPSYNC_CONFIG", "/nonexistent/clipsync/config.toml");
    cmd
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).display().to_string()
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_subcommands() {
    clipsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn simulate_without_file_is_a_usage_error() {
    clipsync()
        .arg("simulate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<FILE>"));
}

// ============================================================================
// Simulate
// ============================================================================

#[test]
fn simulate_prints_the_transport_log() {
    clipsync()
        .args(["simulate", &fixture("two_clips.toml"), "--step", "0.25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.750  open a.mp4"))
        .stdout(predicate::str::contains("3.000  open b.mp4"))
        .stdout(predicate::str::contains("6.000  open idle.mp4"))
        .stdout(predicate::str::contains("17 command(s) up to 6.000s"))
        .stdout(predicate::str::contains("player left on idle.mp4 (loop off)"));
}

#[test]
fn simulate_json_is_machine_readable() {
    let output = clipsync()
        .args(["simulate", &fixture("drift.toml"), "--step", "0.25", "--json"])
        .output()
        .expect("Failed to run clipsync");
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["mode"], "playback");
    assert_eq!(report["final_media"], "a.mp4");
    let corrections: Vec<f64> = report["commands"]
        .as_array()
        .expect("commands array")
        .iter()
        .filter(|entry| entry["command"] == "seek_precise")
        .filter_map(|entry| entry["at"].as_f64())
        .collect();
    assert_eq!(corrections, vec![0.0, 2.0, 4.0]);
}

#[test]
fn simulate_until_cuts_the_run_short() {
    clipsync()
        .args(["simulate", &fixture("two_clips.toml"), "--step", "0.25", "--until", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("open b.mp4").not())
        .stdout(predicate::str::contains("up to 2.000s"));
}

#[test]
fn simulate_preview_mode_is_reported() {
    clipsync()
        .args(["simulate", &fixture("scrub.toml"), "--step", "0.5", "--preview", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"preview\""))
        .stdout(predicate::str::contains("\"final_looping\": true"));
}

#[test]
fn simulate_missing_file_fails_with_path() {
    clipsync()
        .args(["simulate", "/some/path/missing.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read timeline file"))
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn simulate_invalid_timeline_fails() {
    clipsync()
        .args(["simulate", &fixture("invalid_volume.toml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("audio_volume"));
}

#[test]
fn simulate_rejects_zero_step() {
    clipsync()
        .args(["simulate", &fixture("two_clips.toml"), "--step", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--step"));
}

#[test]
fn simulate_rejects_unbounded_runs() {
    clipsync()
        .args(["simulate", &fixture("two_clips.toml"), "--step", "0.000001", "--until", "1e12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("use a larger step"));
}

#[test]
fn verbose_logs_go_to_stderr() {
    clipsync()
        .args(["-v", "simulate", &fixture("two_clips.toml"), "--step", "0.25", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("took over resource"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_path_honors_env_override() {
    let (temp_dir, path) = temp_file("custom.toml", "");
    clipsync()
        .env("CLIPSYNC_CONFIG", &path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(path.display().to_string()));
    drop(temp_dir);
}

#[test]
fn config_show_prints_effective_settings() {
    let (temp_dir, path) = temp_file("custom.toml", "[sync]\nseek_timeout_ms = 250\n");
    clipsync()
        .env("CLIPSYNC_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[sync]"))
        .stdout(predicate::str::contains("seek_timeout_ms = 250"))
        .stdout(predicate::str::contains("loop_unwrap_ratio = 0.9"));
    drop(temp_dir);
}

#[test]
fn config_show_without_file_prints_defaults() {
    clipsync()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seek_timeout_ms = 5000"));
}

#[test]
fn invalid_config_fails_simulation() {
    let (temp_dir, path) = temp_file("custom.toml", "[sync]\nseek_timeout_ms = 0\n");
    clipsync()
        .env("CLIPSYNC_CONFIG", &path)
        .args(["simulate", &fixture("two_clips.toml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("seek_timeout_ms"));
    drop(temp_dir);
}
