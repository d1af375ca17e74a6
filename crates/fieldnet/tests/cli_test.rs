//! Integration tests for the `fieldnet` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! config handling and error exit codes -- all without a live device.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fieldnet` binary with env isolation.
///
/// Clears all `FIELDNET_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn fieldnet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fieldnet");
    cmd.env("HOME", "/tmp/fieldnet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fieldnet-cli-test-nonexistent")
        .env_remove("FIELDNET_CONFIG")
        .env_remove("FIELDNET_HOST")
        .env_remove("FIELDNET_TIMEOUT")
        .env_remove("FIELDNET_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, toml: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, toml).unwrap();
    path
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fieldnet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    fieldnet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("switch")
            .and(predicate::str::contains("ap"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    fieldnet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fieldnet"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    fieldnet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    fieldnet_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Slot parsing ────────────────────────────────────────────────────

#[test]
fn test_switch_configure_needs_six_slots() {
    let output = fieldnet_cmd()
        .args(["switch", "configure", "254", "-"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_switch_configure_rejects_bad_slot() {
    fieldnet_cmd()
        .args(["switch", "configure", "254", "R2", "-", "-", "-", "-"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a team number"));
}

#[test]
fn test_ap_configure_requires_keys() {
    fieldnet_cmd()
        .args(["ap", "configure", "254", "-", "-", "-", "-", "-"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("TEAM:KEY"));
}

#[test]
fn test_invalid_output_format() {
    let output = fieldnet_cmd()
        .args(["--output", "invalid", "switch", "reset"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_follows_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fieldnet.toml");
    fieldnet_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fieldnet.toml"));
}

#[test]
fn test_config_show_without_file() {
    let dir = tempfile::tempdir().unwrap();
    fieldnet_cmd()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[switch]").and(predicate::str::contains("settle_secs")));
}

#[test]
fn test_config_show_masks_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[switch]\nhost = \"10.0.100.2\"\npassword = \"sw1tch\"\n",
    );
    fieldnet_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("****").and(predicate::str::contains("sw1tch").not()));
}

#[test]
fn test_config_show_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = fieldnet_cmd()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["access_point"]["channel"], 36);
}

// ── Device errors ───────────────────────────────────────────────────

#[test]
fn test_switch_without_host_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[switch]\npassword = \"sw1tch\"\n");
    fieldnet_cmd()
        .arg("--config")
        .arg(&path)
        .args(["switch", "reset"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("switch.host"));
}

#[test]
fn test_unreachable_switch_exits_with_connection_code() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        &format!("[switch]\nhost = \"127.0.0.1:{port}\"\npassword = \"sw1tch\"\ntimeout = 2\n"),
    );
    fieldnet_cmd()
        .arg("--config")
        .arg(&path)
        .args(["switch", "reset"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not connect"));
}

#[test]
fn test_ap_status_with_security_disabled_skips_device() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing listens on this address; security off means it is never contacted.
    let path = write_config(
        dir.path(),
        "[access_point]\nhost = \"127.0.0.1:9\"\npassword = \"ap\"\n",
    );
    fieldnet_cmd()
        .arg("--config")
        .arg(&path)
        .args(["ap", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R1").and(predicate::str::contains("B3")));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_switch_subcommands_exist() {
    fieldnet_cmd()
        .args(["switch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configure").and(predicate::str::contains("reset")));
}

#[test]
fn test_ap_subcommands_exist() {
    fieldnet_cmd()
        .args(["ap", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("status")
                .and(predicate::str::contains("configure"))
                .and(predicate::str::contains("channel")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    fieldnet_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("path")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("set-password")),
        );
}
