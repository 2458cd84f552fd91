#![allow(deprecated)] // cargo_bin is deprecated but still supported by assert_cmd
//! End-to-end tests for the `bl` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{TempDir, tempdir};

/// `bl` isolated from the caller's config, data dir and environment
fn bl(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bl").expect("bl binary");
    cmd.current_dir(home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("BUILDLOG_LEVEL")
        .env_remove("RUST_LOG")
        .arg("--color")
        .arg("never");
    cmd
}

#[test]
fn test_levels_marks_enabled() {
    let home = tempdir().expect("tempdir");
    bl(&home)
        .args(["--log-level", "warn", "levels"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  info\n* warn\n* error\n* silent"));
}

#[test]
fn test_file_logging_and_bridge_install_together() {
    let home = tempdir().expect("tempdir");
    bl(&home).env("RUST_LOG", "info").arg("levels").assert().success();
    bl(&home)
        .env("RUST_LOG", "info")
        .args(["log", "error", "my:module", "boom"])
        .assert()
        .success()
        .stderr(predicate::str::contains("error my:module boom"));

    let log = fs::read_to_string(home.path().join("data/buildlog/logs/bl.log")).expect("log file");
    assert!(log.contains("Logging initialized"));
}

#[test]
fn test_log_through_presenter() {
    let home = tempdir().expect("tempdir");
    bl(&home)
        .args(["log", "info", "my:module", "hello", "world"])
        .assert()
        .success()
        .stderr(predicate::str::contains("info my:module hello world"));
}

#[test]
fn test_log_unobserved_falls_back() {
    let home = tempdir().expect("tempdir");
    bl(&home)
        .args(["log", "warn", "my:module", "careful", "--unobserved"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[warn] my:module: careful"));
}

#[test]
fn test_invalid_module_name_fails() {
    let home = tempdir().expect("tempdir");
    bl(&home)
        .args(["log", "info", "my module", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid module name"));
}

#[test]
fn test_simulate_renders_progress() {
    let home = tempdir().expect("tempdir");
    bl(&home)
        .args(["simulate", "-p", "a", "-p", "b:library", "--skip", "b", "--tasks", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "info Project 1 of 2: ❯ Building application project a...\n\
             info a › Running task task-1...\n\
             info Project 2 of 2: ✔ Skipping build of library project b\n",
        ));
}

#[test]
fn test_simulate_unobserved() {
    let home = tempdir().expect("tempdir");
    bl(&home)
        .args(["simulate", "-p", "a:library", "--tasks", "1", "--unobserved"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[info] Building library project a...\n[info] a: Running task task-1...\n",
        ));
}

#[test]
fn test_config_file_sets_threshold() {
    let home = tempdir().expect("tempdir");
    fs::write(home.path().join(".buildlog.yml"), "log-level: verbose\n").expect("write config");
    bl(&home)
        .args(["simulate", "-p", "a", "--tasks", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("verb a Task 1 of 1 ✔ Finished task task-1"))
        .stderr(predicate::str::contains("verb application a task-1 task-1 done"));
}

#[test]
fn test_cli_level_overrides_environment() {
    let home = tempdir().expect("tempdir");
    bl(&home)
        .env("BUILDLOG_LEVEL", "error")
        .args(["--log-level", "info", "log", "info", "my:module", "shown"])
        .assert()
        .success()
        .stderr(predicate::str::contains("info my:module shown"));

    bl(&home)
        .env("BUILDLOG_LEVEL", "error")
        .args(["log", "info", "my:module", "hidden"])
        .assert()
        .success()
        .stderr(predicate::str::contains("hidden").not());
}

#[test]
fn test_unknown_threshold_fails() {
    let home = tempdir().expect("tempdir");
    bl(&home)
        .args(["--log-level", "loud", "levels"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown log level \"loud\""));
}
