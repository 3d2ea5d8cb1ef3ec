//! End-to-end CLI tests for the cadmium binary.
//!
//! None of these reach the network: they cover argument handling, the
//! configuration file, input validation and the `clean` subcommand.

#![allow(deprecated)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's configuration directory.
fn cadmium(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cadmium").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, json: &str) -> std::path::PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    cadmium(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download YouTube"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    cadmium(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cadmium"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    cadmium(home.path())
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_unknown_format_rejected() {
    let home = TempDir::new().unwrap();
    cadmium(home.path())
        .args(["--format", "hologram", "https://youtu.be/dQw4w9WgXcQ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hologram"));
}

#[test]
fn test_binary_empty_stdin_prints_guidance() {
    let home = TempDir::new().unwrap();
    cadmium(home.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("empty stdin"));
}

#[test]
fn test_binary_input_without_youtube_urls_fails() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), r#"{ "ffmpeg": { "auto_discover": false } }"#);
    cadmium(home.path())
        .arg("--config")
        .arg(&config)
        .args(["not a url", "https://example.com/watch?v=dQw4w9WgXcQ"])
        .assert()
        .code(1);
}

#[test]
fn test_binary_missing_input_file_fails() {
    let home = TempDir::new().unwrap();
    cadmium(home.path())
        .args(["--input", "/definitely/not/here.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read input file"));
}

#[test]
fn test_binary_invalid_config_reports_parse_error() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "{ definitely not json");
    cadmium(home.path())
        .arg("--config")
        .arg(&config)
        .arg("https://youtu.be/dQw4w9WgXcQ")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse configuration file"));
}

#[test]
fn test_binary_clean_removes_staged_files() {
    let home = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    std::fs::write(staging.path().join("Video-Clip.webm"), b"left over").unwrap();
    std::fs::write(staging.path().join("Audio-Clip.m4a"), b"left over").unwrap();
    let config = write_config(
        home.path(),
        &format!(
            r#"{{ "staging": {{ "directory": {} }}, "ffmpeg": {{ "auto_discover": false }} }}"#,
            serde_json::to_string(&staging.path()).unwrap()
        ),
    );

    cadmium(home.path())
        .arg("clean")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}
