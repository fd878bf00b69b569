//! CLI argument parsing and validation tests: no network I/O.
//!
//! These tests verify that bad input is rejected before any cassette or live
//! adapter is consulted.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("anatomy-poster");
    cmd.env("ANATOMY_POSTER_CONFIG", "/nonexistent/anatomy-poster.toml")
        .env_remove("ANATOMY_POSTER_REPLAY")
        .env_remove("ANATOMY_POSTER_REC")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_subcommand_exits_with_error() {
    cmd().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn styles_lists_catalogues() {
    cmd()
        .arg("styles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Van Gogh"))
        .stdout(predicate::str::contains("Medical Illustration"))
        .stdout(predicate::str::contains("Nervous system"));
}

#[test]
fn unknown_style_exits_with_error() {
    cmd()
        .args(["mockup", "--api-key", "sk-test", "--style", "Baroque", "Heart"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn mockup_without_key_generates_nothing() {
    // The form contract: no credential means no image, reported as such
    cmd()
        .args(["mockup", "Heart"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No mockup generated"))
        .stderr(predicate::str::contains("No API key"));
}

#[test]
fn batch_without_key_exits_with_error() {
    cmd()
        .args(["batch", "Heart"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key for OpenAI"));
}

#[test]
fn broken_config_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[mockup\ntemplate = ").unwrap();

    cmd()
        .args(["--config", path.to_str().unwrap(), "styles"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
