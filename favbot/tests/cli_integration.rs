//! CLI integration tests for favbot
//!
//! These cover the paths that fail before any network access happens.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn favbot() -> Command {
    let mut cmd = Command::cargo_bin("favbot").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("FAVBOT_LOG_LEVEL");
    cmd
}

#[test]
fn test_help() {
    favbot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_missing_config_exits_1() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("missing.json");

    favbot()
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn test_default_config_path_missing_exits_1() {
    let temp_dir = TempDir::new().unwrap();

    favbot()
        .current_dir(temp_dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("config.json"));
}

#[test]
fn test_invalid_json_exits_1() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, "{ this is not json").unwrap();

    favbot()
        .arg("-c")
        .arg(&config_path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("parsing configuration file"));
}

#[test]
fn test_missing_required_key_exits_1() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    let config = serde_json::json!({
        "consumer_key": "key",
        "consumer_secret": "secret",
        "access_token": "token",
        "access_token_secret": "token-secret",
        "request_interval": 3,
        "request_window": 900,
        "tweets_count": 10,
    });
    fs::write(&config_path, config.to_string()).unwrap();

    favbot()
        .arg("-c")
        .arg(&config_path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("terms"));
}

#[test]
fn test_empty_access_token_exits_1() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    let config = serde_json::json!({
        "consumer_key": "key",
        "consumer_secret": "secret",
        "access_token": "",
        "access_token_secret": "token-secret",
        "request_interval": 0,
        "request_window": 0,
        "terms": ["rust"],
        "tweets_count": 1,
    });
    fs::write(&config_path, config.to_string()).unwrap();

    favbot()
        .arg("-c")
        .arg(&config_path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("access token is empty"));
}

#[test]
fn test_loading_message_on_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("missing.json");

    favbot()
        .arg("-c")
        .arg(&config_path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Loading configurations from"));
}
