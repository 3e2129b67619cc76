//! Integration tests for the `viam-chatgpt` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WIRELESS: &str = "Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
 face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
 wlan0: 0000   61.  -49.  -256        0      0      0      0      0        0
";

fn write_config(dir: &TempDir, components: serde_json::Value) -> PathBuf {
    let path = dir.path().join("config.json");
    let config = serde_json::json!({ "components": components });
    std::fs::write(&path, config.to_string()).unwrap();
    path
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("viam-chatgpt").unwrap();
    cmd.env_remove("OPENAI_API_KEY").env_remove("RUST_LOG");
    cmd
}

fn with_config(path: &Path) -> Command {
    let mut cmd = cmd();
    cmd.arg("--config").arg(path);
    cmd
}

#[test]
fn test_version_command() {
    cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("viam-chatgpt"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("readings"));
}

#[test]
fn test_unknown_command_exit_code() {
    cmd().arg("frobnicate").assert().code(1);
}

#[test]
fn test_models_lists_all_models() {
    cmd()
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("jeremyrhyde:nlp:chatgpt  rdk:component:generic"))
        .stdout(predicate::str::contains("jeremyrhyde:generic:chatgpt"))
        .stdout(predicate::str::contains("jeremyrhyde:sensor:wifi  rdk:component:sensor"));
}

#[test]
fn test_validate_accepts_supported_version() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        serde_json::json!([{
            "name": "chat",
            "type": "generic",
            "model": "jeremyrhyde:nlp:chatgpt",
            "attributes": {"api_key": "sk-test", "chat_gpt_version": "gpt-3.5-turbo"}
        }]),
    );

    with_config(&path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok    chat"));
}

#[test]
fn test_validate_rejects_unsupported_version() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        serde_json::json!([{
            "name": "chat",
            "type": "generic",
            "model": "jeremyrhyde:nlp:chatgpt",
            "attributes": {"chat_gpt_version": "gpt-4"}
        }]),
    );

    with_config(&path)
        .arg("validate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL  chat"))
        .stdout(predicate::str::contains("must be one of the following"));
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    with_config(&dir.path().join("absent.json"))
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_command_on_echo_component() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        serde_json::json!([{
            "name": "echo",
            "type": "generic",
            "model": "jeremyrhyde:generic:chatgpt"
        }]),
    );

    with_config(&path)
        .args(["command", "--component", "echo", r#"{"input": "hello"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""response": "hello""#));

    with_config(&path)
        .args(["command", "--component", "echo", r#"{"request": "hello"}"#])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no 'input' given"))
        .stderr(predicate::str::contains("Command failed"));
}

#[test]
fn test_command_unreachable_api_returns_fallback() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        serde_json::json!([{
            "name": "chat",
            "type": "generic",
            "model": "jeremyrhyde:nlp:chatgpt",
            "attributes": {
                "api_key": "sk-test",
                "chat_gpt_version": "gpt-3.5-turbo",
                "base_url": "http://127.0.0.1:1/v1"
            }
        }]),
    );

    with_config(&path)
        .args(["command", "--component", "chat", r#"{"request": "ping"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Unable to reach ChatGPT. Request was ping",
        ));
}

#[test]
fn test_readings_from_wireless_file() {
    let dir = TempDir::new().unwrap();
    let wireless = dir.path().join("wireless");
    std::fs::write(&wireless, WIRELESS).unwrap();
    let path = write_config(
        &dir,
        serde_json::json!([{
            "name": "wifi",
            "type": "sensor",
            "model": "jeremyrhyde:sensor:wifi",
            "attributes": {"path": wireless}
        }]),
    );

    with_config(&path)
        .arg("readings")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""interface": "wlan0""#))
        .stdout(predicate::str::contains(r#""level": -49.0"#));
}
