//! Integration tests for the `restconf` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without a device. End-to-end tests drive the binary against a wiremock
//! device and inspect the state file it leaves behind.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_string, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `restconf` binary with env isolation.
///
/// Clears all `RESTCONF_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn restconf_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("restconf");
    cmd.env("HOME", "/tmp/restconf-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/restconf-cli-test-nonexistent")
        .env_remove("RUST_LOG");
    for var in [
        "RESTCONF_PROFILE",
        "RESTCONF_HOST",
        "RESTCONF_DEVICE_HOST",
        "RESTCONF_DEVICE_PORT",
        "RESTCONF_USERNAME",
        "RESTCONF_PASSWORD",
        "RESTCONF_INSECURE",
        "RESTCONF_CA_CERT",
        "RESTCONF_TIMEOUT",
        "RESTCONF_CONNECT_TIMEOUT",
        "RESTCONF_DEADLINE",
        "RESTCONF_STATE",
        "RESTCONF_OUTPUT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// A command wired to `server` with credentials and a private state file.
fn device_cmd(server: &MockServer, state: &Path) -> assert_cmd::Command {
    let mut cmd = restconf_cmd();
    cmd.args(["--host", &server.uri()])
        .args(["--username", "admin", "--password", "s3cret"])
        .arg("--state")
        .arg(state);
    cmd
}

/// Run a prepared command off the async runtime so the mock device keeps
/// serving while the binary blocks on it.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn state_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("restconf.state.json")
}

fn write_state(path: &Path, blocks: &[(&str, &str)]) {
    let blocks: Vec<Value> = blocks
        .iter()
        .map(|(p, content)| json!({ "path": p, "id": p, "content": content }))
        .collect();
    let doc = json!({ "version": 1, "blocks": blocks });
    std::fs::write(path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
}

/// Tracked `(path, content)` pairs read back from the state file.
fn read_state(path: &Path) -> Vec<(String, String)> {
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    doc["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| {
            (
                b["path"].as_str().unwrap().to_owned(),
                b["content"].as_str().unwrap().to_owned(),
            )
        })
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = restconf_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    restconf_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("RESTCONF")
            .and(predicate::str::contains("create"))
            .and(predicate::str::contains("import"))
            .and(predicate::str::contains("refresh")),
    );
}

#[test]
fn test_version_flag() {
    restconf_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("restconf"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    restconf_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    restconf_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = restconf_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_create_requires_content() {
    restconf_cmd()
        .args(["create", "interfaces/eth0"])
        .assert()
        .code(2);
}

#[test]
fn test_content_and_file_conflict() {
    restconf_cmd()
        .args(["create", "x", "--content", "{}", "--file", "x.json"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_output_format() {
    let output = restconf_cmd()
        .args(["--output", "yaml", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn test_get_without_device() {
    let dir = tempfile::tempdir().unwrap();
    restconf_cmd()
        .arg("--state")
        .arg(state_path(&dir))
        .args(["get", "interfaces/eth0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No device configured"));
}

#[test]
fn test_config_path() {
    restconf_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_no_config() {
    restconf_cmd().args(["config", "show"]).assert().success();
}

// ── Local state ─────────────────────────────────────────────────────

#[test]
fn test_list_empty_state_as_json() {
    let dir = tempfile::tempdir().unwrap();
    restconf_cmd()
        .arg("--state")
        .arg(state_path(&dir))
        .args(["--output", "json", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_list_plain_prints_paths() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    write_state(&state, &[("system/ntp", "{}"), ("interfaces/eth0", r#"{"mtu":1500}"#)]);

    restconf_cmd()
        .arg("--state")
        .arg(&state)
        .args(["-o", "plain", "list"])
        .assert()
        .success()
        .stdout("interfaces/eth0\nsystem/ntp\n");
}

#[test]
fn test_show_untracked_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    restconf_cmd()
        .arg("--state")
        .arg(state_path(&dir))
        .args(["show", "interfaces/eth0"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not tracked"));
}

#[test]
fn test_show_plain_prints_content() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    write_state(&state, &[("interfaces/eth0", r#"{"mtu":1500}"#)]);

    restconf_cmd()
        .arg("--state")
        .arg(&state)
        .args(["-o", "plain", "show", "interfaces/eth0"])
        .assert()
        .success()
        .stdout("{\"mtu\":1500}\n");
}

#[test]
fn test_forget_leaves_device_alone() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    write_state(&state, &[("interfaces/eth0", "{}")]);

    restconf_cmd()
        .arg("--state")
        .arg(&state)
        .args(["forget", "interfaces/eth0"])
        .assert()
        .success();
    assert!(read_state(&state).is_empty());
}

#[test]
fn test_corrupt_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    std::fs::write(&state, "{").unwrap();

    restconf_cmd()
        .arg("--state")
        .arg(&state)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unreadable"));
}

// ── End to end against a mock device ────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_create_tracks_block() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/interfaces/eth0"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/interfaces/eth0"))
        .and(header_exists("authorization"))
        .and(body_string(r#"{"mtu":1500}"#))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/interfaces/eth0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{ "mtu": 1500 }"#))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    let mut cmd = device_cmd(&server, &state);
    cmd.args(["create", "interfaces/eth0", "--content", r#"{"mtu":1500}"#]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        read_state(&state),
        vec![("interfaces/eth0".to_owned(), r#"{"mtu":1500}"#.to_owned())]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_conflict_points_at_import() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/interfaces/eth0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"mtu":1500}"#))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    let mut cmd = device_cmd(&server, &state);
    cmd.args(["create", "interfaces/eth0", "--content", r#"{"mtu":1500}"#]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("restconf import"));
    assert!(!state.exists(), "failed create must not write state");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_import_then_read_adopts_drift() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/interfaces/eth0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"mtu":1500}"#))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/interfaces/eth0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"mtu":9000}"#))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);

    let mut import = device_cmd(&server, &state);
    import.args(["import", "interfaces/eth0"]);
    let output = run(import).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(read_state(&state)[0].1, r#"{"mtu":1500}"#);

    let mut read = device_cmd(&server, &state);
    read.args(["read", "interfaces/eth0"]);
    let output = run(read).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("drifted"));
    assert_eq!(read_state(&state)[0].1, r#"{"mtu":9000}"#);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_from_file() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/interfaces/eth0"))
        .and(body_string(r#"{"mtu":9000}"#))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/interfaces/eth0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"mtu":9000}"#))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    write_state(&state, &[("interfaces/eth0", r#"{"mtu":1500}"#)]);
    let doc = dir.path().join("eth0.json");
    std::fs::write(&doc, r#"{"mtu":9000}"#).unwrap();

    let mut cmd = device_cmd(&server, &state);
    cmd.args(["update", "interfaces/eth0", "--file"]).arg(&doc);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(read_state(&state)[0].1, r#"{"mtu":9000}"#);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_server_error_keeps_state() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    write_state(&state, &[("interfaces/eth0", r#"{"mtu":1500}"#)]);

    let mut cmd = device_cmd(&server, &state);
    cmd.args(["--yes", "delete", "interfaces/eth0"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("500"));
    assert_eq!(read_state(&state).len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_removes_block() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/interfaces/eth0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    write_state(&state, &[("interfaces/eth0", r#"{"mtu":1500}"#)]);

    let mut cmd = device_cmd(&server, &state);
    cmd.args(["--yes", "delete", "interfaces/eth0"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(read_state(&state).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_without_yes_is_refused_non_interactively() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    write_state(&state, &[("interfaces/eth0", "{}")]);

    let mut cmd = device_cmd(&server, &state);
    cmd.args(["delete", "interfaces/eth0"]).write_stdin("");

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_is_auth_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = device_cmd(&server, &state_path(&dir));
    cmd.args(["get", "system"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_ca_cert_is_usage_error() {
    let server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = device_cmd(&server, &state_path(&dir));
    cmd.arg("--ca-cert")
        .arg(dir.path().join("missing-ca.pem"))
        .args(["get", "system"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("CA cert"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_prints_document_without_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/system/ntp"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"enabled":true}"#))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    let mut cmd = device_cmd(&server, &state);
    cmd.args(["-o", "json-compact", "get", "system/ntp"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "{\"enabled\":true}\n");
    assert!(!state.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_reports_vanished_block() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/interfaces/eth0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"mtu":1500}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/interfaces/eth1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_path(&dir);
    write_state(
        &state,
        &[
            ("interfaces/eth0", r#"{"mtu":1500}"#),
            ("interfaces/eth1", r#"{"mtu":1500}"#),
        ],
    );

    let mut cmd = device_cmd(&server, &state);
    cmd.args(["-o", "plain", "refresh"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("interfaces/eth0\tin-sync"), "{stdout}");
    assert!(stdout.contains("interfaces/eth1\terror"), "{stdout}");
    assert_eq!(read_state(&state).len(), 2, "vanished block stays tracked");
}
