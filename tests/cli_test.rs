//! End-to-end tests for the `rate-guardian` binary.
//!
//! Covers exit codes, human and JSON output, and error rendering. The
//! long-running `run` command is exercised through the library in
//! `monitor_loop_test.rs` instead.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::fixtures::{
    ConfigFixture, request_headers, single_target_toml, unknown_provider_toml, webhook_toml,
};
use common::logger::TestLogger;

#[allow(deprecated)]
fn guardian_cmd() -> Command {
    let mut cmd = Command::cargo_bin("rate-guardian").expect("rate-guardian binary");
    cmd.env_remove("GUARDIAN_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("GUARDIAN_LOG", "warn");
    cmd
}

// =============================================================================
// Basic invocation
// =============================================================================

#[test]
fn no_command_prints_quickstart() {
    guardian_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("QUICK START"))
        .stdout(predicate::str::contains("test-notify"));
}

#[test]
fn help_lists_commands() {
    guardian_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("--config"));
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn validate_accepts_good_config() {
    let log = TestLogger::new("validate_accepts_good_config");
    let fixture = ConfigFixture::new(&single_target_toml("https://api.example.com", 80));

    log.phase("execute");
    guardian_cmd()
        .arg("--config")
        .arg(&fixture.path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"))
        .stdout(predicate::str::contains("primary"))
        .stdout(predicate::str::contains("console"))
        .stdout(predicate::str::contains("sk-fixture").not());
    log.finish_ok();
}

#[test]
fn validate_json_envelope() {
    let fixture = ConfigFixture::new(&single_target_toml("https://api.example.com", 80));

    let output = guardian_cmd()
        .args(["--json", "validate", "--config"])
        .arg(&fixture.path)
        .output()
        .expect("run validate");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(value["schemaVersion"], "rate-guardian.v1");
    assert_eq!(value["command"], "validate");
    assert_eq!(value["data"]["targets"][0]["provider"], "openai");
    assert_eq!(value["data"]["targets"][0]["checkIntervalSeconds"], 60);
}

#[test]
fn unknown_provider_exits_with_config_error() {
    let fixture = ConfigFixture::new(&unknown_provider_toml());

    guardian_cmd()
        .arg("--config")
        .arg(&fixture.path)
        .arg("validate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("RG-C010"))
        .stderr(predicate::str::contains("acme"));
}

#[test]
fn missing_config_exits_with_config_error() {
    let dir = rate_guardian::TestDir::new();

    guardian_cmd()
        .arg("--config")
        .arg(dir.file_path("absent.toml"))
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("RG-C001"));
}

#[test]
fn unset_placeholder_exits_with_config_error() {
    let fixture = ConfigFixture::new(
        r#"[[targets]]
provider = "github"
api_key = "${RG_CLI_TEST_UNSET_TOKEN}"
"#,
    );

    guardian_cmd()
        .env_remove("RG_CLI_TEST_UNSET_TOKEN")
        .arg("--config")
        .arg(&fixture.path)
        .arg("validate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("RG_CLI_TEST_UNSET_TOKEN"));
}

#[test]
fn json_errors_are_structured() {
    let fixture = ConfigFixture::new(&unknown_provider_toml());

    let output = guardian_cmd()
        .args(["--json", "validate", "--config"])
        .arg(&fixture.path)
        .output()
        .expect("run validate");
    assert_eq!(output.status.code(), Some(2));

    let value: serde_json::Value = serde_json::from_slice(&output.stderr).expect("json stderr");
    assert_eq!(value["errorCode"], "RG-C010");
    assert_eq!(value["fatal"], true);
}

// =============================================================================
// check
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn check_reports_usage_over_threshold() {
    let log = TestLogger::new("check_reports_usage_over_threshold");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(request_headers(1000, 150))
        .expect(1)
        .mount(&server)
        .await;
    let fixture = ConfigFixture::new(&single_target_toml(&server.uri(), 80));

    log.phase("execute");
    guardian_cmd()
        .arg("--config")
        .arg(&fixture.path)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OVER"))
        .stdout(predicate::str::contains("85.0%"));
    log.finish_ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn check_json_includes_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(request_headers(100, 60))
        .mount(&server)
        .await;
    let fixture = ConfigFixture::new(&single_target_toml(&server.uri(), 80));

    let output = guardian_cmd()
        .args(["check", "--json", "--target", "primary", "--config"])
        .arg(&fixture.path)
        .output()
        .expect("run check");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    let row = &value["data"][0];
    assert_eq!(row["targetName"], "primary");
    assert_eq!(row["status"], "ok");
    assert_eq!(row["report"]["usagePercent"], 40.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn check_failure_exits_with_check_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;
    let fixture = ConfigFixture::new(&single_target_toml(&server.uri(), 80));

    guardian_cmd()
        .arg("--config")
        .arg(&fixture.path)
        .arg("check")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("UNKNOWN"))
        .stderr(predicate::str::contains("RG-P020"));
}

#[test]
fn check_unknown_target_is_config_error() {
    let fixture = ConfigFixture::new(&single_target_toml("https://api.example.com", 80));

    guardian_cmd()
        .arg("--config")
        .arg(&fixture.path)
        .args(["check", "--target", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no target named 'nope'"));
}

// =============================================================================
// test-notify
// =============================================================================

#[test]
fn test_notify_console_delivers() {
    let fixture = ConfigFixture::new(&single_target_toml("https://api.example.com", 80));

    guardian_cmd()
        .arg("--config")
        .arg(&fixture.path)
        .arg("test-notify")
        .assert()
        .success()
        .stdout(predicate::str::contains("Test notification"))
        .stdout(predicate::str::contains("1 delivered, 0 failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_notify_failure_exits_with_notify_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    let fixture = ConfigFixture::new(&webhook_toml(
        "https://api.example.com",
        &format!("{}/hook", server.uri()),
    ));

    guardian_cmd()
        .arg("--config")
        .arg(&fixture.path)
        .arg("test-notify")
        .assert()
        .code(4)
        .stdout(predicate::str::contains("webhook"))
        .stderr(predicate::str::contains("RG-N002"));
}
