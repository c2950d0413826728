//! CLI integration tests
//!
//! Tests the CLI binary end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;

const TELEMETRY_VARS: &[&str] = &[
    "OTEL_EXPORTER_OTLP_ENDPOINT",
    "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT",
    "OTEL_EXPORTER_OTLP_HEADERS",
    "OTEL_SDK_DISABLED",
    "OTEL_LOG_LEVEL",
    "OTEL_SERVICE_NAME",
    "OTEL_SERVICE_NAME_API",
    "OTEL_SERVICE_NAME_WORKER",
    "OTEL_ENVIRONMENT",
    "APP_ENV",
    "PYROSCOPE_SERVER_ADDRESS",
    "PYROSCOPE_URL",
    "PYROSCOPE_TAGS",
    "PYROSCOPE_BASIC_AUTH_PASSWORD",
    "PROMETHEUS_PUSHGATEWAY_URL",
];

/// Binary with telemetry variables from the outer environment removed.
fn telemetry_cmd() -> Command {
    let mut cmd = Command::cargo_bin("rental-telemetry").unwrap();
    for var in TELEMETRY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help() {
    telemetry_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Telemetry bootstrap"));
}

#[test]
fn test_version() {
    telemetry_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_check_json_reports_resolved_config() {
    let output = telemetry_cmd()
        .args(["check", "--surface", "worker", "--json"])
        .env("OTEL_EXPORTER_OTLP_ENDPOINT", "http://otel:4318")
        .env("OTEL_EXPORTER_OTLP_HEADERS", "authorization=Bearer topsecret")
        .env("APP_ENV", "staging")
        .env("PROMETHEUS_PUSHGATEWAY_URL", "http://pushgateway:9091")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    assert!(!stdout.contains("topsecret"));

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["surface"], "worker");
    assert_eq!(report["resource"]["service_name"], "rental-worker");
    assert_eq!(report["resource"]["deployment_environment"], "staging");
    assert_eq!(report["tracing"]["endpoint"], "http://otel:4318/v1/traces");
    assert_eq!(report["metrics"]["push_enabled"], true);
    assert_eq!(report["profiler"]["enabled"], false);
}

#[test]
fn test_check_human_output() {
    telemetry_cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("rental-api"));
}

#[test]
fn test_check_rejects_unknown_surface() {
    telemetry_cmd()
        .args(["check", "--surface", "mobile"])
        .assert()
        .failure();
}

#[test]
fn test_exec_requires_command() {
    telemetry_cmd()
        .args(["exec", "--job", "nightly"])
        .assert()
        .failure();
}

#[cfg(unix)]
#[test]
fn test_exec_propagates_success() {
    telemetry_cmd()
        .args(["exec", "--job", "nightly", "--records-total", "3", "--", "true"])
        .assert()
        .code(0);
}

#[cfg(unix)]
#[test]
fn test_exec_propagates_failure() {
    telemetry_cmd()
        .args(["exec", "--job", "nightly", "--", "false"])
        .assert()
        .code(1);
}

#[cfg(unix)]
#[test]
fn test_exec_passes_arguments_through() {
    telemetry_cmd()
        .args(["exec", "--job", "shell", "--", "sh", "-c", "exit 7"])
        .assert()
        .code(7);
}

#[test]
fn test_exec_missing_program() {
    telemetry_cmd()
        .args(["exec", "--job", "ghost", "--", "definitely-not-a-real-program-xyz"])
        .assert()
        .code(127);
}
