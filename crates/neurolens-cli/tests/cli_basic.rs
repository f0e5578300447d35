//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_neurolens-cli"))
        .args(args)
        .env("NEUROLENS_DATA_DIR", data_dir)
        .env_remove("NEUROLENS_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command {args:?} failed: {stderr}");
    stdout
}

#[test]
fn test_config_list_shows_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["config", "list"]);
    assert!(out.contains("fatigue.check_interval_secs = 15"));
    assert!(out.contains("preferences.notifications = true"));
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "preferences.reduced_alerts", "true"]);
    let out = run_cli_success(dir.path(), &["config", "get", "preferences.reduced_alerts"]);
    assert_eq!(out.trim(), "true");

    run_cli_success(dir.path(), &["config", "reset"]);
    let out = run_cli_success(dir.path(), &["config", "get", "preferences.reduced_alerts"]);
    assert_eq!(out.trim(), "false");
}

#[test]
fn test_config_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "preferences.theme"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "simulation.rate_min", "99"]);
    assert_ne!(code, 0);
}

#[test]
fn test_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["history", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed, serde_json::json!([]));

    let out_file = dir.path().join("out.csv");
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["export", "csv", "--output", out_file.to_str().unwrap()],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("session history is empty"));
}

#[test]
fn test_monitor_run_archives_session() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(
        dir.path(),
        &[
            "monitor", "run", "--seconds", "31", "--speed", "200", "--rate", "5", "--seed", "7",
        ],
    );
    let types: Vec<String> = out
        .lines()
        .map(|line| {
            let event: serde_json::Value = serde_json::from_str(line).unwrap();
            event["type"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(types.first().map(String::as_str), Some("MonitoringStarted"));
    assert!(types.iter().any(|t| t == "FatigueDetected"));
    assert!(types.iter().any(|t| t == "SessionEnded"));

    let history = run_cli_success(dir.path(), &["history", "list", "--json"]);
    let sessions: serde_json::Value = serde_json::from_str(&history).unwrap();
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    let id = sessions[0]["id"].as_str().unwrap().to_string();
    assert!(sessions[0]["fatigue_detections"].as_u64().unwrap() >= 1);

    let show = run_cli_success(dir.path(), &["history", "show", &id]);
    let report: serde_json::Value = serde_json::from_str(&show).unwrap();
    assert_eq!(report["blink_rate_health"], "low");

    let stats = run_cli_success(dir.path(), &["stats"]);
    let stats: serde_json::Value = serde_json::from_str(&stats).unwrap();
    assert_eq!(stats["total_sessions"], 1);

    let gallery = run_cli_success(dir.path(), &["achievements"]);
    assert!(gallery.contains("[x] 👁️ First Steps"));
    assert!(gallery.contains("[ ]"));

    let csv_path = dir.path().join("sessions.csv");
    run_cli_success(
        dir.path(),
        &["export", "csv", "--output", csv_path.to_str().unwrap()],
    );
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("Session ID,Start Time,End Time,Duration (min)"));
    assert_eq!(csv.lines().count(), 2);
}

#[test]
fn test_unknown_session_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["history", "show", "session_missing"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no session with id"));
}
