//! Integration tests for the wkmigrate binary.
//!
//! These tests verify end-to-end behavior including:
//! - Detection and validation output
//! - Migration, persistence and reports
//! - Original-record handling and dry runs
//! - Rollback to legacy formats

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("wkmigrate"))
}

/// Write sample records (plus any extras) to `records.json`
fn write_input(dir: &Path, count: usize, extra: &[Value]) -> PathBuf {
    let output = cli()
        .arg("sample")
        .arg("--count")
        .arg(count.to_string())
        .output()
        .expect("Failed to run sample");
    assert!(output.status.success());

    let mut records: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    records.extend_from_slice(extra);

    let path = dir.join("records.json");
    fs::write(&path, serde_json::to_string_pretty(&records).unwrap()).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Migrate legacy workout records to the unified session schema",
        ));
}

#[test]
fn test_sample_emits_each_legacy_format() {
    let temp_dir = setup_test_dir();
    let input = write_input(temp_dir.path(), 4, &[]);

    cli()
        .arg("detect")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("0\tstrength"))
        .stdout(predicate::str::contains("1\tconditioning"))
        .stdout(predicate::str::contains("2\thybrid"))
        .stdout(predicate::str::contains("3\tagility"));
}

#[test]
fn test_sample_single_type() {
    let output = cli()
        .args(["sample", "--count", "3", "--type", "agility"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r["phases"].is_array()));

    cli()
        .args(["sample", "--type", "unified"])
        .assert()
        .failure();
}

#[test]
fn test_detect_reports_unknown_records() {
    let temp_dir = setup_test_dir();
    let input = write_input(temp_dir.path(), 1, &[json!({ "foo": 1 })]);

    cli()
        .arg("detect")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tunknown"));
}

#[test]
fn test_detect_reads_jsonl() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("records.jsonl");
    fs::write(
        &input,
        "{\"blocks\":[{\"type\":\"rest\",\"duration\":30}]}\n{\"phases\":[{\"drills\":[]}]}\n",
    )
    .unwrap();

    cli()
        .arg("detect")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("0\thybrid"))
        .stdout(predicate::str::contains("1\tagility"));
}

#[test]
fn test_validate_valid_records() {
    let temp_dir = setup_test_dir();
    let input = write_input(temp_dir.path(), 4, &[]);

    cli()
        .arg("validate")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("0\tstrength\tok"));
}

#[test]
fn test_validate_with_forced_format_fails() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("records.json");
    fs::write(&input, r#"[{ "exercises": [] }]"#).unwrap();

    cli()
        .arg("validate")
        .arg(&input)
        .arg("--format")
        .arg("conditioning")
        .assert()
        .failure()
        .stdout(predicate::str::contains("REQUIRED_FIELD\tintervals"));
}

#[test]
fn test_migrate_stores_sessions_and_reports() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let input = write_input(temp_dir.path(), 8, &[json!({ "foo": 1 })]);
    let report = temp_dir.path().join("report.json");
    let csv = temp_dir.path().join("summary.csv");

    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--batch-size")
        .arg("3")
        .arg("--report")
        .arg(&report)
        .arg("--csv")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored 8 sessions"))
        .stdout(predicate::str::contains("UNKNOWN_FORMAT"))
        .stdout(predicate::str::contains("Migrated 8/9 records"));

    let sessions = fs::read_to_string(data_dir.join("sessions.jsonl")).unwrap();
    assert_eq!(sessions.lines().count(), 8);
    for line in sessions.lines() {
        let session: Value = serde_json::from_str(line).unwrap();
        assert_eq!(session["version"], "1.0.0");
        assert!(session["content"]["blocks"].is_array());
    }

    let report = read_json(&report);
    assert_eq!(report["summary"]["total"], 9);
    assert_eq!(report["summary"]["failed"], 1);
    assert_eq!(report["state"], "completed");

    let csv = fs::read_to_string(&csv).unwrap();
    assert_eq!(csv.lines().count(), 10);

    // Original input is untouched by default
    assert_eq!(read_json(&input).as_array().unwrap().len(), 9);
}

#[test]
fn test_dry_run_does_not_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let input = write_input(temp_dir.path(), 4, &[]);

    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--dry-run")
        .arg("--no-preserve-original")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("Migrated 4/4 records"));

    assert!(!data_dir.join("sessions.jsonl").exists());
    assert_eq!(read_json(&input).as_array().unwrap().len(), 4);
}

#[test]
fn test_no_preserve_original_keeps_only_failures() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let broken = json!({ "name": "Broken", "exercises": "not-an-array" });
    let input = write_input(temp_dir.path(), 3, &[broken.clone()]);

    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--no-preserve-original")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed migrated records"));

    assert_eq!(read_json(&input), json!([broken]));
}

#[test]
fn test_no_preserve_original_keeps_unparsed_unified_records() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let unparsed = json!({ "version": "1.0.0", "type": "strength", "content": {}, "metadata": {} });
    let input = write_input(temp_dir.path(), 2, &[unparsed.clone()]);

    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--no-preserve-original")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored 2 sessions"))
        .stdout(predicate::str::contains("Migrated 3/3 records"));

    // Counted as a success but never stored, so it must stay in the input
    assert_eq!(read_json(&input), json!([unparsed]));
    let sessions = fs::read_to_string(data_dir.join("sessions.jsonl")).unwrap();
    assert_eq!(sessions.lines().count(), 2);
}

#[test]
fn test_stop_on_error_exits_with_failure() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let input = temp_dir.path().join("records.json");
    fs::write(
        &input,
        serde_json::to_string(&json!([
            { "foo": 1 },
            { "exercises": [{ "exerciseId": "squat", "sets": 3 }] }
        ]))
        .unwrap(),
    )
    .unwrap();

    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--stop-on-error")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Migrated 0/2 records"));
}

#[test]
fn test_rollback_from_stored_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let input = write_input(temp_dir.path(), 4, &[]);

    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let legacy_path = temp_dir.path().join("legacy.json");
    let report_path = temp_dir.path().join("rollback-report.json");
    cli()
        .arg("rollback")
        .arg(data_dir.join("sessions.jsonl"))
        .arg("--to")
        .arg("hybrid")
        .arg("--output")
        .arg(&legacy_path)
        .arg("--report")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 hybrid records"));

    let report = read_json(&report_path);
    let report = report.as_array().unwrap();
    assert_eq!(report.len(), 4);
    assert!(report.iter().all(|r| r["success"] == true));
    // the agility session loses its drills when rolled back to hybrid
    assert_eq!(report[3]["metadata"]["dataLoss"], true);
    assert!(report[0]["metadata"]["dataLossReport"]["fields"].is_array());

    let legacy = read_json(&legacy_path);
    let legacy = legacy.as_array().unwrap();
    assert_eq!(legacy.len(), 4);
    assert!(legacy.iter().all(|r| r["blocks"].is_array()));
    assert_eq!(legacy[0]["id"], "strength-0");

    // Rolled-back records detect as the requested legacy format
    cli()
        .arg("detect")
        .arg(&legacy_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("0\thybrid"));
}

#[test]
fn test_rollback_to_unified_is_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let input = write_input(temp_dir.path(), 1, &[]);

    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    cli()
        .arg("rollback")
        .arg(data_dir.join("sessions.jsonl"))
        .arg("--to")
        .arg("unified")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ROLLBACK_ERROR"));
}

#[test]
fn test_rollback_rejects_non_session_input() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("records.json");
    fs::write(&input, r#"[{ "foo": 1 }]"#).unwrap();

    cli()
        .arg("rollback")
        .arg(&input)
        .arg("--to")
        .arg("strength")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ROLLBACK_OPERATION_ERROR"));
}

#[test]
fn test_config_file_is_honored() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    let input = write_input(temp_dir.path(), 2, &[]);

    fs::write(&config_path, "[migration]\nbatch_size = 0\n").unwrap();
    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--config")
        .arg(&config_path)
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch_size"));

    let data_dir = temp_dir.path().join("configured");
    fs::write(
        &config_path,
        format!("[output]\ndata_dir = {:?}\n", data_dir.display().to_string()),
    )
    .unwrap();
    cli()
        .arg("migrate")
        .arg(&input)
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();
    assert!(data_dir.join("sessions.jsonl").exists());
}
