use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn enemeter() -> Command {
    #[allow(deprecated)]
    let cmd = Command::cargo_bin("enemeter").unwrap();
    cmd
}

fn measurement_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for row in [
        "1000,3700000,-20000000,25000",
        "1000,3700000,-20000000,25500",
        "1000,3710000,5000000,26000",
        "1000,3720000,5000000,26500",
    ] {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_help() {
    enemeter()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_process_text_report() {
    let file = measurement_file();
    enemeter()
        .args(["process", "--start", "2025-04-01T10:00:00", "--input"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ENEMETER DATA PROCESSING REPORT"))
        .stdout(predicate::str::contains("Data Points: 4"))
        .stdout(predicate::str::contains("Hour 10: "));
}

#[test]
fn test_process_json_streaming_matches_batch() {
    let file = measurement_file();
    let run = |stream: bool| -> Value {
        let mut cmd = enemeter();
        cmd.args(["process", "--format", "json", "--start", "2025-04-01", "--input"])
            .arg(file.path());
        if stream {
            cmd.arg("--stream");
        }
        let output = cmd.assert().success().get_output().stdout.clone();
        serde_json::from_slice(&output).unwrap()
    };

    let batch = run(false);
    assert_eq!(batch, run(true));
    assert_eq!(batch["data_points"], 4);
    assert_eq!(batch["duration_seconds"], 3.0);
}

#[test]
fn test_process_single_metric_csv() {
    let file = measurement_file();
    enemeter()
        .args([
            "process",
            "--start",
            "2025-04-01",
            "--metric",
            "battery_discharge",
            "--format",
            "csv",
            "--input",
        ])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Measurement,Value\n"))
        .stdout(predicate::str::contains("TotalDischargeTime,1.00"));
}

#[test]
fn test_process_filters_and_sampling() {
    let file = measurement_file();
    let output = enemeter()
        .args([
            "process",
            "--format",
            "json",
            "--start",
            "2025-04-01",
            "--sample",
            "2",
            "--curr-min=-30000000",
            "--input",
        ])
        .arg(file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["data_points"], 2);
}

#[test]
fn test_process_writes_output_file() {
    let file = measurement_file();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.txt");

    enemeter()
        .args(["process", "--start", "2025-04-01", "--input"])
        .arg(file.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Results saved to"));

    let report = std::fs::read_to_string(&out).unwrap();
    assert!(report.contains("ENERGY METRICS"));
}

#[test]
fn test_missing_start_time_fails() {
    let file = measurement_file();
    enemeter()
        .args(["process", "--input"])
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: "));
}

#[test]
fn test_missing_input_file_fails() {
    enemeter()
        .args(["process", "--start", "2025-04-01", "--input", "/nonexistent/data.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_malformed_row_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "1000,3700000,-20000000,25000").unwrap();
    writeln!(file, "1000,3700000").unwrap();
    file.flush().unwrap();

    enemeter()
        .args(["process", "--start", "2025-04-01", "--input"])
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_unknown_metric_fails() {
    let file = measurement_file();
    enemeter()
        .args(["process", "--start", "2025-04-01", "--metric", "bogus", "--input"])
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown metric type: bogus"));
}

#[test]
fn test_inspect() {
    let file = measurement_file();
    enemeter()
        .args(["inspect", "--samples", "3", "--input"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("RAW DATA SAMPLES:"))
        .stdout(predicate::str::contains("millicelsius (°C = raw / 1000)"))
        .stdout(predicate::str::contains("microvolts (V = raw / 1000000)"))
        .stdout(predicate::str::contains("nanoamperes (A = raw / 1000000000)"));
}

#[test]
fn test_inspect_suggests_coarse_units_for_small_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "1000,3700,-200,25").unwrap();
    writeln!(file, "1000,3710,500,26").unwrap();
    file.flush().unwrap();

    enemeter()
        .args(["inspect", "--input"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("celsius (°C = raw / 1)"))
        .stdout(predicate::str::contains("millivolts (V = raw / 1000)"))
        .stdout(predicate::str::contains("milliamperes (A = raw / 1000)"))
        .stdout(predicate::str::contains("millicelsius (°C = raw").not());
}
