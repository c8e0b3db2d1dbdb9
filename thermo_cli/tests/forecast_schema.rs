use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[data]
filter_hours = 0

[model]
kind = "decision_tree"
max_depth = 5

[forecast]
horizons = [15, 30, 45, 60]
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn train(dir: &Path, cfg: &Path) -> (PathBuf, PathBuf) {
    let readings = dir.join("readings.csv");
    Command::cargo_bin("thermocast")
        .unwrap()
        .arg("--config")
        .arg(cfg)
        .args(["generate", "--days", "2", "--readings-per-hour", "6", "--seed", "11"])
        .args(["--end", "2024-06-03 15:20:00", "--output"])
        .arg(&readings)
        .assert()
        .success();
    let out = dir.join("model");
    Command::cargo_bin("thermocast")
        .unwrap()
        .arg("--config")
        .arg(cfg)
        .arg("train")
        .arg("--input")
        .arg(&readings)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();
    (readings, out.join("model.json"))
}

/// Validate the forecast record for a successful run.
#[rstest]
fn forecast_success_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let (readings, model) = train(dir.path(), &cfg);

    let assert = Command::cargo_bin("thermocast")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("forecast")
        .arg("--model")
        .arg(&model)
        .arg("--input")
        .arg(&readings)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();

    for key in [
        "current_time",
        "current_temperature",
        "hour_predictions",
        "max_temperature",
        "max_confidence",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    let points = v["hour_predictions"].as_array().unwrap();
    let minutes: Vec<u64> = points
        .iter()
        .map(|p| p["minutes_ahead"].as_u64().unwrap())
        .collect();
    assert_eq!(minutes, vec![15, 30, 45, 60]);
    assert_eq!(points[0]["predicted_time"], "2024-06-03T15:35:00");

    // a single tree is fully confident
    for p in points {
        assert_eq!(p["confidence"].as_f64().unwrap(), 1.0);
        assert!(p["temperature"].as_f64().is_some());
    }
    let max_t = v["max_temperature"].as_f64().unwrap();
    let paired = points
        .iter()
        .find(|p| p["temperature"].as_f64().unwrap() == max_t)
        .unwrap();
    assert_eq!(paired["confidence"], v["max_confidence"]);
}

/// Zero readings: failure record on stdout and the insufficient-history exit code.
#[rstest]
fn forecast_failure_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let (_, model) = train(dir.path(), &cfg);
    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "recorded_time,temperature\n").unwrap();

    let assert = Command::cargo_bin("thermocast")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("forecast")
        .arg("--model")
        .arg(&model)
        .arg("--input")
        .arg(&empty)
        .assert()
        .code(3);
    let out = assert.get_output();
    let v: serde_json::Value =
        serde_json::from_str(String::from_utf8(out.stdout.clone()).unwrap().trim()).unwrap();
    assert!(v["error"].as_str().unwrap().contains("insufficient history"));
    assert_eq!(v["temperature"], 0.0);
    assert_eq!(v["confidence"], 0.0);

    // --json also makes the stderr error structured
    let stderr = String::from_utf8(out.stderr.clone()).unwrap();
    let err_line = stderr
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .unwrap();
    let e: serde_json::Value = serde_json::from_str(err_line).unwrap();
    assert_eq!(e["reason"], "InsufficientHistory");
    assert_eq!(e["exit_code"], 3);
}
