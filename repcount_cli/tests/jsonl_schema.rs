use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

const REP: [f32; 17] = [
    20.0, 20.0, 25.0, 40.0, 70.0, 100.0, 140.0, 175.0, 140.0, 100.0, 60.0, 30.0, 18.0, 18.0,
    18.0, 18.0, 18.0,
];

// Two reps back to back, with one dropped reading in the rest between them.
fn write_two_reps(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("two.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "t_ms,right_shoulder").unwrap();
    for (i, a) in REP.iter().chain(REP.iter()).enumerate() {
        if i == 15 {
            writeln!(f, "{},", i * 30).unwrap();
        } else {
            writeln!(f, "{},{a}", i * 30).unwrap();
        }
    }
    path
}

fn run_json(dir: &tempfile::TempDir, extra: &[&str]) -> (bool, String) {
    let csv = write_two_reps(dir);
    let mut cmd = Command::cargo_bin("repcount").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("replay")
        .arg("--input")
        .arg(&csv);
    for a in extra {
        cmd.arg(a);
    }
    let out = cmd.output().unwrap();
    (
        out.status.success(),
        String::from_utf8_lossy(&out.stdout).into_owned(),
    )
}

/// Validate the JSON summary for a successful replay.
#[rstest]
fn json_summary_schema() {
    let dir = tempdir().unwrap();
    let (ok, stdout) = run_json(&dir, &[]);
    assert!(ok, "replay failed; stdout was: {stdout}");

    let line = stdout
        .lines()
        .find(|l| l.contains("\"total_reps\""))
        .unwrap_or("")
        .to_string();
    assert!(
        !line.is_empty(),
        "no JSON line with total_reps found; stdout was: {stdout}"
    );
    let v: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");

    assert!(v.get("timestamp").and_then(|x| x.as_i64()).is_some());
    assert_eq!(v["exercise"], "shoulder_abduction");
    assert_eq!(v["limb"], "right");
    assert_eq!(v["frames"], 34);
    assert_eq!(v["missed_frames"], 1);
    assert_eq!(v["interrupted"], false);
    assert_eq!(v["total_reps"], 2);
    assert!(v["avg_duration_ms"].as_u64().is_some());
    assert!(v["avg_range_of_motion"].as_f64().is_some());

    let reps = v["reps"].as_array().expect("reps array");
    assert_eq!(reps.len(), 2);
    assert_eq!(reps[0]["started_ms"], 120);
    assert_eq!(reps[0]["ended_ms"], 420);
    assert_eq!(reps[0]["max_angle"].as_f64(), Some(175.0));
    assert_eq!(reps[0]["min_angle"].as_f64(), Some(18.0));
    for r in reps {
        let rom = r["range_of_motion"].as_f64().unwrap();
        assert!(rom > 40.0, "rep range {rom} should clear the gate");
        assert!(r["ended_ms"].as_u64() > r["started_ms"].as_u64());
    }
}

/// Every event line is a standalone JSON object with a known kind.
#[rstest]
fn json_event_lines_schema() {
    let dir = tempdir().unwrap();
    let (ok, stdout) = run_json(&dir, &["--events"]);
    assert!(ok, "replay failed; stdout was: {stdout}");

    let events: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|l| l.contains("\"event\""))
        .map(|l| serde_json::from_str(l).expect("valid JSON"))
        .collect();
    let kinds: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec![
            "started",
            "peak_reached",
            "completed",
            "started",
            "peak_reached",
            "completed"
        ]
    );
    for e in &events {
        assert!(e["t_ms"].as_u64().is_some());
        assert_eq!(e["limb"], "right");
        assert!(e["detail"].is_object());
    }
    assert_eq!(events[2]["rep_count"], 1);
    assert_eq!(events[5]["rep_count"], 2);
    assert_eq!(events[1]["detail"]["peak"].as_f64(), Some(175.0));
}

/// Errors become one JSON object on stdout under --json.
#[rstest]
fn json_error_schema() {
    let dir = tempdir().unwrap();
    let (ok, stdout) = run_json(&dir, &["--exercise", "squat"]);
    assert!(!ok);

    let line = stdout
        .lines()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or("")
        .to_string();
    assert!(!line.is_empty(), "no error JSON; stdout was: {stdout}");
    let v: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
    assert_eq!(v["reason"], "UnknownExercise");
    assert!(v["message"].as_str().unwrap().contains("'squat'"));
}
