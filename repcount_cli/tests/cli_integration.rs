use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// One shoulder abduction rep followed by a few resting frames, 30 ms apart.
const REP: [f32; 17] = [
    20.0, 20.0, 25.0, 40.0, 70.0, 100.0, 140.0, 175.0, 140.0, 100.0, 60.0, 30.0, 18.0, 18.0,
    18.0, 18.0, 18.0,
];

fn write_rep_csv(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("rep.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "t_ms,right_shoulder,left_shoulder").unwrap();
    for (i, a) in REP.iter().enumerate() {
        writeln!(f, "{},{a:.1},20.0", i * 30).unwrap();
    }
    path
}

fn write_rep_json(dir: &tempfile::TempDir) -> PathBuf {
    let frames: Vec<_> = REP
        .iter()
        .map(|a| {
            serde_json::json!({
                "landmarks": [[0.5, 0.5, 0.0, 0.99]],
                "angles": { "right_shoulder": a, "right_elbow": null },
            })
        })
        .collect();
    let path = dir.path().join("rep.json");
    fs::write(&path, serde_json::Value::Array(frames).to_string()).unwrap();
    path
}

// A config path that does not exist: the CLI falls back to built-in profiles.
fn missing_config(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("absent.toml")
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["replay", "--input", "{csv}"], 0, "reps: 1  avg duration: 0.3s  avg range: 157.0°", "stdout")]
#[case(&["replay", "--input", "{json}", "--frame-ms", "30"], 0, "reps: 1", "stdout")]
#[case(&["replay", "--input", "{csv}", "--limb", "left"], 0, "reps: 0", "stdout")]
#[case(&["replay"], 2, "required", "stderr")]
#[case(&["replay", "--input", "{csv}", "--limb", "middle"], 1, "'middle' is not a limb", "stderr")]
#[case(&["replay", "--input", "{csv}", "--exercise", "squat"], 1, "No exercise profile is named 'squat'", "stderr")]
#[case(&["profiles"], 0, "* shoulder_abduction", "stdout")]
#[case(&["self-check"], 0, "OK: 2 exercise profiles, active 'shoulder_abduction' (right)", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let csv = write_rep_csv(&dir);
    let json = write_rep_json(&dir);

    let mut cmd = Command::cargo_bin("repcount").unwrap();
    cmd.arg("--config").arg(missing_config(&dir));
    for a in args {
        match *a {
            "{csv}" => cmd.arg(&csv),
            "{json}" => cmd.arg(&json),
            other => cmd.arg(other),
        };
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn events_are_printed_in_order() {
    let dir = tempdir().unwrap();
    let csv = write_rep_csv(&dir);

    let out = Command::cargo_bin("repcount")
        .unwrap()
        .arg("--config")
        .arg(missing_config(&dir))
        .arg("replay")
        .arg("--input")
        .arg(&csv)
        .arg("--events")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&out);
    let events: Vec<&str> = stdout.lines().filter(|l| l.starts_with('[')).collect();
    assert_eq!(events.len(), 3, "stdout was: {stdout}");
    assert!(events[0].contains("120 ms") && events[0].contains("started at 70.0°"));
    assert!(events[1].contains("300 ms") && events[1].contains("peak reached at 175.0°"));
    assert!(events[2].contains("420 ms") && events[2].contains("rep completed: 18.0° to 175.0°"));
    assert!(events[2].ends_with("(reps=1)"));
}

#[rstest]
fn configured_profile_is_selectable() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(
        &cfg,
        r#"
[session]
exercise = "wide_raise"
limb = "left"

[[exercise]]
name = "wide_raise"
joint = "shoulder"
min_angle_deg = 20.0
max_angle_deg = 180.0
min_range_of_motion_deg = 200.0
"#,
    )
    .unwrap();

    // Swap the columns so the left shoulder moves.
    let csv = dir.path().join("left.csv");
    let mut f = fs::File::create(&csv).unwrap();
    writeln!(f, "t_ms,left_shoulder").unwrap();
    for (i, a) in REP.iter().enumerate() {
        writeln!(f, "{},{a}", i * 30).unwrap();
    }

    Command::cargo_bin("repcount")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--input")
        .arg(&csv)
        .arg("--events")
        .assert()
        .success()
        .stdout(predicate::str::contains("wide_raise (left)"))
        .stdout(predicate::str::contains("discarded: range 157.0° too small"))
        .stdout(predicate::str::contains("reps: 0"));
}

#[rstest]
fn cli_reports_bad_recording_header() {
    let dir = tempdir().unwrap();

    let bad_csv = dir.path().join("angles.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "time,right_shoulder").unwrap();
    writeln!(f, "0,20.0").unwrap();

    Command::cargo_bin("repcount")
        .unwrap()
        .arg("--config")
        .arg(missing_config(&dir))
        .arg("replay")
        .arg("--input")
        .arg(&bad_csv)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
fn cli_reports_invalid_config() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(
        &cfg,
        r#"
[[exercise]]
name = "shoulder_abduction"
joint = "shoulder"
min_angle_deg = 20.0
max_angle_deg = 180.0
min_range_of_motion_deg = 40.0
history_size = 3
"#,
    )
    .unwrap();

    Command::cargo_bin("repcount")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"))
        .stderr(predicate::str::contains("exercise[0].history_size must be >= 4"));
}

#[rstest]
fn unsupported_extension_is_explained() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("angles.txt");
    fs::write(&input, "whatever").unwrap();

    Command::cargo_bin("repcount")
        .unwrap()
        .arg("--config")
        .arg(missing_config(&dir))
        .arg("replay")
        .arg("--input")
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("recording format is not supported"));
}

#[rstest]
fn realtime_replay_counts_the_same() {
    let dir = tempdir().unwrap();
    let csv = write_rep_csv(&dir);

    Command::cargo_bin("repcount")
        .unwrap()
        .arg("--config")
        .arg(missing_config(&dir))
        .arg("replay")
        .arg("--input")
        .arg(&csv)
        .arg("--realtime")
        .assert()
        .success()
        .stdout(predicate::str::contains("reps: 1"));
}
