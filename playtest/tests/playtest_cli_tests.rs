use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

fn scripts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts")
}

fn playtest(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pebble-playtest"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch pebble-playtest")
}

fn report(args: &[&str]) -> Value {
    let output = playtest(args);
    assert!(
        output.status.success(),
        "pebble-playtest failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON report")
}

#[test]
fn demo_wins_in_both_modes() {
    for mode in ["snap", "free"] {
        let value = report(&["demo", "--seed", "5", "--mode", mode]);
        assert_eq!(value["won"], Value::Bool(true), "mode {mode}");
        assert_eq!(value["mode"], Value::String(mode.to_string()));
        assert_eq!(value["final_digest"].as_str().map(str::len), Some(64));
    }
}

#[test]
fn centered_script_reports_a_win() {
    let script = scripts_dir().join("centered_win.json");
    let value = report(&["run", "--script", script.to_str().unwrap(), "--seed", "8"]);

    assert_eq!(value["won"], Value::Bool(true));
    assert_eq!(value["steps"], Value::from(11));
    let frames = value["frames"].as_array().expect("frames array");
    assert_eq!(frames.len(), 11);
    assert_eq!(frames[10]["snapshot"]["phase"], Value::String("won".into()));
}

#[test]
fn topple_script_in_free_mode_sends_the_pebble_back() {
    let script = scripts_dir().join("topple.json");
    let tuning = scripts_dir().join("free_tuning.json");
    let value = report(&[
        "run",
        "--script",
        script.to_str().unwrap(),
        "--tuning",
        tuning.to_str().unwrap(),
    ]);

    let frames = value["frames"].as_array().expect("frames array");
    let toppled = frames[6]["events"].as_array().expect("events array");
    assert_eq!(toppled[0]["event"], Value::String("toppled".into()));
    assert_eq!(toppled[0]["id"], Value::from(1));

    let last = &frames[7]["snapshot"];
    assert_eq!(last["stack"], serde_json::json!([0]));
    assert_eq!(last["pebbles"][1]["toppled"], Value::Bool(false));
    assert_eq!(last["pebbles"][1]["placed"], Value::Bool(false));
    assert_eq!(value["won"], Value::Bool(false));
}

#[test]
fn digest_only_is_stable_across_runs() {
    let script = scripts_dir().join("centered_win.json");
    let args = [
        "run",
        "--script",
        script.to_str().unwrap(),
        "--seed",
        "31",
        "--digest-only",
    ];

    let first = report(&args);
    let second = report(&args);

    assert!(first.get("frames").is_none());
    assert_eq!(first["final_digest"], second["final_digest"]);
}

#[test]
fn missing_script_fails_with_context() {
    let output = playtest(&["run", "--script", "does/not/exist.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load script"), "stderr: {stderr}");
}
