use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mfalock(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mfalock").unwrap();
    cmd.env("MFALOCK_ROOT", dir.path());
    cmd
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_scaffolds_lock_dir() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));
    assert!(dir.path().join(".mfalock/config.yaml").exists());
    assert!(dir.path().join(".mfalock/pattern.json").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();

    let config_path = dir.path().join(".mfalock/config.yaml");
    std::fs::write(&config_path, "quorum: 3\n").unwrap();

    mfalock(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
    // The hand-edited config survives a re-run.
    assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "quorum: 3\n");
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_show_works_before_init() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quorum: 2"));
}

#[test]
fn config_validate_passes_on_defaults() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();
    mfalock(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration ok"));
}

#[test]
fn config_validate_requires_init() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn config_validate_rejects_zero_quorum() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();
    std::fs::write(dir.path().join(".mfalock/config.yaml"), "quorum: 0\n").unwrap();
    mfalock(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("quorum"));
}

// ---------------------------------------------------------------------------
// pattern
// ---------------------------------------------------------------------------

#[test]
fn pattern_show_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir)
        .args(["pattern", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source: default"))
        .stdout(predicate::str::contains("hold(1000ms)"));
}

#[test]
fn pattern_set_show_roundtrip() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();
    mfalock(&dir)
        .args([
            "pattern",
            "set",
            r#"{"pattern": [{"action": "tap", "duration": 0}, {"action": "hold", "duration": 750}]}"#,
        ])
        .assert()
        .success();
    mfalock(&dir)
        .args(["pattern", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hold(750ms)"))
        .stdout(predicate::str::contains("source: file"));
}

#[test]
fn pattern_set_rejects_invalid_document() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir)
        .args(["pattern", "set", r#"{"pattern": []}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template is empty"));
}

#[test]
fn pattern_clear_reverts_to_default() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();
    mfalock(&dir).args(["pattern", "clear"]).assert().success();
    mfalock(&dir)
        .args(["pattern", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source: default"));
}

// ---------------------------------------------------------------------------
// send
// ---------------------------------------------------------------------------

#[test]
fn send_rejects_malformed_line() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir)
        .args(["send", "garbage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid event line"));
}

#[test]
fn send_fails_cleanly_without_listener() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir)
        .args(["send", "TOUCH - SUCCESS", "--addr", "127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to connect"));
}

// ---------------------------------------------------------------------------
// simulate
// ---------------------------------------------------------------------------

#[test]
fn simulate_default_gesture_succeeds() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();

    let script = dir.path().join("gesture.txt");
    std::fs::write(
        &script,
        "# tap\n\
         100 touch 1\n\
         300 touch 0\n\
         # hold\n\
         600 touch 1\n\
         1900 touch 0\n\
         # tap\n\
         2100 touch 1\n\
         2300 touch 0\n",
    )
    .unwrap();

    mfalock(&dir)
        .args(["simulate"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("claimed touch"))
        .stdout(predicate::str::contains("TOUCH - SUCCESS"));
}

#[test]
fn simulate_short_hold_fails_gesture() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();

    let script = dir.path().join("gesture.txt");
    std::fs::write(
        &script,
        "100 touch 1\n\
         300 touch 0\n\
         600 touch 1\n\
         900 touch 0\n",
    )
    .unwrap();

    mfalock(&dir)
        .args(["simulate"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("TOUCH - FAILURE"));
}

#[test]
fn simulate_runtime_pattern_override() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();

    // Single-tap template passed at invocation beats the persisted document.
    let script = dir.path().join("gesture.txt");
    std::fs::write(&script, "100 touch 1\n300 touch 0\n").unwrap();

    mfalock(&dir)
        .args(["simulate"])
        .arg(&script)
        .args([
            "--pattern",
            r#"{"pattern": [{"action": "tap", "duration": 0}]}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("source: runtime"))
        .stdout(predicate::str::contains("TOUCH - SUCCESS"));
}

#[test]
fn simulate_json_output_is_line_delimited() {
    let dir = TempDir::new().unwrap();
    mfalock(&dir).arg("init").assert().success();

    let script = dir.path().join("gesture.txt");
    std::fs::write(&script, "100 touch 1\n300 touch 0\n").unwrap();

    mfalock(&dir)
        .args(["--json", "simulate"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"claimed""#));
}

#[test]
fn simulate_rejects_bad_script() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("gesture.txt");
    std::fs::write(&script, "100 wiggle 1\n").unwrap();

    mfalock(&dir)
        .args(["simulate"])
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
}
