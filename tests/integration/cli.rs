#[path = "common/mod.rs"]
mod common;

use std::fs;

use assert_cmd::Command;
use common::{log_lines, matching};
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn quit_code_becomes_process_exit_code() {
    let temp = tempdir().expect("failed to create tempdir");
    let log_path = temp.path().join("app.log");

    Command::new(assert_cmd::cargo::cargo_bin!("appframe"))
        .current_dir(temp.path())
        .arg("run")
        .arg("--exit-code")
        .arg("42")
        .arg("--log-file")
        .arg(&log_path)
        .assert()
        .code(42);

    let lines = log_lines(&log_path);
    assert_eq!(matching(&lines, "The application was shut down successfully.").len(), 1);
    assert_eq!(matching(&lines, "Game initialization was successful.").len(), 1);
    assert_eq!(matching(&lines, "INFO     [mainThread] The logging service was started").len(), 1);
    assert!(matching(&lines, "CRITICAL").is_empty());
    assert!(lines.iter().all(|line| line.contains("[mainThread]")));
}

#[cfg(unix)]
#[test]
fn window_failure_exits_with_minus_one_and_logs_critical() {
    let temp = tempdir().expect("failed to create tempdir");
    let log_path = temp.path().join("app.log");

    Command::new(assert_cmd::cargo::cargo_bin!("appframe"))
        .current_dir(temp.path())
        .arg("run")
        .arg("--fail-window")
        .arg("--log-file")
        .arg(&log_path)
        .assert()
        .code(255);

    let lines = log_lines(&log_path);
    let critical = matching(&lines, "CRITICAL");
    assert_eq!(critical.len(), 1);
    assert!(critical[0].contains("unable to create main window"));
    assert!(matching(&lines, "Game initialization").is_empty());
}

#[test]
fn config_file_controls_the_log_destination() {
    let temp = tempdir().expect("failed to create tempdir");
    let dir = temp.path();
    fs::write(
        dir.join("appframe.yaml"),
        r#"
window:
  title: "integration"
logging:
  path: "logs/from-config.log"
  min_severity: debug
  main_thread_label: "boot"
"#,
    )
    .expect("failed to write config");

    Command::new(assert_cmd::cargo::cargo_bin!("appframe"))
        .current_dir(dir)
        .arg("run")
        .arg("--exit-code")
        .arg("3")
        .assert()
        .code(3);

    let lines = log_lines(&dir.join("logs/from-config.log"));
    assert_eq!(matching(&lines, "[boot] The logging service was started").len(), 1);
    assert_eq!(matching(&lines, "Quit requested with exit code 3.").len(), 1);
}

#[test]
fn config_command_prints_resolved_json() {
    let temp = tempdir().expect("failed to create tempdir");

    Command::new(assert_cmd::cargo::cargo_bin!("appframe"))
        .current_dir(temp.path())
        .arg("config")
        .arg("--json")
        .assert()
        .success()
        .stdout(contains("\"main_thread_label\": \"mainThread\""))
        .stdout(contains("\"min_severity\": \"info\""));
}

#[test]
fn unreadable_config_fails_before_running() {
    let temp = tempdir().expect("failed to create tempdir");

    Command::new(assert_cmd::cargo::cargo_bin!("appframe"))
        .current_dir(temp.path())
        .arg("run")
        .arg("--config")
        .arg("missing.yaml")
        .assert()
        .failure()
        .stderr(contains("Unable to load configuration"));
}
