#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::{NamedTempFile, tempdir};

const TWO_TASKS: &str = "start 2025-01-06\ncontract 1000000000 0.0005 2000000\nadd A Excavation 5\nadd B Foundation 3 A\n";

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_computes_schedule_summary() {
    run_cli(&format!("{TWO_TASKS}compute\nquit\n"))
        .success()
        .stdout(str_contains("tasks=2, critical=2, duration=8, crit_path=A->B"))
        .stdout(str_contains("2025-01-13"));
}

#[test]
fn cli_simulates_weekend_delay_and_prices_it() {
    run_cli(&format!("{TWO_TASKS}simulate\ncost\nquit\n"))
        .success()
        .stdout(str_contains("holiday_delay=2, weather_delay=0, total_delay=2, duration=8->10"))
        .stdout(str_contains("total=₩5,000,000"));
}

#[test]
fn cli_counts_bad_weather_and_names_affected_tasks() {
    run_cli(&format!("{TWO_TASKS}weather 2025-01-07 bad rain\nsimulate\nquit\n"))
        .success()
        .stdout(str_contains("weather_delay=1, total_delay=3"))
        .stdout(str_contains("2025-01-07 affects A"));
}

#[test]
fn cli_reports_cycles() {
    run_cli("add A a 2 B\nadd B b 2 A\ncompute\nquit\n")
        .success()
        .stdout(str_contains("Error: dependency cycle detected"));
}

#[test]
fn cli_rejects_unsupported_work_week() {
    run_cli("week 4\nquit\n")
        .success()
        .stdout(str_contains("Error:"));
}

#[test]
fn cli_delete_command_removes_task() {
    run_cli("add 1 TaskA 5\nadd 2 TaskB 3 1\ndelete 2\nquit\n")
        .success()
        .stdout(str_contains("Deleted task 2."));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!("add 1 TaskPersist 4\nsave json {path}\nadd 2 Temp 1\nload json {path}\nquit\n");
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let after_reload = output.split("Project loaded from").last().unwrap_or_default();
    assert!(output.contains("Project loaded from"));
    assert!(after_reload.contains("TaskPersist"));
    assert!(
        !after_reload.contains("Temp"),
        "temporary task should not appear after reload:\n{after_reload}"
    );
}

#[test]
fn cli_exports_schedule_and_ledger() {
    let dir = tempdir().expect("temp dir");
    let schedule = dir.path().join("schedule.csv");
    let ledger = dir.path().join("ledger.csv");
    let script = format!(
        "{TWO_TASKS}export schedule {}\nexport ledger {}\nquit\n",
        schedule.display(),
        ledger.display()
    );
    run_cli(&script).success().stdout(str_contains("Ledger exported to"));

    let schedule_csv = std::fs::read_to_string(&schedule).unwrap();
    assert!(schedule_csv.starts_with("id,name,work_type,duration,early_start"));
    assert_eq!(schedule_csv.lines().count(), 3);
    let ledger_csv = std::fs::read_to_string(&ledger).unwrap();
    assert_eq!(ledger_csv.lines().count(), 9);
}

#[test]
fn cli_unknown_command_points_to_help() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}

#[test]
fn cli_rejects_unknown_work_type_and_condition() {
    run_cli("add A a 2 - paint\nweather 2025-01-07 bad hail\nadd A a 2 - concrete\nquit\n")
        .success()
        .stdout(str_contains("Error: unknown work type 'paint'"))
        .stdout(str_contains("Error: unknown weather condition 'hail'"))
        .stdout(str_contains("CONCRETE"));
}
