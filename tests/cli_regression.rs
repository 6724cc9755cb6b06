// Regression tests for the casebook binary: exit codes, report lines and
// miette diagnostics.
// Requires: assert_cmd, predicates, tempfile crates in [dev-dependencies]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn casebook() -> Command {
    Command::cargo_bin("casebook").unwrap()
}

#[test]
fn cli_run_passing_suite_exits_zero() {
    let dir = TempDir::new().unwrap();
    let suite = write(
        &dir,
        "divide.yaml",
        r#"
target: divide
cases:
  - [1, 1]
  - [1, 0, {err: ZeroDivisionError}]
  - [10, 5, {expect: 2}]
"#,
    );

    casebook()
        .arg("run")
        .arg(&suite)
        .assert()
        .success()
        .stdout(contains("Running tests for divide:"))
        .stdout(contains("Tests for divide complete: all passed"));
}

#[test]
fn cli_run_failing_suite_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let suite = write(
        &dir,
        "triple.json",
        r#"{"target": "triple", "cases": [[1, 1, {"expect": ["_", 1, 2]}], [1, 1, {"not_expect": {"$tuple": [1, 1, 2]}}]]}"#,
    );

    casebook()
        .arg("run")
        .arg(&suite)
        .arg("--print-res")
        .assert()
        .failure()
        .stdout(contains("Test 2 failed with error: forbidden value matched: (1, 1, 2)"))
        .stdout(contains("1 of 2 failed [2]"));
}

#[test]
fn cli_run_escalation_reports_diagnostic() {
    let dir = TempDir::new().unwrap();
    let suite = write(
        &dir,
        "escalate.yaml",
        r#"
target: divide
cases:
  - [1, 0, {raise_err: true}]
  - [1, 1]
"#,
    );

    casebook()
        .arg("run")
        .arg(&suite)
        .assert()
        .failure()
        .stdout(contains("Running test 2").not())
        .stderr(contains("casebook::run::escalated"));
}

#[test]
fn cli_reports_miette_diagnostics_on_bad_marker() {
    let dir = TempDir::new().unwrap();
    let suite = write(
        &dir,
        "bad.yaml",
        r#"
target: divide
cases:
  - [1, 1, {expect: 1, not_expect: 2}]
"#,
    );

    casebook().arg("run").arg(&suite).assert().failure().stderr(
        contains("casebook::case::marker")
            .or(contains("casebook::case::invalid"))
            .or(contains("help:")),
    );
}

#[test]
fn cli_unknown_target_is_an_error() {
    let dir = TempDir::new().unwrap();
    let suite = write(&dir, "nope.yaml", "target: nope\ncases: []\n");

    casebook()
        .arg("run")
        .arg(&suite)
        .assert()
        .failure()
        .stderr(contains("unknown target 'nope'"));
}

#[test]
fn cli_generate_is_reproducible_with_a_seed() {
    let dir = TempDir::new().unwrap();
    let spec = write(
        &dir,
        "spec.yaml",
        "- {type: int, range: [0, 9]}\n- {type: tuple, size_range: [2, 2]}\n",
    );

    let run = || {
        casebook()
            .args(["generate", "--cases", "5", "--seed", "7"])
            .arg(&spec)
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let text = String::from_utf8(first.stdout).unwrap();
    assert_eq!(text.lines().count(), 5);
    assert!(text.lines().all(|line| line.contains("$tuple")));
}

#[test]
fn cli_fuzz_divide_finds_zero_division() {
    let dir = TempDir::new().unwrap();
    let spec = write(
        &dir,
        "spec.yaml",
        "- {type: int, range: [0, 3]}\n- {type: int, choices: [0]}\n",
    );

    casebook()
        .args(["fuzz", "divide"])
        .arg(&spec)
        .args(["--cases", "3", "--seed", "1"])
        .assert()
        .failure()
        .stdout(contains("unexpected fault: ZeroDivision"));
}

#[test]
fn cli_lists_targets() {
    casebook()
        .arg("targets")
        .assert()
        .success()
        .stdout(contains("divide").and(contains("compare")).and(contains("triple")));
}
