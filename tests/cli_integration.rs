//! Integration tests for the `tm` CLI.
//!
//! Each test writes a task file into a temp directory, runs `tm` as a
//! subprocess against it, and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `tm` binary.
fn tm_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tm");
    path
}

const TASKS: &str = "\
03/05,10:00,Physics,Lab report,0
01/02,,CS,Quiz,1
12/31,,Math,Final exam,0
";

/// Create a task file named `tasks.csv` in the given directory.
fn create_task_file(root: &Path) -> PathBuf {
    let path = root.join("tasks.csv");
    fs::write(&path, TASKS).unwrap();
    path
}

/// Run `tm` in `dir` with the config lookup pointed at `dir`, so the user's
/// own config is never read.
fn run_tm(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tm_bin())
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("config-home"))
        .output()
        .expect("failed to run tm");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tm` expecting success, return stdout.
fn run_tm_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tm(dir, args);
    if !success {
        panic!(
            "tm {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

// ---------------------------------------------------------------------------
// Read command tests
// ---------------------------------------------------------------------------

#[test]
fn test_list_default_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &[]);
    let quiz = out.find("Quiz").unwrap();
    let lab = out.find("Lab report").unwrap();
    let exam = out.find("Final exam").unwrap();
    assert!(quiz < lab && lab < exam);
    assert_eq!(out.matches("----- Now is ").count(), 1);
}

#[test]
fn test_list_prefixes_ids() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &["list"]);
    let quiz_line = out.lines().find(|l| l.contains("Quiz")).unwrap();
    assert!(quiz_line.starts_with("1  ⬛"));
}

#[test]
fn test_list_reverse() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &["list", "--reverse"]);
    assert!(out.find("Final exam").unwrap() < out.find("Quiz").unwrap());
}

#[test]
fn test_list_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &["--json", "list"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 4);

    let tasks: Vec<&serde_json::Value> = rows.iter().filter(|r| r["kind"] == "task").collect();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0]["description"], "Quiz");
    assert_eq!(tasks[0]["time"], "23:59");
    assert_eq!(tasks[0]["done"], true);
}

#[test]
fn test_list_explicit_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("school")).unwrap();
    fs::write(tmp.path().join("school/spring.csv"), "04/01,,Art,Sketch,0\n").unwrap();

    let out = run_tm_ok(tmp.path(), &["-f", "school/spring.csv"]);
    assert!(out.contains("Sketch"));
}

#[test]
fn test_list_missing_file_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_tm(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.contains("error: cannot load"));
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_list_malformed_file_fails_and_logs() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("tasks.csv"), "03/05,10:00,A,x,0\n13/40,,B,y,0\n").unwrap();

    let (_, stderr, success) = run_tm(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.contains("line 2 is not properly formatted"));

    let out = run_tm_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("parser: load failed"));
    assert!(out.contains("13/40,,B,y,0"));
}

#[test]
fn test_legacy_header_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("tasks.csv"),
        "Due Date,Due Time,Topic,Description,Done\n03/05,10:00,Physics,Lab,0\n",
    )
    .unwrap();

    let (_, _, success) = run_tm(tmp.path(), &["list"]);
    assert!(!success);

    let out = run_tm_ok(tmp.path(), &["--legacy-header", "list"]);
    assert!(out.contains("Physics"));
}

#[test]
fn test_config_file_sets_task_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("other.csv"), "05/05,,Bio,Reading,0\n").unwrap();
    fs::write(
        tmp.path().join("tm.toml"),
        "[storage]\nfile = \"other.csv\"\n",
    )
    .unwrap();

    let out = run_tm_ok(tmp.path(), &["--config", "tm.toml", "list"]);
    assert!(out.contains("Reading"));
}

#[test]
fn test_check_valid_and_invalid() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &["check"]);
    assert!(out.contains("all lines valid"));

    fs::write(
        tmp.path().join("tasks.csv"),
        "03/05,10:00,A,x,0\n03/05,25:00,B,y,0\n03/05,,C,z,7\n",
    )
    .unwrap();
    let (stdout, stderr, success) = run_tm(tmp.path(), &["check"]);
    assert!(!success);
    assert!(stdout.contains("line 2"));
    assert!(stdout.contains("line 3"));
    assert!(stderr.contains("2 malformed line(s)"));
}

#[test]
fn test_check_missing_file_matches_load_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_tm(tmp.path(), &["check"]);
    assert!(!success);
    assert!(stderr.contains("error: cannot load"));
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_check_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("tasks.csv"), "bad\n").unwrap();

    let (stdout, _, success) = run_tm(tmp.path(), &["check", "--json"]);
    assert!(!success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["valid"], false);
    assert_eq!(parsed["errors"][0]["line"], 1);
}

// ---------------------------------------------------------------------------
// Write command tests
// ---------------------------------------------------------------------------

#[test]
fn test_add_reports_rank_and_saves() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &["add", "01/01,09:00,CS,Reading,0"]);
    assert!(out.contains("Added task 3 at position 1"));

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "01/01,09:00,CS,Reading,0\n01/02,23:59,CS,Quiz,1\n03/05,10:00,Physics,Lab report,0\n12/31,23:59,Math,Final exam,0\n"
    );
}

#[test]
fn test_add_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &["add", "06/01,,Art,Portfolio,0", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["rank"], 2);
    assert_eq!(parsed["topic"], "Art");
}

#[test]
fn test_add_creates_missing_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_tm_ok(tmp.path(), &["add", "02/14,,Life,Flowers,0"]);
    assert_eq!(
        fs::read_to_string(tmp.path().join("tasks.csv")).unwrap(),
        "02/14,23:59,Life,Flowers,0\n"
    );
}

#[test]
fn test_add_malformed_leaves_file_untouched() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = create_task_file(tmp.path());

    let (_, stderr, success) = run_tm(tmp.path(), &["add", "14/01,,CS,Nope,0"]);
    assert!(!success);
    assert!(stderr.contains("not properly formatted"));
    assert_eq!(fs::read_to_string(&path).unwrap(), TASKS);
}

#[test]
fn test_toggle() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &["toggle", "0"]);
    assert!(out.contains("Task 0 marked done"));
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("03/05,10:00,Physics,Lab report,1"));

    let out = run_tm_ok(tmp.path(), &["toggle", "1"]);
    assert!(out.contains("Task 1 marked not done"));
}

#[test]
fn test_toggle_unknown_id() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_task_file(tmp.path());

    let (_, stderr, success) = run_tm(tmp.path(), &["toggle", "9"]);
    assert!(!success);
    assert!(stderr.contains("no task with id 9"));
}

#[test]
fn test_rm_saves_and_logs() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = create_task_file(tmp.path());

    let out = run_tm_ok(tmp.path(), &["rm", "2"]);
    assert!(out.contains("Removed task 2: Final exam"));
    assert!(!fs::read_to_string(&path).unwrap().contains("Final exam"));

    let out = run_tm_ok(tmp.path(), &["recovery", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["category"], "delete");
}

#[test]
fn test_recovery_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_tm_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("No recovery entries."));
}
