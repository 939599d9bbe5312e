//! Command-line surface tests. None of these reach the network: every case
//! fails (or exits) before the first provider request is sent.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn quotegate(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_quotegate"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("failed to spawn quotegate")
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn wrong_argument_count_prints_usage_and_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("nyse.csv"), "Symbol,Name\nAAPL,Apple\n").unwrap();

    let out = quotegate(dir.path(), &["nyse.csv", "2024-01-01"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
    assert_eq!(dir_entries(dir.path()), vec!["nyse.csv"]);
}

#[test]
fn too_many_arguments_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let out = quotegate(
        dir.path(),
        &["a.csv", "2024-01-01", "2024-02-01", "nyse", "extra"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn help_exits_0() {
    let dir = tempfile::tempdir().unwrap();
    let out = quotegate(dir.path(), &["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("EXCHANGE"));
}

#[test]
fn invalid_exchange_names_the_tag_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("list.csv"), "Symbol,Name\nAAPL,Apple\n").unwrap();

    let out = quotegate(dir.path(), &["list.csv", "2024-01-01", "2024-02-01", "lse"]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid exchange 'lse'"), "stderr: {stderr}");
    assert_eq!(dir_entries(dir.path()), vec!["list.csv"]);
}

#[test]
fn missing_input_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let out = quotegate(dir.path(), &["absent.csv", "2024-01-01", "2024-02-01", "nasdaq"]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn malformed_listing_aborts_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("list.csv"), "Symbol,Name\nAAPL,Apple\nMSFT\n").unwrap();

    let out = quotegate(dir.path(), &["list.csv", "2024-01-01", "2024-02-01"]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("malformed row at line 3"), "stderr: {stderr}");
    assert_eq!(dir_entries(dir.path()), vec!["list.csv"]);
}

#[test]
fn invalid_date_is_a_provider_failure_and_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("list.csv"), "Symbol,Name\nAAPL,Apple\n").unwrap();

    let out = quotegate(dir.path(), &["list.csv", "2024-13-45", "2024-02-01"]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid request"), "stderr: {stderr}");
    assert!(!dir.path().join("removed_data").exists());
    assert!(!dir.path().join("pre_processed_data").exists());
}
