//! CLI Integration Tests
//!
//! Tests the binaries directly using assert_cmd to exercise main.rs code paths.
//!
//! # Coverage Exclusion
//! These tests are skipped during coverage runs. Run without coverage for
//! full testing.

#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn tabclean() -> Command {
    let mut cmd = Command::cargo_bin("tabclean").unwrap();
    cmd.env_remove("TABCLEAN_PREVIEW_ROWS")
        .env_remove("TABCLEAN_OUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    tabclean()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tabclean"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    tabclean()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_clean_help() {
    tabclean()
        .args(["clean", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fill-missing"))
        .stdout(predicate::str::contains("--drop"));
}

#[test]
fn test_server_help() {
    Command::cargo_bin("tabclean-server")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("/api/v1/convert"))
        .stdout(predicate::str::contains("--max-upload-mb"));
}

// ═══════════════════════════════════════════════════════════════════════════
// PREVIEW AND COLUMNS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_preview_command() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "data.csv", "a,b\n1,\n,4\n");

    tabclean()
        .arg("preview")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("data.csv"))
        .stdout(predicate::str::contains("2 rows × 2 columns"))
        .stdout(predicate::str::contains("NaN"));
}

#[test]
fn test_preview_unsupported_file_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "notes.txt", "a\n1\n");

    tabclean()
        .arg("preview")
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_columns_command() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "data.csv", "id,name\n1,ann\n2,\n");

    tabclean()
        .arg("columns")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Integer"))
        .stdout(predicate::str::contains("1 missing"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CLEAN
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_clean_fill_to_csv() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "data.csv", "a,b\n1,\n,4\n");
    let out_dir = dir.path().join("out");

    tabclean()
        .arg("clean")
        .arg(&file)
        .args(["--fill-missing", "--format", "csv", "-o"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing values filled"))
        .stdout(predicate::str::contains("data_cleaned.csv"));

    let written = fs::read_to_string(out_dir.join("data_cleaned.csv")).unwrap();
    assert_eq!(written, "a,b\n1.0,4.0\n1.0,4.0\n");
}

#[test]
fn test_clean_drop_to_excel() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "sales.csv", "a,b,c\n1,2,3\n");

    tabclean()
        .arg("clean")
        .arg(&file)
        .args(["--drop", "b,c", "--format", "excel", "-o"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Dropped columns: b, c"));

    let bytes = fs::read(dir.path().join("sales_cleaned.xlsx")).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_clean_unknown_column_fails_but_processes_rest() {
    let dir = TempDir::new().unwrap();
    let first = write_file(&dir, "first.csv", "a\n1\n");
    let second = write_file(&dir, "second.csv", "a,b\n1,2\n");

    tabclean()
        .arg("clean")
        .arg(&first)
        .arg(&second)
        .args(["--drop", "b", "--format", "csv", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown column(s): b"));

    assert!(!dir.path().join("first_cleaned.csv").exists());
    let written = fs::read_to_string(dir.path().join("second_cleaned.csv")).unwrap();
    assert_eq!(written, "a\n1\n");
}

#[test]
fn test_clean_without_format_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "data.csv", "a\n1\n");

    tabclean()
        .arg("clean")
        .arg(&file)
        .arg("-o")
        .arg(dir.path())
        .assert()
        .success();

    assert!(!dir.path().join("data_cleaned.csv").exists());
}

#[test]
fn test_clean_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "data.csv", "a\n1\n");

    tabclean()
        .arg("clean")
        .arg(&file)
        .args(["--format", "pdf"])
        .assert()
        .failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// CHART
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_chart_terminal_output() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "nums.csv", "x,y,label\n1,2,a\n3,4,b\n");

    tabclean()
        .arg("chart")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("x, y"))
        .stdout(predicate::str::contains("█"));
}

#[test]
fn test_chart_svg_output() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "nums.csv", "x\n1\n-2\n");
    let svg = dir.path().join("chart.svg");

    tabclean()
        .arg("chart")
        .arg(&file)
        .arg("--svg")
        .arg(&svg)
        .assert()
        .success();

    assert!(fs::read_to_string(svg).unwrap().contains("<svg"));
}

#[test]
fn test_chart_text_only_file() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "names.csv", "name\nann\n");

    tabclean()
        .arg("chart")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No numeric columns"));
}
