use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

const BIN: &str = env!("CARGO_BIN_EXE_artifact-detective");

/// Fixtures are shared with the library crate's integration tests.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("detective")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run artifact-detective")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// detect
// ---------------------------------------------------------------------------

#[test]
fn detect_reports_types_for_each_path() {
    let junit = fixture("junit.xml");
    let png = fixture("screenshot.png");
    let output = run(&["detect", arg(&junit), arg(&png)]);

    assert!(output.status.success());
    let entries = stdout_json(&output);
    assert_eq!(entries[0]["detectedType"], "junit-xml");
    assert_eq!(entries[0]["originalFormat"], "xml");
    assert_eq!(entries[1]["detectedType"], "binary");
    assert_eq!(entries[1]["isBinary"], true);
}

#[test]
fn detect_yaml_output() {
    let tsc = fixture("tsc.txt");
    let output = run(&["--format", "yaml", "detect", arg(&tsc)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("detectedType: tsc-txt"), "stdout: {stdout}");
}

#[test]
fn detect_with_custom_mapping_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("detective.yml");
    fs::write(&config, "custom_artifact_types:\n  - pattern: '^notes\\.txt$'\n    type: black-txt\n").unwrap();

    let notes = fixture("notes.txt");
    let output = run(&["detect", "--config", arg(&config), arg(&notes)]);

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)[0]["detectedType"], "black-txt");
}

#[test]
fn detect_missing_file_fails() {
    let output = run(&["detect", "/definitely/not/here.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_matching_type() {
    let mypy = fixture("mypy.txt");
    let output = run(&["validate", "--type", "mypy-txt", arg(&mypy)]);

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["valid"], true);
}

#[test]
fn validate_rejects_foreign_content() {
    let mypy = fixture("mypy.txt");
    let output = run(&["validate", "--type", "eslint-txt", arg(&mypy)]);

    assert_eq!(output.status.code(), Some(1));
    let result = stdout_json(&output);
    assert_eq!(result["valid"], false);
    assert!(result["error"].as_str().is_some());
}

#[test]
fn validate_unknown_type_is_invalid() {
    let mypy = fixture("mypy.txt");
    let output = run(&["validate", "--type", "not-a-type", arg(&mypy)]);
    assert_eq!(output.status.code(), Some(1));
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

#[test]
fn extract_pytest_html_to_stdout() {
    let report = fixture("pytest-report.html");
    let output = run(&["extract", "pytest-html", arg(&report)]);

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["tests"].as_array().unwrap().len(), 7);
    assert_eq!(json["exitCode"], 1);
}

#[test]
fn extract_playwright_html_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("playwright.json");
    let report = fixture("playwright-report.html");
    let output = run(&["extract", "playwright-html", arg(&report), "--output", arg(&target)]);

    assert!(output.status.success());
    let json: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(json["stats"]["total"], 4);
    assert_eq!(json["suites"].as_array().unwrap().len(), 2);
}

#[test]
fn extract_without_embedded_report_exits_2() {
    let plain = fixture("plain.html");
    let output = run(&["extract", "playwright-html", arg(&plain)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

// ---------------------------------------------------------------------------
// extract-linter
// ---------------------------------------------------------------------------

#[test]
fn extract_linter_detects_mypy() {
    let log = fixture("mypy-job.log");
    let output = run(&["extract-linter", "--job", "type-check", arg(&log)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "Found 2 errors in 1 file (checked 3 source files)");
}

#[test]
fn extract_linter_without_linter_exits_2() {
    let log = fixture("build-job.log");
    let output = run(&["extract-linter", "--job", "build", arg(&log)]);
    assert_eq!(output.status.code(), Some(2));

    let forced = run(&["extract-linter", "--linter", "mypy", arg(&log)]);
    assert_eq!(forced.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// collect
// ---------------------------------------------------------------------------

#[test]
fn collect_saves_linter_outputs() {
    let logs = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let log = logs.path().join("typecheck.log");
    fs::copy(fixture("mypy-job.log"), &log).unwrap();

    let pair = format!("42={}", log.display());
    let output = run(&["collect", "--output", arg(output_dir.path()), &pair]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["linterOutputs"]["42"][0]["detectedType"], "mypy-txt");

    let saved = output_dir.path().join("linting").join("42").join("typecheck-mypy.txt");
    assert!(saved.exists());
}

#[test]
fn collect_nothing_found_exits_2() {
    let output_dir = tempfile::tempdir().unwrap();
    let pair = format!("7={}", fixture("build-job.log").display());
    let output = run(&["collect", "--output", arg(output_dir.path()), &pair]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_json(&output)["linterOutputs"], serde_json::json!({}));
}

#[test]
fn collect_requires_output_dir() {
    let pair = format!("7={}", fixture("build-job.log").display());
    let output = run(&["collect", &pair]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn verbose_flag_emits_logs_on_stderr() {
    let output_dir = tempfile::tempdir().unwrap();
    let pair = format!("9={}", fixture("mypy-job.log").display());
    let output = run(&["-v", "collect", "--output", arg(output_dir.path()), &pair]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Saved linter output"));
}

#[test]
fn types_lists_catalog_descriptors() {
    let output = run(&["types"]);

    assert!(output.status.success());
    let descriptors = stdout_json(&output);
    let pytest = descriptors
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["artifactType"] == "pytest-json")
        .expect("pytest-json should be cataloged");
    assert_eq!(pytest["normalizedFrom"], "pytest-html");
    assert_eq!(pytest["fileExtension"], "json");
}
