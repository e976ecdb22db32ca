//! Playwright HTML report extraction.
//!
//! The HTML reporter ships a single page whose script either assigns a
//! base64 data URL holding a zip of JSON files, or (older versions) assigns
//! the report object directly. The zip carries `report.json` with per-file
//! test summaries and one `<fileId>.json` per test file with full results.

use std::path::Path;
use std::sync::LazyLock;

use artifact_detective_core::{
    OUTCOME_FAILED, OUTCOME_FLAKY, OUTCOME_PASSED, OUTCOME_SKIPPED, PlaywrightReport,
    PlaywrightStats, PlaywrightSuite, PlaywrightTest,
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use regex::Regex;
use scraper::Html;
use serde_json::Value;
use tracing::debug;

use super::zip::ZipArchive;
use super::{normalize_outcome, read_html, script_texts};
use crate::error::Result;

static BASE64_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.playwrightReportBase64\s*=\s*["']data:application/zip;base64,([A-Za-z0-9+/=\s]+)["']"#)
        .expect("static regex must compile")
});

static JSON_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)window\.playwrightReport\s*=\s*(\{.*\})\s*;?\s*$").expect("static regex must compile")
});

const REPORT_ENTRY: &str = "report.json";

/// Raw report JSON plus the per-file detail documents that accompany it.
struct EmbeddedReport {
    report: Value,
    files: Vec<(String, Value)>,
}

impl EmbeddedReport {
    fn file_detail(&self, file_id: &str) -> Option<&Value> {
        self.files
            .iter()
            .find(|(id, _)| id == file_id)
            .map(|(_, detail)| detail)
    }
}

/// Extracts a [`PlaywrightReport`] from a Playwright HTML report file.
///
/// # Errors
///
/// Returns [`DetectiveError::Io`](crate::DetectiveError::Io) when the file
/// cannot be read. Documents without an embedded report yield `Ok(None)`.
pub fn extract_playwright_json(path: impl AsRef<Path>) -> Result<Option<PlaywrightReport>> {
    let path = path.as_ref();
    let html = read_html(path)?;
    let report = playwright_report_from_html(&html);
    debug!(path = %path.display(), found = report.is_some(), "Extracted Playwright report");
    Ok(report)
}

/// Extracts a [`PlaywrightReport`] from Playwright HTML report markup.
pub fn playwright_report_from_html(html: &str) -> Option<PlaywrightReport> {
    let document = Html::parse_document(html);
    let scripts = script_texts(&document);

    let embedded = scripts
        .iter()
        .find_map(|script| from_base64_archive(script))
        .or_else(|| scripts.iter().find_map(|script| from_json_assignment(script)))?;
    Some(normalize(&embedded))
}

fn from_base64_archive(script: &str) -> Option<EmbeddedReport> {
    let captures = BASE64_ASSIGNMENT.captures(script)?;
    let encoded: String = captures
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| debug!(error = %e, "Invalid base64 in Playwright report"))
        .ok()?;

    let archive = ZipArchive::open(&bytes)?;
    let report = parse_entry(&archive, REPORT_ENTRY)?;
    let files = archive
        .names()
        .filter(|name| *name != REPORT_ENTRY)
        .filter_map(|name| {
            let file_id = name.strip_suffix(".json")?;
            Some((file_id.to_string(), parse_entry(&archive, name)?))
        })
        .collect();
    Some(EmbeddedReport { report, files })
}

fn parse_entry(archive: &ZipArchive<'_>, name: &str) -> Option<Value> {
    let bytes = archive.read(name)?;
    serde_json::from_slice::<Value>(&bytes)
        .ok()
        .filter(Value::is_object)
}

fn from_json_assignment(script: &str) -> Option<EmbeddedReport> {
    let captures = JSON_ASSIGNMENT.captures(script)?;
    let report = serde_json::from_str::<Value>(captures.get(1)?.as_str())
        .ok()
        .filter(Value::is_object)?;
    Some(EmbeddedReport {
        report,
        files: Vec::new(),
    })
}

/// Maps Playwright's expectation-based outcome onto canonical outcomes.
fn playwright_outcome(raw: &str) -> String {
    match raw {
        "expected" => OUTCOME_PASSED.to_string(),
        "unexpected" => OUTCOME_FAILED.to_string(),
        "flaky" => OUTCOME_FLAKY.to_string(),
        "skipped" => OUTCOME_SKIPPED.to_string(),
        other => normalize_outcome(other),
    }
}

fn normalize(embedded: &EmbeddedReport) -> PlaywrightReport {
    let report = &embedded.report;
    let suites: Vec<PlaywrightSuite> = report
        .get("files")
        .and_then(Value::as_array)
        .map(|files| files.iter().map(|file| suite(file, embedded)).collect())
        .unwrap_or_default();

    let stats = report
        .get("stats")
        .and_then(|stats| serde_json::from_value::<PlaywrightStats>(stats.clone()).ok())
        .unwrap_or_else(|| PlaywrightStats::from_suites(&suites));

    PlaywrightReport {
        metadata: report.get("metadata").filter(|m| !m.is_null()).cloned(),
        start_time: report.get("startTime").and_then(Value::as_f64),
        duration: report.get("duration").and_then(Value::as_f64).unwrap_or(0.0),
        exit_code: i32::from(stats.unexpected > 0),
        suites,
        stats,
    }
}

fn suite(file: &Value, embedded: &EmbeddedReport) -> PlaywrightSuite {
    let file_name = str_field(file, "fileName");
    let detail = file
        .get("fileId")
        .and_then(Value::as_str)
        .and_then(|id| embedded.file_detail(id));

    let tests = file
        .get("tests")
        .and_then(Value::as_array)
        .map(|summaries| {
            summaries
                .iter()
                .map(|summary| {
                    let full = detail.and_then(|d| detail_test(d, summary)).unwrap_or(summary);
                    test_case(full)
                })
                .collect()
        })
        .unwrap_or_default();

    PlaywrightSuite {
        title: file_name.clone(),
        file: file_name,
        tests,
    }
}

/// Finds the full test case matching `summary` in a per-file document.
fn detail_test<'d>(detail: &'d Value, summary: &Value) -> Option<&'d Value> {
    let test_id = summary.get("testId")?;
    detail
        .get("tests")?
        .as_array()?
        .iter()
        .find(|test| test.get("testId") == Some(test_id))
}

fn test_case(test: &Value) -> PlaywrightTest {
    let location = test.get("location");
    let results = test.get("results").and_then(Value::as_array);

    PlaywrightTest {
        title: str_field(test, "title"),
        project_name: str_field(test, "projectName"),
        outcome: playwright_outcome(test.get("outcome").and_then(Value::as_str).unwrap_or_default()),
        duration: test.get("duration").and_then(Value::as_f64).unwrap_or(0.0),
        line: location.and_then(|l| l.get("line")).and_then(Value::as_u64),
        column: location.and_then(|l| l.get("column")).and_then(Value::as_u64),
        retries: results
            .map(|r| u32::try_from(r.len().saturating_sub(1)).unwrap_or(u32::MAX))
            .unwrap_or(0),
        error: results.and_then(|r| r.iter().find_map(first_error)),
    }
}

fn first_error(result: &Value) -> Option<String> {
    let error = result.get("errors")?.as_array()?.first()?;
    match error {
        Value::String(message) => Some(message.clone()),
        other => other.get("message").and_then(Value::as_str).map(str::to_string),
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::zip::build_zip;
    use super::*;

    fn report_json() -> Value {
        json!({
            "metadata": {"actualWorkers": 2},
            "startTime": 1714557600000.0,
            "duration": 5120.5,
            "files": [{
                "fileId": "a1b2c3",
                "fileName": "login.spec.ts",
                "tests": [
                    {"testId": "t1", "title": "logs in", "projectName": "chromium",
                     "location": {"file": "login.spec.ts", "line": 4, "column": 5},
                     "outcome": "expected", "duration": 1200.0, "results": [{}]},
                    {"testId": "t2", "title": "rejects bad password", "projectName": "chromium",
                     "location": {"file": "login.spec.ts", "line": 12, "column": 5},
                     "outcome": "unexpected", "duration": 3000.0, "results": [{}, {}]}
                ]
            }],
            "stats": {"total": 2, "expected": 1, "unexpected": 1, "flaky": 0, "skipped": 0, "ok": false}
        })
    }

    fn file_detail() -> Value {
        json!({
            "fileId": "a1b2c3",
            "fileName": "login.spec.ts",
            "tests": [
                {"testId": "t2", "title": "rejects bad password", "projectName": "chromium",
                 "location": {"file": "login.spec.ts", "line": 12, "column": 5},
                 "outcome": "unexpected", "duration": 3000.0,
                 "results": [
                     {"retry": 0, "status": "failed", "errors": [{"message": "Error: expect(received).toBe(expected)"}]},
                     {"retry": 1, "status": "failed", "errors": ["Timed out"]}
                 ]}
            ]
        })
    }

    fn page(script: &str) -> String {
        format!("<!DOCTYPE html><html><head><title>Playwright Test Report</title></head><body><div id=\"root\"></div><script>{script}</script></body></html>")
    }

    #[test]
    fn test_base64_zip_strategy() {
        let report = serde_json::to_vec(&report_json()).unwrap();
        let detail = serde_json::to_vec(&file_detail()).unwrap();
        let zip = build_zip(&[("report.json", &report), ("a1b2c3.json", &detail)], true);
        let script = format!(
            "window.playwrightReportBase64 = \"data:application/zip;base64,{}\";",
            BASE64.encode(zip)
        );

        let extracted = playwright_report_from_html(&page(&script)).unwrap();
        assert_eq!(extracted.suites.len(), 1);
        assert_eq!(extracted.suites[0].file, "login.spec.ts");

        let tests: Vec<_> = extracted.tests().collect();
        assert_eq!(tests[0].outcome, "passed");
        assert_eq!(tests[0].line, Some(4));
        assert_eq!(tests[1].outcome, "failed");
        assert_eq!(tests[1].retries, 1);
        assert_eq!(tests[1].error.as_deref(), Some("Error: expect(received).toBe(expected)"));
        assert_eq!(extracted.stats.unexpected, 1);
        assert_eq!(extracted.exit_code, 1);
        assert_eq!(extracted.duration, 5120.5);
    }

    #[test]
    fn test_json_assignment_strategy_recomputes_missing_stats() {
        let mut report = report_json();
        report.as_object_mut().unwrap().remove("stats");
        let script = format!("window.playwrightReport = {report};");

        let extracted = playwright_report_from_html(&page(&script)).unwrap();
        assert_eq!(extracted.stats.total, 2);
        assert_eq!(extracted.stats.expected, 1);
        assert_eq!(extracted.stats.unexpected, 1);
        assert_eq!(extracted.tests().nth(1).unwrap().error, None);
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(playwright_outcome("expected"), "passed");
        assert_eq!(playwright_outcome("unexpected"), "failed");
        assert_eq!(playwright_outcome("flaky"), "flaky");
        assert_eq!(playwright_outcome("skipped"), "skipped");
        assert_eq!(playwright_outcome("timedOut"), "timedout");
    }

    #[test]
    fn test_page_without_report_is_none() {
        assert!(playwright_report_from_html(&page("console.log('hi');")).is_none());
        let broken = page("window.playwrightReportBase64 = \"data:application/zip;base64,AAAA\";");
        assert!(playwright_report_from_html(&broken).is_none());
    }
}
