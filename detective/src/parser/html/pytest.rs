//! pytest-html report extraction.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use artifact_detective_core::{PytestReport, PytestTest, TestPhase};
use regex::Regex;
use scraper::{ElementRef, Html};
use serde_json::{Map, Value};
use tracing::debug;

use super::{normalize_outcome, parse_duration, read_html, script_texts, selector};
use crate::error::Result;

static DATA_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:var\s+data|let\s+data|const\s+data|window\.data)\s*=\s*(\{.*?\});?\s*$")
        .expect("static regex must compile")
});

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("static regex must compile")
});

/// Test results as embedded by the different pytest-html generations.
#[derive(Debug, Clone, PartialEq)]
pub enum PytestPayload {
    /// Result history keyed by node id, oldest attempt first (pytest-html 4).
    History(Map<String, Value>),
    /// One record per test.
    Flat(Vec<Value>),
}

impl PytestPayload {
    /// Classifies the `tests` member of an embedded report.
    pub fn from_tests(tests: &Value) -> Self {
        match tests {
            Value::Object(history) => Self::History(history.clone()),
            Value::Array(records) => Self::Flat(records.clone()),
            _ => Self::Flat(Vec::new()),
        }
    }

    /// Normalizes the payload into canonical tests.
    ///
    /// For a history, the last attempt of each node id is authoritative and
    /// ids without attempts are dropped.
    pub fn into_tests(self) -> Vec<PytestTest> {
        match self {
            Self::History(history) => history
                .iter()
                .filter_map(|(nodeid, attempts)| {
                    let last = attempts.as_array()?.last()?;
                    Some(history_test(nodeid, last))
                })
                .collect(),
            Self::Flat(records) => records.iter().map(flat_test).collect(),
        }
    }
}

fn history_test(nodeid: &str, result: &Value) -> PytestTest {
    let label = result
        .get("result")
        .or_else(|| result.get("outcome"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mut test = PytestTest::new(
        nodeid,
        normalize_outcome(label),
        result.get("duration").map(parse_duration).unwrap_or(0.0),
    );
    test.log = result
        .get("log")
        .and_then(Value::as_str)
        .filter(|log| !log.is_empty())
        .map(str::to_string);
    test.extras = result
        .get("extras")
        .and_then(Value::as_array)
        .filter(|extras| !extras.is_empty())
        .cloned();
    attach_phases(&mut test, result);
    test
}

fn flat_test(record: &Value) -> PytestTest {
    let nodeid = record
        .get("nodeid")
        .or_else(|| record.get("id"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let outcome = record.get("outcome").and_then(Value::as_str).unwrap_or("unknown");
    let duration = record.get("duration").and_then(Value::as_f64).unwrap_or(0.0);

    let mut test = PytestTest::new(nodeid, outcome, duration);
    attach_phases(&mut test, record);
    test
}

fn attach_phases(test: &mut PytestTest, record: &Value) {
    let phase = |name: &str| record.get(name).and_then(phase_from_value);
    test.setup = phase("setup");
    test.call = phase("call");
    test.teardown = phase("teardown");
}

/// Any object is a phase; fields that do not fit the model stay in `extra`.
fn phase_from_value(value: &Value) -> Option<TestPhase> {
    let mut fields = value.as_object()?.clone();
    let duration = fields
        .remove("duration")
        .map(|duration| parse_duration(&duration))
        .unwrap_or(0.0);
    let outcome = fields
        .remove("outcome")
        .and_then(|outcome| outcome.as_str().map(str::to_string))
        .unwrap_or_default();
    let longrepr = fields.remove("longrepr").filter(|longrepr| !longrepr.is_null());

    Some(TestPhase {
        duration,
        outcome,
        longrepr,
        extra: fields,
    })
}

fn report_from_payload(data: &Value) -> PytestReport {
    let created = data
        .get("created")
        .and_then(Value::as_f64)
        .unwrap_or_else(now_millis);
    let tests = PytestPayload::from_tests(data.get("tests").unwrap_or(&Value::Null)).into_tests();

    let mut report = PytestReport::from_tests(created, tests);
    report.root = data
        .get("root")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    report.environment = data
        .get("environment")
        .and_then(Value::as_object)
        .map(|env| env.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_else(BTreeMap::new);
    report
}

fn now_millis() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64
}

/// Extracts a [`PytestReport`] from a pytest-html file.
///
/// # Errors
///
/// Returns [`DetectiveError::Io`](crate::DetectiveError::Io) when the file
/// cannot be read. Documents without recognizable results yield `Ok(None)`.
pub fn extract_pytest_json(path: impl AsRef<Path>) -> Result<Option<PytestReport>> {
    let path = path.as_ref();
    let html = read_html(path)?;
    let report = pytest_report_from_html(&html);
    debug!(path = %path.display(), found = report.is_some(), "Extracted pytest-html report");
    Ok(report)
}

/// Extracts a [`PytestReport`] from pytest-html markup.
///
/// Embedded JSON is preferred: first the `data-jsonblob` attribute of
/// `#data-container`, then a `data = {...}` script assignment. Older reports
/// without embedded data fall back to scraping the results table.
pub fn pytest_report_from_html(html: &str) -> Option<PytestReport> {
    let document = Html::parse_document(html);
    embedded_payload(&document)
        .map(|data| report_from_payload(&data))
        .or_else(|| scrape_results_table(&document))
}

fn embedded_payload(document: &Html) -> Option<Value> {
    let container = selector("#data-container");
    let from_blob = document
        .select(&container)
        .filter_map(|element| element.value().attr("data-jsonblob"))
        .find_map(parse_object);
    if from_blob.is_some() {
        return from_blob;
    }

    script_texts(document).iter().find_map(|script| {
        let captures = DATA_ASSIGNMENT.captures(script)?;
        parse_object(captures.get(1)?.as_str())
    })
}

fn parse_object(json: &str) -> Option<Value> {
    serde_json::from_str::<Value>(json)
        .ok()
        .filter(Value::is_object)
}

fn scrape_results_table(document: &Html) -> Option<PytestReport> {
    let results_table = selector("#results-table, table.results, .results table");
    let rows = selector("tbody tr");

    let row_elements: Vec<ElementRef<'_>> = match document.select(&results_table).next() {
        Some(table) => table.select(&rows).collect(),
        None => document.select(&selector("table tbody tr")).collect(),
    };

    let tests: Vec<PytestTest> = row_elements.into_iter().filter_map(row_test).collect();
    if tests.is_empty() {
        return None;
    }
    Some(PytestReport::from_tests(now_millis(), tests))
}

fn row_test(row: ElementRef<'_>) -> Option<PytestTest> {
    let cell = selector("td");
    let cells: Vec<String> = row
        .select(&cell)
        .map(|td| td.text().collect::<String>().trim().to_string())
        .collect();
    if cells.len() < 2 {
        return None;
    }

    let name = &cells[0];
    let outcome = cells[1].to_lowercase();
    if name.is_empty() || outcome.is_empty() {
        return None;
    }
    let duration = cells.get(2).map(|text| leading_number(text)).unwrap_or(0.0);
    Some(PytestTest::new(name.as_str(), outcome, duration))
}

/// Parses the longest numeric prefix of a cell, so `"0.12 s"` and `"1.25s"`
/// both yield their number. Cells without one yield `0.0`.
fn leading_number(text: &str) -> f64 {
    LEADING_NUMBER
        .find(text.trim_start())
        .and_then(|number| number.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_history_uses_last_attempt() {
        let payload = PytestPayload::from_tests(&json!({
            "tests/test_a.py::test_retry": [
                {"result": "Failed", "duration": "00:00:01"},
                {"result": "Passed", "duration": "00:00:02"}
            ],
            "tests/test_a.py::test_never_ran": []
        }));
        let tests = payload.into_tests();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].outcome, "passed");
        assert_eq!(tests[0].duration, 2.0);
    }

    #[test]
    fn test_history_keeps_log_and_extras() {
        let tests = PytestPayload::from_tests(&json!({
            "t::x": [{
                "result": "Failed",
                "duration": 0.5,
                "log": "AssertionError: boom",
                "extras": [{"name": "screenshot", "format_type": "image"}],
                "call": {"duration": 0.5, "outcome": "failed", "longrepr": "boom"}
            }],
            "t::y": [{"result": "Passed", "extras": []}]
        }))
        .into_tests();

        let failed = &tests[0];
        assert_eq!(failed.log.as_deref(), Some("AssertionError: boom"));
        assert_eq!(failed.extras.as_ref().map(Vec::len), Some(1));
        assert_eq!(failed.call.as_ref().map(|c| c.outcome.as_str()), Some("failed"));
        assert!(tests[1].extras.is_none());
    }

    #[test]
    fn test_history_keeps_source_order() {
        let tests = PytestPayload::from_tests(&json!({
            "tests/test_z.py::test_first": [{"result": "Passed"}],
            "tests/test_a.py::test_second": [{"result": "Failed"}],
            "tests/test_m.py::test_third": [{"result": "Skipped"}]
        }))
        .into_tests();

        let order: Vec<&str> = tests.iter().map(|test| test.nodeid.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "tests/test_z.py::test_first",
                "tests/test_a.py::test_second",
                "tests/test_m.py::test_third",
            ]
        );
    }

    #[test]
    fn test_phases_survive_structured_longrepr_and_clock_durations() {
        let tests = PytestPayload::from_tests(&json!({
            "t::crash": [{
                "result": "Failed",
                "setup": {"duration": "00:00:01", "outcome": "passed"},
                "call": {
                    "duration": 0.5,
                    "outcome": "failed",
                    "longrepr": {"reprcrash": {"path": "t.py", "lineno": 7, "message": "boom"}},
                    "traceback": ["t.py:7"]
                },
                "teardown": {"duration": 0.0, "outcome": "passed", "longrepr": null}
            }]
        }))
        .into_tests();

        let test = &tests[0];
        let setup = test.setup.as_ref().expect("setup phase should be kept");
        assert_eq!(setup.duration, 1.0);
        assert_eq!(setup.outcome, "passed");

        let call = test.call.as_ref().expect("call phase should be kept");
        assert_eq!(call.duration, 0.5);
        assert_eq!(call.longrepr.as_ref().unwrap()["reprcrash"]["lineno"], 7);
        assert_eq!(call.extra["traceback"], json!(["t.py:7"]));

        let teardown = test.teardown.as_ref().expect("teardown phase should be kept");
        assert_eq!(teardown.longrepr, None);
        assert!(teardown.extra.is_empty());
    }

    #[test]
    fn test_flat_records_map_directly() {
        let tests = PytestPayload::from_tests(&json!([
            {"nodeid": "a", "outcome": "passed", "duration": 0.1},
            {"id": "b", "outcome": "failed"},
            {}
        ]))
        .into_tests();
        assert_eq!(tests[0].nodeid, "a");
        assert_eq!(tests[1].nodeid, "b");
        assert_eq!(tests[1].duration, 0.0);
        assert_eq!(tests[2].nodeid, "unknown");
        assert_eq!(tests[2].outcome, "unknown");
    }

    #[test]
    fn test_flat_payload_aggregates_exit_code() {
        let report = report_from_payload(&json!({
            "created": 1700000000.0,
            "tests": [{"nodeid": "a", "outcome": "passed", "duration": 1.0},
                      {"nodeid": "b", "outcome": "failed", "duration": 2.0}]
        }));
        assert_eq!(report.duration, 3.0);
        assert_eq!(report.exit_code, 1);
        assert_eq!(report.created, 1700000000.0);
    }

    #[test]
    fn test_script_assignment_strategy() {
        let html = r#"<html><body><script>
            var data = {"environment": {"Python": "3.12"}, "tests": {"t::ok": [{"result": "Passed", "duration": "00:00:00"}]}};
        </script></body></html>"#;
        let report = pytest_report_from_html(html).unwrap();
        assert_eq!(report.tests.len(), 1);
        assert_eq!(report.environment.get("Python"), Some(&json!("3.12")));
        assert_eq!(report.exit_code, 0);
    }

    #[test]
    fn test_invalid_blob_falls_back_to_table() {
        let html = r#"<html><body>
            <div id="data-container" data-jsonblob="not json"></div>
            <table id="results-table"><tbody>
              <tr><td>test_one</td><td>Passed</td><td>0.50</td></tr>
              <tr><td>test_two</td><td>Failed</td><td>1.25 s</td></tr>
              <tr><td colspan="3">log row</td></tr>
            </tbody></table></body></html>"#;
        let report = pytest_report_from_html(html).unwrap();
        assert_eq!(report.tests.len(), 2);
        assert_eq!(report.tests[1].outcome, "failed");
        assert_eq!(report.duration, 1.75);
        assert_eq!(report.exit_code, 1);
    }

    #[test]
    fn test_document_without_results_is_none() {
        assert!(pytest_report_from_html("<html><body><p>nothing</p></body></html>").is_none());
        assert!(pytest_report_from_html("").is_none());
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("0.12 s"), 0.12);
        assert_eq!(leading_number("1.25s"), 1.25);
        assert_eq!(leading_number(" 3ms"), 3.0);
        assert_eq!(leading_number(".5 s"), 0.5);
        assert_eq!(leading_number("2e1s"), 20.0);
        assert_eq!(leading_number("n/a"), 0.0);
        assert_eq!(leading_number(""), 0.0);
    }
}
