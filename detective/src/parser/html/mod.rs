//! Extraction of machine-readable results embedded in HTML test reports.
//!
//! Reporters that produce self-contained HTML usually embed their results as
//! JSON somewhere in the page. Each extractor tries its embedding strategies
//! in order and normalizes the first payload it finds into a canonical
//! report. Malformed or foreign documents yield `Ok(None)`; only an
//! unreadable file is an error.

mod playwright;
mod pytest;
mod zip;

use std::path::Path;

use artifact_detective_core::{OUTCOME_ERROR, OUTCOME_FAILED, OUTCOME_PASSED, OUTCOME_SKIPPED};
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::{DetectiveError, Result};

pub use playwright::{extract_playwright_json, playwright_report_from_html};
pub use pytest::{PytestPayload, extract_pytest_json, pytest_report_from_html};

/// Converts a duration value to seconds.
///
/// Numbers pass through, `HH:MM:SS` strings are expanded, and anything else
/// is `0`.
///
/// # Examples
///
/// ```
/// use artifact_detective::parser::html::parse_duration;
/// use serde_json::json;
///
/// assert_eq!(parse_duration(&json!("01:02:03")), 3723.0);
/// assert_eq!(parse_duration(&json!(0.25)), 0.25);
/// assert_eq!(parse_duration(&json!("soon")), 0.0);
/// ```
pub fn parse_duration(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_clock(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_clock(s: &str) -> Option<f64> {
    let parts: Vec<f64> = s
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<f64>().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => None,
    }
}

/// Maps a reporter's result label onto the canonical outcome vocabulary.
///
/// Matching is by substring on the lower-cased label and `pass` is checked
/// first, so `"Passed"` and `"XPASS"` both become `passed`. Labels that match
/// nothing are returned lower-cased.
pub fn normalize_outcome(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let canonical = [
        ("pass", OUTCOME_PASSED),
        ("fail", OUTCOME_FAILED),
        ("skip", OUTCOME_SKIPPED),
        ("error", OUTCOME_ERROR),
    ]
    .into_iter()
    .find(|(needle, _)| lower.contains(needle))
    .map(|(_, outcome)| outcome);

    match canonical {
        Some(outcome) => outcome.to_string(),
        None => lower,
    }
}

fn read_html(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| DetectiveError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn selector(css: &str) -> Selector {
    // Only called with literal selectors covered by tests.
    Selector::parse(css).expect("static selector must parse")
}

/// Text of every `<script>` element, in document order.
fn script_texts(document: &Html) -> Vec<String> {
    let scripts = selector("script");
    document
        .select(&scripts)
        .map(|script| script.text().collect::<String>())
        .collect()
}
