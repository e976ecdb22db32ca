//! Structural shape predicates for JSON and NDJSON artifacts.
//!
//! These are presence/array-ness checks only; they never look at tool
//! business rules. The detector uses them to classify documents and the
//! validators use the same predicates to accept them.

use serde_json::Value;

/// Number of leading non-empty lines inspected when sniffing NDJSON.
pub const NDJSON_SNIFF_LINES: usize = 50;

fn has_array(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(Value::is_array)
}

fn has_string(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(Value::is_string)
}

fn first_element(value: &Value) -> Option<&Value> {
    value.as_array().and_then(|items| items.first())
}

/// Playwright JSON reporter: `config` object and `suites` array.
pub fn is_playwright_report(value: &Value) -> bool {
    value.get("config").is_some_and(Value::is_object) && has_array(value, "suites")
}

/// Jest `--json`: `testResults` array and numeric `numTotalTests`.
pub fn is_jest_report(value: &Value) -> bool {
    has_array(value, "testResults") && value.get("numTotalTests").is_some_and(Value::is_number)
}

/// pytest-json-report: `tests` array.
pub fn is_pytest_report(value: &Value) -> bool {
    has_array(value, "tests")
}

/// SARIF log: `runs` array plus a `version` string or a sarif `$schema`.
pub fn is_sarif_log(value: &Value) -> bool {
    has_array(value, "runs")
        && (has_string(value, "version")
            || value
                .get("$schema")
                .and_then(Value::as_str)
                .is_some_and(|schema| schema.to_ascii_lowercase().contains("sarif")))
}

/// ESLint JSON formatter: array of `{filePath, messages: [...]}`.
pub fn is_eslint_results(value: &Value) -> bool {
    first_element(value)
        .is_some_and(|first| has_string(first, "filePath") && has_array(first, "messages"))
}

/// A single mypy JSON diagnostic record.
pub fn is_mypy_record(value: &Value) -> bool {
    has_string(value, "file") && value.get("line").is_some_and(Value::is_number) && has_string(value, "severity")
}

/// mypy diagnostics collected into a JSON array.
pub fn is_mypy_results(value: &Value) -> bool {
    first_element(value).is_some_and(is_mypy_record)
}

/// A single cargo/clippy JSON message.
///
/// Every cargo message carries `reason`; the second key keeps arbitrary
/// objects with a `reason` field from qualifying.
pub fn is_cargo_message(value: &Value) -> bool {
    has_string(value, "reason")
        && (value.get("package_id").is_some() || value.get("message").is_some() || value.get("success").is_some())
}

/// Cargo/clippy messages collected into a JSON array.
pub fn is_cargo_messages(value: &Value) -> bool {
    first_element(value).is_some_and(is_cargo_message)
}

/// A single `go test -json` event.
pub fn is_go_test_event(value: &Value) -> bool {
    has_string(value, "Action") && (value.get("Package").is_some() || value.get("Time").is_some())
}

/// Parses the leading non-empty lines of `content` as JSON objects.
///
/// Returns `None` when any inspected line is not a JSON object or when there
/// are no non-empty lines at all.
pub fn ndjson_records(content: &str) -> Option<Vec<Value>> {
    let mut records = Vec::new();
    for line in content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(NDJSON_SNIFF_LINES)
    {
        let value: Value = serde_json::from_str(line).ok()?;
        if !value.is_object() {
            return None;
        }
        records.push(value);
    }
    (!records.is_empty()).then_some(records)
}

/// Returns the first record of an NDJSON artifact.
///
/// A document that parses as a single JSON object counts as a one-record
/// stream, even when pretty-printed across several lines.
pub fn first_ndjson_record(content: &str) -> Result<Value, String> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        if value.is_object() {
            return Ok(value);
        }
    }
    ndjson_records(content)
        .and_then(|records| records.into_iter().next())
        .ok_or_else(|| "Invalid NDJSON: every line must be a JSON object".to_string())
}
