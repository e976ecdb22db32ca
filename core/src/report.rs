//! Canonical, tool-agnostic report shapes produced by the extractors.
//!
//! Outcomes are kept as strings: the extractors normalize them to
//! `passed`/`failed`/`skipped`/`error` where they can, and pass foreign
//! values through unchanged, so consumers must tolerate other values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const OUTCOME_PASSED: &str = "passed";
pub const OUTCOME_FAILED: &str = "failed";
pub const OUTCOME_SKIPPED: &str = "skipped";
pub const OUTCOME_ERROR: &str = "error";
pub const OUTCOME_FLAKY: &str = "flaky";

/// Returns `true` for outcomes that make a run fail.
pub fn is_failing_outcome(outcome: &str) -> bool {
    outcome == OUTCOME_FAILED || outcome == OUTCOME_ERROR
}

/// One setup/call/teardown phase of a pytest test.
///
/// `longrepr` is either plain text or a structured crash report. Keys the
/// phase does not model (`crash`, `traceback`, `stdout`, ...) live in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestPhase {
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longrepr: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single normalized pytest result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PytestTest {
    pub nodeid: String,
    pub outcome: String,
    pub duration: f64,
    /// Captured log output, stack traces and stdout/stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Screenshots, videos and other attachments, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<TestPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<TestPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teardown: Option<TestPhase>,
}

impl PytestTest {
    pub fn new(nodeid: impl Into<String>, outcome: impl Into<String>, duration: f64) -> Self {
        Self {
            nodeid: nodeid.into(),
            outcome: outcome.into(),
            duration,
            log: None,
            extras: None,
            setup: None,
            call: None,
            teardown: None,
        }
    }
}

/// Canonical pytest report, shaped like pytest-json-report output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PytestReport {
    /// Creation time in milliseconds since the Unix epoch.
    pub created: f64,
    pub duration: f64,
    pub exit_code: i32,
    pub root: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, Value>,
    pub tests: Vec<PytestTest>,
}

impl PytestReport {
    /// Builds a report whose duration and exit code are derived from `tests`.
    ///
    /// # Examples
    ///
    /// ```
    /// use artifact_detective_core::{PytestReport, PytestTest};
    ///
    /// let report = PytestReport::from_tests(0.0, vec![
    ///     PytestTest::new("a", "passed", 1.5),
    ///     PytestTest::new("b", "failed", 0.5),
    /// ]);
    /// assert_eq!(report.duration, 2.0);
    /// assert_eq!(report.exit_code, 1);
    /// ```
    pub fn from_tests(created: f64, tests: Vec<PytestTest>) -> Self {
        let mut report = Self {
            created,
            duration: 0.0,
            exit_code: 0,
            root: String::new(),
            environment: BTreeMap::new(),
            tests,
        };
        report.recompute_totals();
        report
    }

    /// Recomputes the summed duration and the failing exit indicator.
    pub fn recompute_totals(&mut self) {
        self.duration = self.tests.iter().map(|test| test.duration).sum();
        self.exit_code = i32::from(self.tests.iter().any(|test| is_failing_outcome(&test.outcome)));
    }

    /// Counts tests with the given outcome.
    pub fn count(&self, outcome: &str) -> usize {
        self.tests.iter().filter(|test| test.outcome == outcome).count()
    }
}

/// A single Playwright test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaywrightTest {
    pub title: String,
    #[serde(default)]
    pub project_name: String,
    pub outcome: String,
    /// Duration in milliseconds, as Playwright reports it.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u64>,
    /// Number of retries that ran after the first attempt.
    #[serde(default)]
    pub retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tests grouped by test file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaywrightSuite {
    pub title: String,
    pub file: String,
    pub tests: Vec<PlaywrightTest>,
}

/// Aggregate counters in Playwright's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaywrightStats {
    pub total: u64,
    pub expected: u64,
    pub unexpected: u64,
    pub flaky: u64,
    pub skipped: u64,
}

impl PlaywrightStats {
    /// Derives counters from normalized test outcomes.
    pub fn from_suites(suites: &[PlaywrightSuite]) -> Self {
        let mut stats = Self::default();
        for test in suites.iter().flat_map(|suite| &suite.tests) {
            stats.total += 1;
            match test.outcome.as_str() {
                OUTCOME_PASSED => stats.expected += 1,
                OUTCOME_FAILED | OUTCOME_ERROR => stats.unexpected += 1,
                OUTCOME_FLAKY => stats.flaky += 1,
                OUTCOME_SKIPPED => stats.skipped += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Canonical Playwright report recovered from an HTML report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaywrightReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Start time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    pub duration: f64,
    pub exit_code: i32,
    pub suites: Vec<PlaywrightSuite>,
    pub stats: PlaywrightStats,
}

impl PlaywrightReport {
    pub fn tests(&self) -> impl Iterator<Item = &PlaywrightTest> {
        self.suites.iter().flat_map(|suite| &suite.tests)
    }
}
