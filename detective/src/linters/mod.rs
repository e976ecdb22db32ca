//! Linter output extraction from CI job logs.
//!
//! Classification looks at the job name and the head of the log to decide
//! which linter ran ([`detect_linter_type`]); extraction then cuts that
//! linter's output block out of the full log ([`extract_linter_output`]).
//!
//! # Example
//!
//! ```
//! use artifact_detective::linters::{detect_linter_type, extract_linter_output};
//!
//! let log = "Run mypy src/\nsrc/app.py:3: error: Name \"x\" is not defined  [name-defined]\nFound 1 error in 1 file (checked 4 source files)\n";
//! let label = detect_linter_type("type-check", log).unwrap();
//! assert_eq!(label, "mypy");
//! let block = extract_linter_output(label, log).unwrap();
//! assert_eq!(block.lines().count(), 2);
//! ```

mod markers;
mod scan;

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::{DetectiveError, Result};

pub use markers::{MarkerConfig, extract_between_markers};
pub use scan::{SCAN_RULES, ScanRules, ScanState, scan_rules, strip_timestamp};

/// Number of leading log characters inspected during classification.
pub const CLASSIFY_HEAD_CHARS: usize = 1000;

/// One linter family and the patterns that identify it.
#[derive(Debug, Clone)]
pub struct LinterPattern {
    pub label: &'static str,
    pub patterns: Vec<Regex>,
}

/// Ordered linter classification table; the first family with a matching
/// pattern wins.
#[derive(Debug, Clone)]
pub struct LinterPatternTable {
    entries: Vec<LinterPattern>,
}

impl LinterPatternTable {
    /// Builds a table from `(label, patterns)` pairs, compiling every pattern
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`DetectiveError::Regex`] for an invalid pattern.
    pub fn new(entries: &[(&'static str, &[&str])]) -> Result<Self> {
        let entries = entries
            .iter()
            .map(|(label, patterns)| {
                let patterns = patterns
                    .iter()
                    .map(|pattern| {
                        RegexBuilder::new(pattern)
                            .case_insensitive(true)
                            .build()
                            .map_err(|source| DetectiveError::Regex {
                                pattern: (*pattern).to_string(),
                                source,
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(LinterPattern { label: *label, patterns })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LinterPattern] {
        &self.entries
    }

    /// Classifies a job by its name and the head of its log.
    pub fn detect(&self, job_name: &str, log: &str) -> Option<&'static str> {
        let combined = format!("{job_name}\n{}", head_chars(log, CLASSIFY_HEAD_CHARS));
        self.entries
            .iter()
            .find(|entry| entry.patterns.iter().any(|p| p.is_match(&combined)))
            .map(|entry| entry.label)
    }
}

fn head_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Builtin linter families in classification order.
pub const BUILTIN_LINTER_PATTERNS: &[(&str, &[&str])] = &[
    ("eslint", &["eslint", "npm run lint"]),
    ("prettier", &["prettier", "npm run format"]),
    ("ruff", &[r"ruff check", r"ruff\s"]),
    ("flake8", &["flake8"]),
    ("isort", &["isort"]),
    ("black", &[r"black --check", r"black\s"]),
    ("tsc", &[r"tsc --noEmit", r"npm run type-check"]),
    ("mypy", &["mypy"]),
    ("pylint", &["pylint"]),
];

/// Compiled form of [`BUILTIN_LINTER_PATTERNS`].
pub static LINTER_PATTERNS: LazyLock<LinterPatternTable> = LazyLock::new(|| {
    LinterPatternTable::new(BUILTIN_LINTER_PATTERNS).expect("static regex must compile")
});

/// Detects which linter ran in a job, using the builtin table.
pub fn detect_linter_type(job_name: &str, log: &str) -> Option<&'static str> {
    let label = LINTER_PATTERNS.detect(job_name, log);
    debug!(job = job_name, linter = ?label, "Detected linter type");
    label
}

/// Extracts the output block of linter `label` from `log`.
///
/// Returns `None` for unknown labels, when the linter's marker never
/// appears, or when the block is empty.
pub fn extract_linter_output(label: &str, log: &str) -> Option<String> {
    scan_rules(label)?.scan(log)
}
