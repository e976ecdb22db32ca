//! Line scanner that cuts one linter's output block out of a CI log.

use std::sync::LazyLock;

use regex::Regex;

static TIMESTAMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z ?").expect("static regex must compile")
});

const CI_DIRECTIVE: &str = "##[";
const CI_ENDGROUP: &str = "##[endgroup]";

/// Removes a GitHub Actions ISO timestamp prefix from a log line.
///
/// ```
/// use artifact_detective::linters::strip_timestamp;
///
/// assert_eq!(strip_timestamp("2024-05-01T10:00:00.1234567Z Found 2 errors"), "Found 2 errors");
/// assert_eq!(strip_timestamp("Found 2 errors"), "Found 2 errors");
/// ```
pub fn strip_timestamp(line: &str) -> &str {
    match TIMESTAMP_PREFIX.find(line) {
        Some(prefix) => &line[prefix.end()..],
        None => line,
    }
}

/// Scanner position within a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Looking for the line that starts the linter's output.
    Seeking,
    /// Inside the output block.
    Collecting,
}

/// How one linter family's output block is recognized.
#[derive(Debug, Clone)]
pub struct ScanRules {
    /// A line matching this starts the block. The line itself is not kept.
    pub marker: Regex,
    /// Lines kept while collecting.
    pub accept: Vec<Regex>,
    /// Keep any non-blank line once the block is non-empty.
    pub continuation: bool,
    /// A line matching this is kept and ends the block.
    pub terminator: Option<Regex>,
}

impl ScanRules {
    pub fn new(marker: &str, accept: &[&str], terminator: Option<&str>) -> Self {
        Self {
            marker: compile(marker),
            accept: accept.iter().map(|p| compile(p)).collect(),
            continuation: false,
            terminator: terminator.map(compile),
        }
    }

    pub fn with_continuation(mut self) -> Self {
        self.continuation = true;
        self
    }

    /// Runs the scanner over `log`.
    ///
    /// Returns `None` when the marker never appears or nothing was kept.
    pub fn scan(&self, log: &str) -> Option<String> {
        let mut state = ScanState::Seeking;
        let mut block: Vec<&str> = Vec::new();

        for raw in log.lines() {
            let line = strip_timestamp(raw);
            match state {
                ScanState::Seeking => {
                    if self.marker.is_match(line) {
                        state = ScanState::Collecting;
                    }
                }
                ScanState::Collecting => {
                    if line.starts_with(CI_DIRECTIVE) {
                        if line.starts_with(CI_ENDGROUP) {
                            continue;
                        }
                        break;
                    }
                    if self.terminator.as_ref().is_some_and(|t| t.is_match(line)) {
                        block.push(line);
                        break;
                    }
                    if self.accepts(line, !block.is_empty()) {
                        block.push(line);
                    }
                }
            }
        }

        (!block.is_empty()).then(|| block.join("\n"))
    }

    fn accepts(&self, line: &str, collected: bool) -> bool {
        self.accept.iter().any(|p| p.is_match(line))
            || (self.continuation && collected && !line.trim().is_empty())
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile")
}

const PY_LOCATION: &str = r"^[A-Za-z0-9_\-/.]+\.py:\d+";
const WEB_FILE: &str = r"^(?:\[warn\] )?[A-Za-z0-9_\-/.@]+\.(?:js|ts|jsx|tsx|json|css|md)\b";

fn python_rules(label: &str) -> ScanRules {
    ScanRules::new(
        &regex::escape(label),
        &[PY_LOCATION],
        Some(r"(?i)^(?:Found )?\d+ errors?\b|Your code has been rated at"),
    )
    .with_continuation()
}

fn formatter_rules(label: &str) -> ScanRules {
    ScanRules::new(
        &regex::escape(label),
        &[r"(?i)would reformat", r"^(?:ERROR: )?[A-Za-z0-9_\-/.]+\.py\b"],
        Some(r"\d+ files? would be reformatted"),
    )
}

/// Scan rules per linter label.
pub static SCAN_RULES: LazyLock<Vec<(&'static str, ScanRules)>> = LazyLock::new(|| {
    vec![
        (
            "eslint",
            ScanRules::new(
                r"(?i)eslint.*\.(?:js|ts|jsx|tsx)|npm run lint",
                &[r"\S"],
                Some(r"^\s*(?:✖\s*)?\d+ problems?\b"),
            ),
        ),
        (
            "prettier",
            ScanRules::new(r"prettier|npm run format", &[WEB_FILE], Some(r"Code style issues found")),
        ),
        ("ruff", python_rules("ruff")),
        ("flake8", python_rules("flake8")),
        ("pylint", python_rules("pylint")),
        (
            "tsc",
            ScanRules::new(
                r"tsc |type-check",
                &[r"^[A-Za-z0-9_\-/.]+\.tsx?(?:\(\d+,\d+\)|:\d+:\d+)", r"error TS\d+:"],
                Some(r"Found \d+ errors?"),
            ),
        ),
        ("black", formatter_rules("black")),
        ("isort", formatter_rules("isort")),
        (
            "mypy",
            ScanRules::new(
                r"mypy",
                &[r"^[A-Za-z0-9_\-/.]+\.pyi?:\d+(?::\d+)?:\s*(?:error|warning|note):"],
                Some(r"Found \d+ errors?"),
            ),
        ),
    ]
});

/// Looks up the scan rules for a linter label.
pub fn scan_rules(label: &str) -> Option<&'static ScanRules> {
    SCAN_RULES
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, rules)| rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(label: &str, log: &str) -> Option<String> {
        scan_rules(label).and_then(|rules| rules.scan(log))
    }

    #[test]
    fn test_state_machine_skips_marker_line() {
        let log = "setup\nRun mypy src\nsrc/a.py:1: error: bad  [misc]\nFound 1 error in 1 file (checked 2 source files)\ntrailing\n";
        assert_eq!(
            scan("mypy", log).as_deref(),
            Some("src/a.py:1: error: bad  [misc]\nFound 1 error in 1 file (checked 2 source files)")
        );
    }

    #[test]
    fn test_ci_separator_ends_block_without_being_kept() {
        let log = "Run flake8 .\n./app.py:1:1: F401 'os' imported but unused\n##[error]Process completed with exit code 1.\n./never.py:2:2: E999 nope\n";
        assert_eq!(scan("flake8", log).as_deref(), Some("./app.py:1:1: F401 'os' imported but unused"));
    }

    #[test]
    fn test_endgroup_is_skipped() {
        let log = "##[group]Run mypy .\n  mypy .\n##[endgroup]\napp.py:3: error: oops\nFound 1 error in 1 file\n";
        assert_eq!(scan("mypy", log).as_deref(), Some("app.py:3: error: oops\nFound 1 error in 1 file"));
    }

    #[test]
    fn test_timestamps_are_stripped() {
        let log = "2024-05-01T10:00:00.0000000Z Run mypy .\n2024-05-01T10:00:01.0000000Z app.py:3: error: oops\n2024-05-01T10:00:01.0000000Z Found 1 error in 1 file\n";
        assert_eq!(scan("mypy", log).as_deref(), Some("app.py:3: error: oops\nFound 1 error in 1 file"));
    }

    #[test]
    fn test_python_continuation_lines() {
        let log = "$ ruff check .\nsrc/a.py:1:8: F401 [*] `os` imported but unused\n  |\n1 | import os\n  |        ^^ F401\n\nFound 1 error.\n";
        let block = scan("ruff", log).unwrap();
        assert!(block.starts_with("src/a.py:1:8: F401"));
        assert!(block.contains("1 | import os"));
        assert!(block.ends_with("Found 1 error."));
    }

    #[test]
    fn test_eslint_terminator_with_cross_mark() {
        let log = "> eslint src/**/*.ts\n/repo/src/a.ts\n  1:1  error  Unexpected var  no-var\n\n✖ 1 problem (1 error, 0 warnings)\nafter\n";
        assert_eq!(
            scan("eslint", log).as_deref(),
            Some("/repo/src/a.ts\n  1:1  error  Unexpected var  no-var\n✖ 1 problem (1 error, 0 warnings)")
        );
    }

    #[test]
    fn test_prettier_warn_lines() {
        let log = "> prettier --check .\nChecking formatting...\n[warn] src/index.ts\n[warn] README.md\n[warn] Code style issues found in 2 files. Run Prettier with --write to fix.\n";
        assert_eq!(
            scan("prettier", log).as_deref(),
            Some("[warn] src/index.ts\n[warn] README.md\n[warn] Code style issues found in 2 files. Run Prettier with --write to fix.")
        );
    }

    #[test]
    fn test_tsc_both_location_styles() {
        let log = "> tsc --noEmit\nsrc/a.ts(3,1): error TS2304: Cannot find name 'x'.\nsrc/b.tsx:4:2 - error TS2322: Type mismatch.\nFound 2 errors in 2 files.\n";
        let block = scan("tsc", log).unwrap();
        assert_eq!(block.lines().count(), 3);
    }

    #[test]
    fn test_formatters() {
        let black = "Run black --check .\nwould reformat src/app.py\nOh no!\n1 file would be reformatted, 3 files would be left unchanged.\n";
        assert_eq!(
            scan("black", black).as_deref(),
            Some("would reformat src/app.py\n1 file would be reformatted, 3 files would be left unchanged.")
        );

        let isort = "Run isort --check-only .\nERROR: /repo/src/app.py Imports are incorrectly sorted and/or formatted.\n";
        assert_eq!(
            scan("isort", isort).as_deref(),
            Some("ERROR: /repo/src/app.py Imports are incorrectly sorted and/or formatted.")
        );
    }

    #[test]
    fn test_no_marker_or_empty_block() {
        assert_eq!(scan("mypy", "nothing here\n"), None);
        assert_eq!(scan("mypy", "Run mypy .\nSuccess: no issues found in 3 source files\n"), None);
        assert_eq!(scan("cargo", "Run cargo clippy\n"), None);
    }
}
