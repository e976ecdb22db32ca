//! Line-shape signatures for tool text output.
//!
//! Each [`TextSignature`] describes how one text artifact type looks: line
//! patterns that identify it anywhere in the content, an optional summary
//! pattern the detector additionally requires, and summary lines that on
//! their own satisfy the validator. The detector and the validators share
//! these definitions, which keeps the validator for a type at least as
//! permissive as the detector's sniffer for it.

use std::sync::LazyLock;

use regex::Regex;

use crate::ArtifactType;

/// Line-shape signature of one text artifact type.
#[derive(Debug)]
pub struct TextSignature {
    pub artifact_type: ArtifactType,
    /// Any match anywhere in the content identifies the family.
    pub line_patterns: Vec<Regex>,
    /// When set, must also match for the detector to accept the content.
    pub required_summary: Option<Regex>,
    /// Summary shapes accepted by the validator without any matching line.
    pub summary_patterns: Vec<Regex>,
}

impl TextSignature {
    /// Builds a signature from line patterns.
    ///
    /// # Panics
    ///
    /// Panics when a pattern is not a valid regular expression.
    pub fn new(artifact_type: ArtifactType, line_patterns: &[&str]) -> Self {
        Self {
            artifact_type,
            line_patterns: line_patterns.iter().map(|p| compile(p)).collect(),
            required_summary: None,
            summary_patterns: Vec::new(),
        }
    }

    /// Adds a summary the detector requires in addition to a line match.
    pub fn requiring(mut self, summary: &str) -> Self {
        let regex = compile(summary);
        self.summary_patterns.push(regex.clone());
        self.required_summary = Some(regex);
        self
    }

    /// Adds a summary that satisfies the validator on its own.
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary_patterns.push(compile(summary));
        self
    }

    /// Returns `true` when the detector should classify `content` as this type.
    pub fn sniff(&self, content: &str) -> bool {
        self.matches_line(content)
            && self
                .required_summary
                .as_ref()
                .is_none_or(|summary| summary.is_match(content))
    }

    /// Returns `true` when `content` has this type's line or summary shape.
    pub fn conforms(&self, content: &str) -> bool {
        self.matches_line(content) || self.summary_patterns.iter().any(|p| p.is_match(content))
    }

    fn matches_line(&self, content: &str) -> bool {
        self.line_patterns.iter().any(|p| p.is_match(content))
    }
}

fn compile(pattern: &str) -> Regex {
    // All patterns here are compile-time constants covered by tests.
    Regex::new(pattern).expect("static regex must compile")
}

/// Text signatures in detection order.
///
/// The order is the disambiguation policy: the first signature that sniffs
/// positive wins. Structurally similar families (ruff and flake8 share one
/// line shape) are separated by a required summary on the earlier entry.
pub static TEXT_SIGNATURES: LazyLock<Vec<TextSignature>> = LazyLock::new(|| {
    vec![
        // src/file.ts(12,5): error TS2322: ... / src/file.ts:12:5 - error TS2322: ...
        TextSignature::new(
            ArtifactType::TscTxt,
            &[
                r"\.tsx?\(\d+,\d+\):\s+error\s+TS\d+",
                r"(?m)^\S+\.tsx?:\d+:\d+\s+-\s+error\s+TS\d+",
            ],
        )
        .with_summary(r"(?m)^Found \d+ errors? in \d+ files?\.?$"),
        //   12:5  error  'foo' is not defined  no-undef
        TextSignature::new(
            ArtifactType::EslintTxt,
            &[r"(?m)^\s*\d+:\d+\s+(?:error|warning)\s"],
        )
        .with_summary(r"(?m)^\s*(?:✖\s*)?\d+ problems?\b"),
        // src/app.py:12: error: Incompatible types  [assignment]
        TextSignature::new(
            ArtifactType::MypyTxt,
            &[r"(?m)^[^\s:]+\.pyi?:\d+(?::\d+)?:\s*(?:error|warning|note):"],
        )
        .with_summary(r"(?m)^(?:Found \d+ errors? in \d+ files?|Success: no issues found)"),
        // src/app.py:1:0: C0114: Missing module docstring (missing-module-docstring)
        TextSignature::new(
            ArtifactType::PylintTxt,
            &[r"(?m)^[^\s:]+\.py:\d+:\d+:\s+[CRWEFI]\d{4}:"],
        )
        .requiring(r"(?m)^(?:\*{13} Module |Your code has been rated at)"),
        // src/app.py:1:8: F401 [*] `os` imported but unused
        TextSignature::new(ArtifactType::RuffTxt, &[r"\.py:\d+:\d+:\s+[A-Z]+\d+"])
            .requiring(r"(?m)^(?:Found \d+ errors?\.|\[\*\] \d+ fixable)"),
        // ./src/app.py:1:1: F401 'os' imported but unused
        TextSignature::new(ArtifactType::Flake8Txt, &[r"\.py:\d+:\d+:\s+[A-Z]+\d+"]),
        // would reformat src/app.py
        TextSignature::new(ArtifactType::BlackTxt, &[r"(?m)^would reformat \S+"])
            .with_summary(r"\d+ files? would be reformatted"),
        // ERROR: /repo/src/app.py Imports are incorrectly sorted and/or formatted.
        TextSignature::new(
            ArtifactType::IsortTxt,
            &[r"(?m)^ERROR: \S+\.py Imports are incorrectly sorted"],
        ),
        // [warn] src/index.ts
        TextSignature::new(ArtifactType::PrettierTxt, &[r"(?m)^\[warn\] \S+\.\w+\s*$"])
            .requiring(r"(?m)^\[warn\] Code style issues"),
        // test tests::it_works ... ok
        TextSignature::new(
            ArtifactType::CargoTestTxt,
            &[
                r"(?m)^test result: (?:ok|FAILED)\. \d+ passed; \d+ failed",
                r"(?m)^test \S+ \.\.\. (?:ok|FAILED|ignored)\s*$",
            ],
        ),
        // warning: this `if` has identical blocks ... = help: ... clippy::if_same_then_else
        TextSignature::new(ArtifactType::ClippyTxt, &[r"clippy::[a-z_]+"])
            .requiring(r"-->\s+\S+\.rs:\d+:\d+"),
        // Diff in /repo/src/main.rs at line 3:
        TextSignature::new(
            ArtifactType::RustfmtTxt,
            &[r"(?m)^Diff in \S+\.rs(?: at line \d+|:\d+)?:"],
        ),
        // gofmt -l lists files, gofmt -d prints unified diffs
        TextSignature::new(
            ArtifactType::GofmtTxt,
            &[
                r"(?m)^diff -u \S+\.go(?:\.orig)? \S+\.go",
                r"\A(?:[^\s]+\.go[ \t]*\r?\n)*[^\s]+\.go\s*\z",
            ],
        ),
    ]
});

/// Looks up the text signature for `artifact_type`.
pub fn text_signature(artifact_type: ArtifactType) -> Option<&'static TextSignature> {
    TEXT_SIGNATURES
        .iter()
        .find(|signature| signature.artifact_type == artifact_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(ty: ArtifactType) -> &'static TextSignature {
        text_signature(ty).expect("signature must exist")
    }

    #[test]
    fn test_all_signatures_compile() {
        assert_eq!(TEXT_SIGNATURES.len(), 13);
    }

    #[test]
    fn test_tsc_signature_matches_parenthesized_location() {
        assert!(sig(ArtifactType::TscTxt).sniff("src/file.ts(12,5): error TS1234: message"));
        assert!(sig(ArtifactType::TscTxt).sniff("src/a.tsx:3:1 - error TS2304: Cannot find name"));
    }

    #[test]
    fn test_ruff_requires_summary_but_flake8_does_not() {
        let lines = "src/app.py:1:8: F401 [*] `os` imported but unused\n";
        assert!(!sig(ArtifactType::RuffTxt).sniff(lines));
        assert!(sig(ArtifactType::Flake8Txt).sniff(lines));

        let with_summary = format!("{lines}Found 1 error.\n[*] 1 fixable with the `--fix` option.\n");
        assert!(sig(ArtifactType::RuffTxt).sniff(&with_summary));
    }

    #[test]
    fn test_eslint_summary_alone_conforms_but_does_not_sniff() {
        let content = "✖ 3 problems (3 errors, 0 warnings)";
        assert!(sig(ArtifactType::EslintTxt).conforms(content));
        assert!(!sig(ArtifactType::EslintTxt).sniff(content));
    }

    #[test]
    fn test_gofmt_file_list() {
        assert!(sig(ArtifactType::GofmtTxt).sniff("cmd/main.go\ninternal/x/y.go\n"));
        assert!(!sig(ArtifactType::GofmtTxt).sniff("cmd/main.go\nsomething else\n"));
    }

    #[test]
    fn test_clippy_requires_rust_location() {
        let output = "warning: useless conversion\n  --> src/lib.rs:4:5\n  = help: https://rust-lang.github.io/rust-clippy/master/index.html#useless_conversion\n  = note: `#[warn(clippy::useless_conversion)]` on by default\n";
        assert!(sig(ArtifactType::ClippyTxt).sniff(output));
        assert!(!sig(ArtifactType::ClippyTxt).sniff("allow(clippy::all)"));
    }

    #[test]
    fn test_pylint_is_separated_from_flake8_by_rating() {
        let content = "************* Module app\nsrc/app.py:1:0: C0114: Missing module docstring (missing-module-docstring)\n";
        assert!(sig(ArtifactType::PylintTxt).sniff(content));
        assert!(!sig(ArtifactType::PylintTxt).sniff("src/app.py:1:0: C0114: Missing module docstring"));
    }
}
