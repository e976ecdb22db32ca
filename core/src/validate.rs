//! Structural validation of artifact content.
//!
//! Validators are shape assertions only: required top-level keys for JSON
//! formats, root/element tag substrings for XML, marker substrings for HTML,
//! and line or summary shapes for text output. Every validator is total and
//! reports problems through [`ValidationResult`] rather than panicking or
//! returning an error.
//!
//! # Examples
//!
//! ```
//! use artifact_detective_core::validate;
//!
//! let result = validate("tsc-txt", "src/file.ts(12,5): error TS1234: message");
//! assert!(result.valid);
//!
//! // Binary artifacts are never content-validated.
//! let result = validate("binary", "\u{89}PNG");
//! assert!(!result.valid);
//! assert_eq!(result.error.as_deref(), Some("No validator for type binary"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::patterns::text_signature;
use crate::{ArtifactType, shapes};

/// Outcome of validating one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Signature shared by all per-type validators.
pub type ValidatorFn = fn(&str) -> ValidationResult;

/// Registry of validators keyed by artifact type.
///
/// `binary` is deliberately absent: binary artifacts are never
/// content-validated.
pub const VALIDATORS: &[(ArtifactType, ValidatorFn)] = &[
    (ArtifactType::PlaywrightJson, validate_playwright_json),
    (ArtifactType::JestJson, validate_jest_json),
    (ArtifactType::JestHtml, validate_jest_html),
    (ArtifactType::PytestJson, validate_pytest_json),
    (ArtifactType::PytestHtml, validate_pytest_html),
    (ArtifactType::PlaywrightHtml, validate_playwright_html),
    (ArtifactType::JunitXml, validate_junit_xml),
    (ArtifactType::CheckstyleXml, validate_checkstyle_xml),
    (ArtifactType::CheckstyleSarifJson, validate_sarif_json),
    (ArtifactType::SpotbugsXml, validate_spotbugs_xml),
    (ArtifactType::SurefireHtml, validate_surefire_html),
    (ArtifactType::EslintJson, validate_eslint_json),
    (ArtifactType::MypyNdjson, validate_mypy_ndjson),
    (ArtifactType::MypyJson, validate_mypy_json),
    (ArtifactType::EslintTxt, validate_eslint_output),
    (ArtifactType::TscTxt, validate_tsc_output),
    (ArtifactType::RuffTxt, validate_ruff_output),
    (ArtifactType::MypyTxt, validate_mypy_output),
    (ArtifactType::Flake8Txt, validate_flake8_output),
    (ArtifactType::PylintTxt, validate_pylint_output),
    (ArtifactType::PrettierTxt, validate_prettier_output),
    (ArtifactType::BlackTxt, validate_black_output),
    (ArtifactType::IsortTxt, validate_isort_output),
    (ArtifactType::CargoTestTxt, validate_cargo_test_output),
    (ArtifactType::ClippyNdjson, validate_clippy_ndjson),
    (ArtifactType::ClippyJson, validate_clippy_json),
    (ArtifactType::ClippyTxt, validate_clippy_output),
    (ArtifactType::RustfmtTxt, validate_rustfmt_output),
    (ArtifactType::GofmtTxt, validate_gofmt_output),
    (ArtifactType::GoTestNdjson, validate_go_test_ndjson),
];

/// Looks up the validator registered for `artifact_type`.
pub fn validator_for(artifact_type: ArtifactType) -> Option<ValidatorFn> {
    VALIDATORS
        .iter()
        .find(|(ty, _)| *ty == artifact_type)
        .map(|(_, validator)| *validator)
}

/// Validates `content` against the artifact type named by `type_tag`.
///
/// Unknown tags, `unknown` and `binary` yield
/// `{valid: false, error: "No validator for type <t>"}`.
pub fn validate(type_tag: &str, content: &str) -> ValidationResult {
    match type_tag.parse::<ArtifactType>().ok().and_then(validator_for) {
        Some(validator) => validator(content),
        None => ValidationResult::invalid(format!("No validator for type {type_tag}")),
    }
}

/// Validates `content` against a catalog member.
pub fn validate_artifact(artifact_type: ArtifactType, content: &str) -> ValidationResult {
    validate(artifact_type.as_str(), content)
}

fn parse_json(content: &str) -> Result<Value, ValidationResult> {
    serde_json::from_str(content).map_err(|e| ValidationResult::invalid(format!("Invalid JSON: {e}")))
}

fn check_json(content: &str, check: impl FnOnce(&Value) -> Result<(), &'static str>) -> ValidationResult {
    match parse_json(content) {
        Ok(value) => match check(&value) {
            Ok(()) => ValidationResult::ok(),
            Err(error) => ValidationResult::invalid(error),
        },
        Err(invalid) => invalid,
    }
}

fn check_ndjson(content: &str, shape: fn(&Value) -> bool, error: &str) -> ValidationResult {
    match shapes::first_ndjson_record(content) {
        Ok(record) if shape(&record) => ValidationResult::ok(),
        Ok(_) => ValidationResult::invalid(error),
        Err(parse_error) => ValidationResult::invalid(parse_error),
    }
}

fn check_text(artifact_type: ArtifactType, content: &str, error: &str) -> ValidationResult {
    if text_signature(artifact_type).is_some_and(|signature| signature.conforms(content)) {
        ValidationResult::ok()
    } else {
        ValidationResult::invalid(error)
    }
}

fn check_marker(content: &str, markers: &[&str], error: &str) -> ValidationResult {
    if markers.iter().any(|marker| content.contains(marker)) {
        ValidationResult::ok()
    } else {
        ValidationResult::invalid(error)
    }
}

pub fn validate_playwright_json(content: &str) -> ValidationResult {
    check_json(content, |data| {
        if !data.get("config").is_some_and(Value::is_object) {
            return Err("Missing config object");
        }
        if !shapes::is_playwright_report(data) {
            return Err("Missing or invalid suites array");
        }
        Ok(())
    })
}

pub fn validate_jest_json(content: &str) -> ValidationResult {
    check_json(content, |data| {
        if !data.get("testResults").is_some_and(Value::is_array) {
            return Err("Missing or invalid testResults array");
        }
        if !shapes::is_jest_report(data) {
            return Err("Missing numTotalTests");
        }
        Ok(())
    })
}

pub fn validate_pytest_json(content: &str) -> ValidationResult {
    check_json(content, |data| {
        if shapes::is_pytest_report(data) {
            Ok(())
        } else {
            Err("Missing or invalid tests array")
        }
    })
}

pub fn validate_sarif_json(content: &str) -> ValidationResult {
    check_json(content, |data| {
        if shapes::is_sarif_log(data) {
            Ok(())
        } else {
            Err("Missing runs array or SARIF version")
        }
    })
}

pub fn validate_eslint_json(content: &str) -> ValidationResult {
    check_json(content, |data| {
        if shapes::is_eslint_results(data) {
            Ok(())
        } else {
            Err("Expected an array of {filePath, messages} results")
        }
    })
}

pub fn validate_mypy_json(content: &str) -> ValidationResult {
    check_json(content, |data| {
        if shapes::is_mypy_results(data) {
            Ok(())
        } else {
            Err("Expected an array of mypy diagnostics")
        }
    })
}

pub fn validate_clippy_json(content: &str) -> ValidationResult {
    check_json(content, |data| {
        if shapes::is_cargo_messages(data) {
            Ok(())
        } else {
            Err("Expected an array of cargo messages")
        }
    })
}

pub fn validate_mypy_ndjson(content: &str) -> ValidationResult {
    check_ndjson(content, shapes::is_mypy_record, "Missing file/line/severity in mypy record")
}

pub fn validate_clippy_ndjson(content: &str) -> ValidationResult {
    check_ndjson(content, shapes::is_cargo_message, "Missing reason in cargo message")
}

pub fn validate_go_test_ndjson(content: &str) -> ValidationResult {
    check_ndjson(content, shapes::is_go_test_event, "Missing Action/Package in go test event")
}

pub fn validate_junit_xml(content: &str) -> ValidationResult {
    if !content.contains("<testsuites") && !content.contains("<testsuite") {
        return ValidationResult::invalid("Missing <testsuites> or <testsuite> root element");
    }
    if !content.contains("<testcase") {
        return ValidationResult::invalid("Missing <testcase> elements");
    }
    ValidationResult::ok()
}

pub fn validate_checkstyle_xml(content: &str) -> ValidationResult {
    check_marker(content, &["<checkstyle"], "Missing <checkstyle> root element")
}

pub fn validate_spotbugs_xml(content: &str) -> ValidationResult {
    check_marker(content, &["<BugCollection"], "Missing <BugCollection> root element")
}

pub fn validate_pytest_html(content: &str) -> ValidationResult {
    check_marker(
        content,
        &["pytest-html"],
        "Missing pytest-html marker (link to \"pytest-html\" package)",
    )
}

pub fn validate_playwright_html(content: &str) -> ValidationResult {
    if content.to_ascii_lowercase().contains("playwright") {
        ValidationResult::ok()
    } else {
        ValidationResult::invalid("Missing Playwright markers in HTML content")
    }
}

pub fn validate_jest_html(content: &str) -> ValidationResult {
    check_marker(
        content,
        &["jest-html-reporter", "jest-stare"],
        "Missing jest-html-reporter or jest-stare marker",
    )
}

pub fn validate_surefire_html(content: &str) -> ValidationResult {
    if content.to_ascii_lowercase().contains("surefire") {
        ValidationResult::ok()
    } else {
        ValidationResult::invalid("Missing Surefire report marker")
    }
}

pub fn validate_eslint_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::EslintTxt, content, "Does not match ESLint output format")
}

pub fn validate_tsc_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::TscTxt, content, "Does not match TypeScript compiler output format")
}

pub fn validate_flake8_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::Flake8Txt, content, "Does not match flake8 output format")
}

pub fn validate_ruff_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::RuffTxt, content, "Does not match ruff output format")
}

pub fn validate_mypy_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::MypyTxt, content, "Does not match mypy output format")
}

pub fn validate_pylint_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::PylintTxt, content, "Does not match pylint output format")
}

pub fn validate_prettier_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::PrettierTxt, content, "Does not match prettier --check output format")
}

pub fn validate_black_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::BlackTxt, content, "Does not match black --check output format")
}

pub fn validate_isort_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::IsortTxt, content, "Does not match isort --check-only output format")
}

pub fn validate_cargo_test_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::CargoTestTxt, content, "Does not match cargo test output format")
}

pub fn validate_clippy_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::ClippyTxt, content, "Does not match clippy output format")
}

pub fn validate_rustfmt_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::RustfmtTxt, content, "Does not match rustfmt --check output format")
}

pub fn validate_gofmt_output(content: &str) -> ValidationResult {
    check_text(ArtifactType::GofmtTxt, content, "Does not match gofmt output format")
}
