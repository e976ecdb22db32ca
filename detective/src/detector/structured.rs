//! JSON and NDJSON shape sniffing.

use artifact_detective_core::shapes::{self, ndjson_records};
use artifact_detective_core::{ArtifactType, DetectionResult, OriginalFormat};
use serde_json::Value;

type ShapeFn = fn(&Value) -> bool;

/// Whole-document shapes in priority order.
pub const DOCUMENT_SHAPES: &[(ShapeFn, ArtifactType)] = &[
    (shapes::is_playwright_report, ArtifactType::PlaywrightJson),
    (shapes::is_jest_report, ArtifactType::JestJson),
    (shapes::is_pytest_report, ArtifactType::PytestJson),
    (shapes::is_sarif_log, ArtifactType::CheckstyleSarifJson),
    (shapes::is_eslint_results, ArtifactType::EslintJson),
    (shapes::is_mypy_results, ArtifactType::MypyJson),
    (shapes::is_cargo_messages, ArtifactType::ClippyJson),
];

/// Per-record shapes for line-delimited streams, in priority order.
pub const RECORD_SHAPES: &[(ShapeFn, ArtifactType)] = &[
    (shapes::is_go_test_event, ArtifactType::GoTestNdjson),
    (shapes::is_cargo_message, ArtifactType::ClippyNdjson),
    (shapes::is_mypy_record, ArtifactType::MypyNdjson),
];

fn first_shape(table: &[(ShapeFn, ArtifactType)], value: &Value) -> Option<ArtifactType> {
    table
        .iter()
        .find(|(shape, _)| shape(value))
        .map(|(_, ty)| *ty)
}

/// Classifies JSON-family content.
///
/// A document that parses as JSON is always accepted: either as the first
/// matching shape or as `unknown` JSON. Only content that fails to parse is
/// tried as NDJSON, and only a recognized record shape accepts it there.
pub fn sniff(content: &str) -> Option<DetectionResult> {
    match serde_json::from_str::<Value>(content) {
        Ok(value) => {
            let detected = first_shape(DOCUMENT_SHAPES, &value)
                .or_else(|| first_shape(RECORD_SHAPES, &value));
            Some(match detected {
                Some(ty) => DetectionResult::known(ty),
                None => DetectionResult::unknown(OriginalFormat::Json),
            })
        }
        Err(_) => {
            let records = ndjson_records(content)?;
            let first = records.first()?;
            first_shape(RECORD_SHAPES, first).map(DetectionResult::known)
        }
    }
}
