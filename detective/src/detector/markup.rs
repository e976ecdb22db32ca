//! XML and HTML marker sniffing.

use artifact_detective_core::{ArtifactType, DetectionResult};

type MarkerFn = fn(&str) -> bool;

/// XML report roots, in priority order.
pub const XML_MARKERS: &[(MarkerFn, ArtifactType)] = &[
    (is_junit_xml, ArtifactType::JunitXml),
    (|content| content.contains("<checkstyle"), ArtifactType::CheckstyleXml),
    (|content| content.contains("<BugCollection"), ArtifactType::SpotbugsXml),
];

/// HTML report markers, in priority order. Matched against the original
/// content and its ASCII-lowercased copy.
const HTML_MARKERS: &[(fn(&str, &str) -> bool, ArtifactType)] = &[
    (|content, _| content.contains("pytest-html"), ArtifactType::PytestHtml),
    (|_, lower| lower.contains("playwright"), ArtifactType::PlaywrightHtml),
    (
        |content, _| content.contains("jest-html-reporter") || content.contains("jest-stare"),
        ArtifactType::JestHtml,
    ),
    (|_, lower| lower.contains("surefire"), ArtifactType::SurefireHtml),
];

fn is_junit_xml(content: &str) -> bool {
    content.contains("<testsuite") && content.contains("<testcase")
}

pub fn sniff_xml(content: &str) -> Option<DetectionResult> {
    XML_MARKERS
        .iter()
        .find(|(marker, _)| marker(content))
        .map(|(_, ty)| DetectionResult::known(*ty))
}

/// Classifies HTML documents carrying a known report marker.
///
/// Content that does not look like HTML, or HTML without any marker, is
/// left to the text sniffers.
pub fn sniff_html(content: &str) -> Option<DetectionResult> {
    let lower = content.to_ascii_lowercase();
    if !looks_like_html(&lower) {
        return None;
    }
    HTML_MARKERS
        .iter()
        .find(|(marker, _)| marker(content, &lower))
        .map(|(_, ty)| DetectionResult::known(*ty))
}

fn looks_like_html(lower: &str) -> bool {
    lower.contains("<!doctype html") || lower.contains("<html")
}
