use std::fs;
use std::path::PathBuf;

use artifact_detective::{
    ArtifactType, CustomTypeMapping, DetectedType, OriginalFormat, TypeDetector,
    detect_artifact_type, validate_artifact,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file must be readable")
}

const TYPED_FIXTURES: &[(&str, ArtifactType)] = &[
    ("playwright-results.json", ArtifactType::PlaywrightJson),
    ("jest-results.json", ArtifactType::JestJson),
    ("pytest-report.json", ArtifactType::PytestJson),
    ("checkstyle.sarif", ArtifactType::CheckstyleSarifJson),
    ("eslint.json", ArtifactType::EslintJson),
    ("go-test.ndjson", ArtifactType::GoTestNdjson),
    ("clippy.ndjson", ArtifactType::ClippyNdjson),
    ("mypy.ndjson", ArtifactType::MypyNdjson),
    ("junit.xml", ArtifactType::JunitXml),
    ("checkstyle.xml", ArtifactType::CheckstyleXml),
    ("spotbugs.xml", ArtifactType::SpotbugsXml),
    ("pytest-report.html", ArtifactType::PytestHtml),
    ("pytest-legacy.html", ArtifactType::PytestHtml),
    ("playwright-report.html", ArtifactType::PlaywrightHtml),
    ("jest-report.html", ArtifactType::JestHtml),
    ("surefire-report.html", ArtifactType::SurefireHtml),
    ("tsc.txt", ArtifactType::TscTxt),
    ("eslint.txt", ArtifactType::EslintTxt),
    ("mypy.txt", ArtifactType::MypyTxt),
    ("pylint.txt", ArtifactType::PylintTxt),
    ("ruff.txt", ArtifactType::RuffTxt),
    ("flake8.txt", ArtifactType::Flake8Txt),
    ("black.txt", ArtifactType::BlackTxt),
    ("isort.txt", ArtifactType::IsortTxt),
    ("prettier.txt", ArtifactType::PrettierTxt),
    ("cargo-test.txt", ArtifactType::CargoTestTxt),
    ("clippy.txt", ArtifactType::ClippyTxt),
    ("rustfmt.txt", ArtifactType::RustfmtTxt),
    ("gofmt.txt", ArtifactType::GofmtTxt),
];

#[test]
fn test_every_fixture_is_detected() {
    for (name, expected) in TYPED_FIXTURES {
        let result = detect_artifact_type(fixture_path(name));
        assert_eq!(
            result.artifact_type(),
            Some(*expected),
            "{name} detected as {}",
            result.detected_type
        );
        assert_eq!(result.original_format, expected.original_format(), "{name}");
        assert!(!result.is_binary, "{name}");
    }
}

#[test]
fn test_detected_fixtures_validate() {
    for (name, expected) in TYPED_FIXTURES {
        let validation = validate_artifact(*expected, &fixture(name));
        assert!(validation.valid, "{name}: {:?}", validation.error);
    }
}

#[test]
fn test_fixtures_fail_foreign_validators() {
    assert!(!validate_artifact(ArtifactType::JestJson, &fixture("playwright-results.json")).valid);
    assert!(!validate_artifact(ArtifactType::JunitXml, &fixture("checkstyle.xml")).valid);
    assert!(!validate_artifact(ArtifactType::TscTxt, &fixture("mypy.txt")).valid);
    assert!(!validate_artifact(ArtifactType::PytestHtml, &fixture("jest-report.html")).valid);
}

#[test]
fn test_binary_fixture_is_not_read() {
    let result = detect_artifact_type(fixture_path("screenshot.png"));
    assert_eq!(result.detected_type, DetectedType::Known(ArtifactType::Binary));
    assert_eq!(result.original_format, OriginalFormat::Binary);
    assert!(result.is_binary);
}

#[test]
fn test_unrecognized_fixtures_are_unknown() {
    for name in ["notes.txt", "plain.html", "build-job.log"] {
        let result = detect_artifact_type(fixture_path(name));
        assert_eq!(result.detected_type, DetectedType::Unknown, "{name}");
        assert_eq!(result.original_format, OriginalFormat::Txt, "{name}");
    }
}

#[test]
fn test_detection_ignores_file_name() {
    // A misleading extension does not override content sniffing.
    let detector = TypeDetector::builtin();
    let content = fixture("junit.xml");
    let result = detector.detect(&fixture_path("results.json"), Some(&content));
    assert_eq!(result.artifact_type(), Some(ArtifactType::JunitXml));
}

#[test]
fn test_custom_mapping_overrides_content() {
    let detector = TypeDetector::builtin()
        .with_custom_types([CustomTypeMapping::new(r"^notes\.txt$", "black-txt").unwrap()]);
    let result = detector.detect(&fixture_path("notes.txt"), None);
    assert_eq!(result.artifact_type(), Some(ArtifactType::BlackTxt));

    let untouched = detector.detect(&fixture_path("tsc.txt"), None);
    assert_eq!(untouched.artifact_type(), Some(ArtifactType::TscTxt));
}

#[test]
fn test_detection_is_stable_across_calls() {
    let path = fixture_path("ruff.txt");
    let first = detect_artifact_type(&path);
    for _ in 0..3 {
        assert_eq!(detect_artifact_type(&path), first);
    }
}
