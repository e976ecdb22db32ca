//! Artifact catalog and detection type definitions.
//!
//! This module defines the closed catalog of artifact formats the detective
//! knows about, the coarse container kind each format lives in, and the
//! immutable [`DetectionResult`] produced once per artifact. All types are
//! plain data and serialize with [`serde`] so catalog and rendering
//! collaborators can persist them.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when parsing a tag that is not in the artifact catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown artifact type: {0}")]
pub struct UnknownArtifactType(pub String);

/// Coarse container kind of an artifact.
///
/// Always consistent with the [`ArtifactType`] it belongs to.
///
/// # Examples
///
/// ```
/// use artifact_detective_core::{ArtifactType, OriginalFormat};
///
/// assert_eq!(ArtifactType::PytestHtml.original_format(), OriginalFormat::Html);
/// assert_eq!(OriginalFormat::Ndjson.as_str(), "ndjson");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginalFormat {
    Json,
    Xml,
    Html,
    Txt,
    Ndjson,
    Binary,
}

impl OriginalFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Txt => "txt",
            Self::Ndjson => "ndjson",
            Self::Binary => "binary",
        }
    }

    /// File extension used when an artifact of this kind is written to disk.
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Binary => "bin",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for OriginalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! artifact_types {
    ($( $(#[$doc:meta])* $variant:ident => ($tag:literal, $format:ident) ),+ $(,)?) => {
        /// Closed catalog of known artifact formats.
        ///
        /// Tags are a versioned vocabulary: adding a variant is additive,
        /// removing one is breaking for anything that persisted the tag.
        ///
        /// # Examples
        ///
        /// ```
        /// use artifact_detective_core::ArtifactType;
        ///
        /// let ty: ArtifactType = "tsc-txt".parse().unwrap();
        /// assert_eq!(ty, ArtifactType::TscTxt);
        /// assert_eq!(ty.to_string(), "tsc-txt");
        /// assert!("made-up-json".parse::<ArtifactType>().is_err());
        /// ```
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ArtifactType {
            $( $(#[$doc])* $variant, )+
        }

        impl ArtifactType {
            /// Every catalog member, in catalog order.
            pub const ALL: &'static [ArtifactType] = &[ $( ArtifactType::$variant, )+ ];

            /// Returns the kebab-case tag for this type.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $tag, )+
                }
            }

            /// Returns the container kind this type is stored in.
            pub fn original_format(self) -> OriginalFormat {
                match self {
                    $( Self::$variant => OriginalFormat::$format, )+
                }
            }
        }

        impl FromStr for ArtifactType {
            type Err = UnknownArtifactType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $tag => Ok(Self::$variant), )+
                    other => Err(UnknownArtifactType(other.to_string())),
                }
            }
        }
    };
}

artifact_types! {
    /// Playwright JSON reporter output.
    PlaywrightJson => ("playwright-json", Json),
    /// Jest `--json` output.
    JestJson => ("jest-json", Json),
    /// jest-html-reporter / jest-stare report.
    JestHtml => ("jest-html", Html),
    /// pytest-json-report output.
    PytestJson => ("pytest-json", Json),
    /// pytest-html report.
    PytestHtml => ("pytest-html", Html),
    /// Playwright HTML report.
    PlaywrightHtml => ("playwright-html", Html),
    /// JUnit-style XML test report.
    JunitXml => ("junit-xml", Xml),
    /// Checkstyle XML report.
    CheckstyleXml => ("checkstyle-xml", Xml),
    /// SARIF output (checkstyle and friends).
    CheckstyleSarifJson => ("checkstyle-sarif-json", Json),
    /// SpotBugs XML report.
    SpotbugsXml => ("spotbugs-xml", Xml),
    /// Maven Surefire HTML report.
    SurefireHtml => ("surefire-html", Html),
    /// ESLint `--format json` output.
    EslintJson => ("eslint-json", Json),
    /// mypy `-O json` output, one record per line.
    MypyNdjson => ("mypy-ndjson", Ndjson),
    /// mypy JSON array output.
    MypyJson => ("mypy-json", Json),
    /// ESLint stylish text output.
    EslintTxt => ("eslint-txt", Txt),
    /// TypeScript compiler diagnostics.
    TscTxt => ("tsc-txt", Txt),
    /// Ruff text output.
    RuffTxt => ("ruff-txt", Txt),
    /// mypy text output.
    MypyTxt => ("mypy-txt", Txt),
    /// flake8 text output.
    Flake8Txt => ("flake8-txt", Txt),
    /// pylint text output.
    PylintTxt => ("pylint-txt", Txt),
    /// Prettier `--check` output.
    PrettierTxt => ("prettier-txt", Txt),
    /// Black `--check` output.
    BlackTxt => ("black-txt", Txt),
    /// isort `--check-only` output.
    IsortTxt => ("isort-txt", Txt),
    /// `cargo test` output.
    CargoTestTxt => ("cargo-test-txt", Txt),
    /// `cargo clippy --message-format=json` output.
    ClippyNdjson => ("clippy-ndjson", Ndjson),
    /// Clippy messages collected into a JSON array.
    ClippyJson => ("clippy-json", Json),
    /// Clippy human-readable output.
    ClippyTxt => ("clippy-txt", Txt),
    /// `cargo fmt --check` output.
    RustfmtTxt => ("rustfmt-txt", Txt),
    /// `gofmt -l` / `gofmt -d` output.
    GofmtTxt => ("gofmt-txt", Txt),
    /// `go test -json` output.
    GoTestNdjson => ("go-test-ndjson", Ndjson),
    /// Images, videos, archives and other opaque files.
    Binary => ("binary", Binary),
}

/// Linter labels that have a `<label>-txt` catalog member.
const LINTER_LABELS: &[(&str, ArtifactType)] = &[
    ("eslint", ArtifactType::EslintTxt),
    ("prettier", ArtifactType::PrettierTxt),
    ("ruff", ArtifactType::RuffTxt),
    ("flake8", ArtifactType::Flake8Txt),
    ("isort", ArtifactType::IsortTxt),
    ("black", ArtifactType::BlackTxt),
    ("tsc", ArtifactType::TscTxt),
    ("mypy", ArtifactType::MypyTxt),
    ("pylint", ArtifactType::PylintTxt),
];

impl ArtifactType {
    /// Maps a linter label (`"mypy"`) to its text artifact type (`mypy-txt`).
    ///
    /// # Examples
    ///
    /// ```
    /// use artifact_detective_core::ArtifactType;
    ///
    /// assert_eq!(ArtifactType::from_linter_label("ruff"), Some(ArtifactType::RuffTxt));
    /// assert_eq!(ArtifactType::from_linter_label("cargo"), None);
    /// ```
    pub fn from_linter_label(label: &str) -> Option<Self> {
        LINTER_LABELS
            .iter()
            .find(|(candidate, _)| *candidate == label)
            .map(|(_, ty)| *ty)
    }

    /// Returns the linter label for linter text types, `None` otherwise.
    pub fn linter_label(self) -> Option<&'static str> {
        LINTER_LABELS
            .iter()
            .find(|(_, ty)| *ty == self)
            .map(|(label, _)| *label)
    }

    pub fn is_binary(self) -> bool {
        self == Self::Binary
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ArtifactType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArtifactType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Classification outcome: a catalog member or the explicit `unknown` sentinel.
///
/// # Examples
///
/// ```
/// use artifact_detective_core::{ArtifactType, DetectedType};
///
/// assert_eq!(DetectedType::Unknown.as_str(), "unknown");
/// assert_eq!(DetectedType::from(ArtifactType::JunitXml).as_str(), "junit-xml");
/// assert_eq!("unknown".parse::<DetectedType>().unwrap(), DetectedType::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectedType {
    Known(ArtifactType),
    Unknown,
}

impl DetectedType {
    pub const UNKNOWN_TAG: &'static str = "unknown";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Known(ty) => ty.as_str(),
            Self::Unknown => Self::UNKNOWN_TAG,
        }
    }

    pub fn known(self) -> Option<ArtifactType> {
        match self {
            Self::Known(ty) => Some(ty),
            Self::Unknown => None,
        }
    }
}

impl From<ArtifactType> for DetectedType {
    fn from(ty: ArtifactType) -> Self {
        Self::Known(ty)
    }
}

impl FromStr for DetectedType {
    type Err = UnknownArtifactType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::UNKNOWN_TAG {
            return Ok(Self::Unknown);
        }
        s.parse().map(Self::Known)
    }
}

impl fmt::Display for DetectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DetectedType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DetectedType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Result of classifying one artifact.
///
/// Produced once per artifact and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use artifact_detective_core::{ArtifactType, DetectionResult, OriginalFormat};
///
/// let result = DetectionResult::known(ArtifactType::Binary);
/// assert!(result.is_binary);
/// assert_eq!(result.original_format, OriginalFormat::Binary);
///
/// let json = serde_json::to_string(&result).unwrap();
/// assert_eq!(json, r#"{"detectedType":"binary","originalFormat":"binary","isBinary":true}"#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub detected_type: DetectedType,
    pub original_format: OriginalFormat,
    pub is_binary: bool,
}

impl DetectionResult {
    /// Builds a result for a catalog member; format and binary flag follow the type.
    pub fn known(ty: ArtifactType) -> Self {
        Self {
            detected_type: DetectedType::Known(ty),
            original_format: ty.original_format(),
            is_binary: ty.is_binary(),
        }
    }

    /// Builds an `unknown` result for content of the given container kind.
    pub fn unknown(format: OriginalFormat) -> Self {
        Self {
            detected_type: DetectedType::Unknown,
            original_format: format,
            is_binary: format == OriginalFormat::Binary,
        }
    }

    pub fn artifact_type(&self) -> Option<ArtifactType> {
        self.detected_type.known()
    }
}

/// Outcome of fetching one job's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    #[default]
    Success,
    Failed,
    Skipped,
}

/// Linter output block saved from one job log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinterOutput {
    pub detected_type: ArtifactType,
    pub file_path: PathBuf,
}

/// A downloaded CI job log and the outputs extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLog {
    pub job_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub extraction_status: ExtractionStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linter_outputs: Vec<LinterOutput>,
}

impl JobLog {
    pub fn new(job_name: impl Into<String>, log_file: impl Into<PathBuf>) -> Self {
        Self {
            job_name: job_name.into(),
            log_file: Some(log_file.into()),
            extraction_status: ExtractionStatus::Success,
            linter_outputs: Vec::new(),
        }
    }
}
