//! Artifact type detection.
//!
//! Classification runs an ordered table of sniffers ([`SNIFFER_ORDER`]) and
//! the first sniffer that accepts wins. Path-only sniffers (custom mappings,
//! binary extensions) run before any content is read, so binary files are
//! never loaded.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use artifact_detective::{ArtifactType, TypeDetector};
//!
//! let detector = TypeDetector::builtin();
//! let result = detector.detect(
//!     Path::new("tsc.log"),
//!     Some("src/file.ts(12,5): error TS1234: message\n"),
//! );
//! assert_eq!(result.artifact_type(), Some(ArtifactType::TscTxt));
//! ```

mod binary;
mod markup;
mod structured;
mod text;

use std::path::Path;
use std::sync::LazyLock;

use artifact_detective_core::patterns::{TEXT_SIGNATURES, TextSignature};
use artifact_detective_core::{ArtifactType, DetectionResult, OriginalFormat};
use regex::Regex;
use tracing::debug;

use crate::error::{DetectiveError, Result};

pub use binary::{BINARY_EXTENSIONS, has_binary_extension};
pub use markup::XML_MARKERS;
pub use structured::{DOCUMENT_SHAPES, RECORD_SHAPES};

/// One stage of the detection pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnifferKind {
    /// Configured filename patterns.
    CustomMapping,
    /// Binary extension allowlist.
    BinaryExtension,
    /// JSON documents and line-delimited JSON streams.
    StructuredJson,
    /// XML report roots.
    XmlMarkers,
    /// HTML report markers.
    HtmlMarkers,
    /// Tool text output families.
    TextPatterns,
}

impl SnifferKind {
    fn reads_content(self) -> bool {
        !matches!(self, Self::CustomMapping | Self::BinaryExtension)
    }
}

/// Sniffers in evaluation order. Content that no sniffer accepts is
/// classified as unknown text.
pub const SNIFFER_ORDER: &[SnifferKind] = &[
    SnifferKind::CustomMapping,
    SnifferKind::BinaryExtension,
    SnifferKind::StructuredJson,
    SnifferKind::XmlMarkers,
    SnifferKind::HtmlMarkers,
    SnifferKind::TextPatterns,
];

/// Maps file names matching a pattern to a fixed artifact type.
#[derive(Debug, Clone)]
pub struct CustomTypeMapping {
    pub pattern: Regex,
    pub artifact_type: ArtifactType,
}

impl CustomTypeMapping {
    /// Compiles `pattern` and resolves the `artifact_type` tag.
    ///
    /// # Errors
    ///
    /// Returns [`DetectiveError::Regex`] for an invalid pattern and
    /// [`DetectiveError::InvalidArtifactType`] for a tag outside the catalog.
    pub fn new(pattern: &str, artifact_type: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| DetectiveError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: regex,
            artifact_type: artifact_type.parse()?,
        })
    }

    /// Matches against the file name first, then the full path.
    pub fn matches(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        self.pattern.is_match(&file_name) || self.pattern.is_match(&path.to_string_lossy())
    }
}

/// Classifies artifacts by path and content.
///
/// The text family table is borrowed so callers can substitute their own;
/// [`TypeDetector::builtin`] uses the shared static table.
#[derive(Debug, Clone)]
pub struct TypeDetector<'a> {
    custom_types: Vec<CustomTypeMapping>,
    text_signatures: &'a [TextSignature],
}

static BUILTIN: LazyLock<TypeDetector<'static>> = LazyLock::new(TypeDetector::builtin);

impl TypeDetector<'static> {
    /// Detector with the builtin text families and no custom mappings.
    pub fn builtin() -> Self {
        Self::new(TEXT_SIGNATURES.as_slice())
    }
}

impl<'a> TypeDetector<'a> {
    pub fn new(text_signatures: &'a [TextSignature]) -> Self {
        Self {
            custom_types: Vec::new(),
            text_signatures,
        }
    }

    /// Adds filename mappings consulted before every other sniffer.
    pub fn with_custom_types(mut self, mappings: impl IntoIterator<Item = CustomTypeMapping>) -> Self {
        self.custom_types.extend(mappings);
        self
    }

    pub fn custom_types(&self) -> &[CustomTypeMapping] {
        &self.custom_types
    }

    /// Classifies the artifact at `path`.
    ///
    /// When `content` is `None` the file is read only if a content sniffer
    /// is reached. An unreadable file is unknown text, and a file that is
    /// not valid UTF-8 is unknown binary. A leading byte order mark is
    /// ignored.
    pub fn detect(&self, path: &Path, content: Option<&str>) -> DetectionResult {
        let mut source = ContentSource::new(path, content);

        for &kind in SNIFFER_ORDER {
            let accepted = if kind.reads_content() {
                match source.text() {
                    Ok(text) => self.sniff_content(kind, text),
                    Err(fallback) => return fallback,
                }
            } else {
                self.sniff_path(kind, path)
            };

            if let Some(result) = accepted {
                debug!(path = %path.display(), sniffer = ?kind, detected = %result.detected_type, "Detected artifact type");
                return result;
            }
        }

        debug!(path = %path.display(), "No sniffer accepted artifact");
        DetectionResult::unknown(OriginalFormat::Txt)
    }

    fn sniff_path(&self, kind: SnifferKind, path: &Path) -> Option<DetectionResult> {
        match kind {
            SnifferKind::CustomMapping => self
                .custom_types
                .iter()
                .find(|mapping| mapping.matches(path))
                .map(|mapping| DetectionResult::known(mapping.artifact_type)),
            SnifferKind::BinaryExtension => {
                has_binary_extension(path).then(|| DetectionResult::known(ArtifactType::Binary))
            }
            _ => None,
        }
    }

    fn sniff_content(&self, kind: SnifferKind, content: &str) -> Option<DetectionResult> {
        match kind {
            SnifferKind::StructuredJson => structured::sniff(content),
            SnifferKind::XmlMarkers => markup::sniff_xml(content),
            SnifferKind::HtmlMarkers => markup::sniff_html(content),
            SnifferKind::TextPatterns => text::sniff(self.text_signatures, content),
            _ => None,
        }
    }
}

impl Default for TypeDetector<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Classifies the file at `path` with the builtin detector.
pub fn detect_artifact_type(path: impl AsRef<Path>) -> DetectionResult {
    BUILTIN.detect(path.as_ref(), None)
}

/// Content for the content sniffers, read from disk at most once.
struct ContentSource<'p, 'c> {
    path: &'p Path,
    provided: Option<&'c str>,
    loaded: Option<std::result::Result<String, DetectionResult>>,
}

impl<'p, 'c> ContentSource<'p, 'c> {
    fn new(path: &'p Path, provided: Option<&'c str>) -> Self {
        Self {
            path,
            provided,
            loaded: None,
        }
    }

    fn text(&mut self) -> std::result::Result<&str, DetectionResult> {
        if let Some(provided) = self.provided {
            return Ok(strip_bom(provided));
        }
        let path = self.path;
        match self.loaded.get_or_insert_with(|| read_text(path)) {
            Ok(text) => Ok(strip_bom(text)),
            Err(fallback) => Err(*fallback),
        }
    }
}

fn read_text(path: &Path) -> std::result::Result<String, DetectionResult> {
    let bytes = std::fs::read(path).map_err(|e| {
        debug!(path = %path.display(), error = %e, "Failed to read artifact");
        DetectionResult::unknown(OriginalFormat::Txt)
    })?;
    String::from_utf8(bytes).map_err(|_| DetectionResult::unknown(OriginalFormat::Binary))
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}
