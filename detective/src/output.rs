//! Output formatting for detection results and extracted reports.

use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Serializes any result type in the requested output format.
///
/// ```
/// use artifact_detective::{format_value, ArtifactType, DetectionResult, OutputFormat};
///
/// let result = DetectionResult::known(ArtifactType::JunitXml);
/// let yaml = format_value(&result, OutputFormat::Yaml).unwrap();
/// assert!(yaml.contains("detectedType: junit-xml"));
/// ```
pub fn format_value<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}
