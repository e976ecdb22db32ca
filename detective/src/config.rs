//! YAML configuration for detection and log collection.
//!
//! # Example YAML
//!
//! ```yaml
//! output_dir: ./artifacts
//! jobs: 4
//! custom_artifact_types:
//!   - pattern: "custom-.*\\.json$"
//!     type: jest-json
//!     reason: Custom test format
//! extract_artifact_types_from_logs:
//!   - type: eslint-txt
//!     match_job_name: lint
//!     required: false
//!     extractor:
//!       start_marker: START_ESLINT
//!       end_marker: END_ESLINT
//!       include_end_marker: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::collector::{CollectorConfig, LogExtractionRule};
use crate::detector::{CustomTypeMapping, TypeDetector};
use crate::error::{DetectiveError, Result};
use crate::linters::MarkerConfig;

/// Filename pattern forced to a fixed artifact type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTypeConfig {
    pub pattern: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Typed artifact to extract from matching job logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRuleConfig {
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_job_name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<MarkerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Top-level configuration.
///
/// Every field is optional; an empty document yields the builtin behavior.
///
/// # Examples
///
/// ```
/// use artifact_detective::DetectiveConfig;
///
/// let config: DetectiveConfig = serde_yaml::from_str("jobs: 2").unwrap();
/// assert_eq!(config.jobs, Some(2));
/// assert!(config.custom_artifact_types.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectiveConfig {
    /// Root directory for collected outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Collector worker threads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    pub custom_artifact_types: Vec<CustomTypeConfig>,
    pub extract_artifact_types_from_logs: Vec<LogRuleConfig>,
}

impl DetectiveConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`DetectiveError::Io`] if the file cannot be read, or
    /// [`DetectiveError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| DetectiveError::io(path, e))?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`DetectiveError::Io`] if the file cannot be written, or
    /// [`DetectiveError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| DetectiveError::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Compiles the custom type mappings, in configuration order.
    pub fn custom_type_mappings(&self) -> Result<Vec<CustomTypeMapping>> {
        self.custom_artifact_types
            .iter()
            .map(|mapping| CustomTypeMapping::new(&mapping.pattern, &mapping.artifact_type))
            .collect()
    }

    /// Builtin detector extended with this configuration's mappings.
    pub fn type_detector(&self) -> Result<TypeDetector<'static>> {
        Ok(TypeDetector::builtin().with_custom_types(self.custom_type_mappings()?))
    }

    /// Collector settings with every extraction rule compiled.
    pub fn collector_config(&self) -> Result<CollectorConfig> {
        let rules = self
            .extract_artifact_types_from_logs
            .iter()
            .map(|rule| {
                LogExtractionRule::new(
                    &rule.artifact_type,
                    rule.match_job_name.as_deref(),
                    rule.extractor.clone(),
                    rule.required,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CollectorConfig {
            jobs: self.jobs,
            rules,
        })
    }
}
