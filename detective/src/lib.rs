//! Detection, validation and normalization of CI artifacts.
//!
//! This crate builds on the catalog in [`artifact_detective_core`] and
//! provides the operations that touch documents:
//!
//! - [`detector`] classifies an artifact file into an [`ArtifactType`] using
//!   an ordered table of sniffers.
//! - [`parser::html`] recovers machine-readable reports embedded in
//!   pytest-html and Playwright HTML reports.
//! - [`linters`] finds a linter's output block inside a CI job log.
//! - [`collector`] runs linter extraction over batches of downloaded logs
//!   and saves the results.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use artifact_detective::{validate_artifact, ArtifactType, TypeDetector};
//!
//! let content = r#"{"testResults": [], "numTotalTests": 0}"#;
//! let result = TypeDetector::builtin().detect(Path::new("jest-results.json"), Some(content));
//! let ty = result.artifact_type().unwrap();
//! assert_eq!(ty, ArtifactType::JestJson);
//! assert!(validate_artifact(ty, content).valid);
//! ```
//!
//! # Feature flags
//!
//! - **`clap`** (default): derives `clap::ValueEnum` for [`OutputFormat`].

pub mod collector;
pub mod config;
pub mod detector;
mod error;
pub mod linters;
pub mod output;
pub mod parser;

pub use artifact_detective_core::*;
pub use collector::{CollectorConfig, LinterCollection, LogExtractionRule, collect_linter_outputs};
pub use config::DetectiveConfig;
pub use detector::{
    CustomTypeMapping, SNIFFER_ORDER, SnifferKind, TypeDetector, detect_artifact_type,
};
pub use error::{DetectiveError, Result};
pub use linters::{MarkerConfig, detect_linter_type, extract_between_markers, extract_linter_output};
pub use output::{OutputFormat, format_value};
pub use parser::html::{
    extract_playwright_json, extract_pytest_json, playwright_report_from_html, pytest_report_from_html,
};
