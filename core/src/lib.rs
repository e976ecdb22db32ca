//! Core catalog types and structural validators for CI artifacts.
//!
//! This crate defines the shared vocabulary of the artifact detective:
//!
//! - [`ArtifactType`]: the closed catalog of known artifact formats.
//! - [`DetectionResult`]: the immutable classification of one artifact.
//! - [`PytestReport`] / [`PlaywrightReport`]: canonical report shapes the
//!   HTML extractors normalize into.
//! - [`JobLog`] / [`LinterOutput`]: CI job logs and the linter blocks
//!   extracted from them.
//!
//! Validation ([`validate`], [`validate_artifact`]) checks that content has
//! the structural shape of its type without ever failing on foreign input.
//!
//! # Example
//!
//! ```
//! use artifact_detective_core::*;
//!
//! let result = DetectionResult::known(ArtifactType::JestJson);
//! assert_eq!(result.original_format, OriginalFormat::Json);
//!
//! let content = r#"{"testResults": [], "numTotalTests": 0}"#;
//! assert!(validate_artifact(ArtifactType::JestJson, content).valid);
//! assert!(!validate_artifact(ArtifactType::PlaywrightJson, content).valid);
//! ```

mod descriptor;
pub mod patterns;
mod report;
pub mod shapes;
mod types;
mod validate;

pub use descriptor::ArtifactDescriptor;
pub use report::*;
pub use types::*;
pub use validate::*;
