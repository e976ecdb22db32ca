//! Batch collection of linter outputs from downloaded CI job logs.
//!
//! For every successfully downloaded log the collector detects the linter,
//! cuts its output block out of the log and saves it under
//! `<output_dir>/linting/<run_id>/`. Configured extraction rules can pull
//! additional typed artifacts out of the same logs. Logs are processed in
//! parallel within a run; a failing log is reported and skipped without
//! affecting the rest of the batch.

use std::collections::BTreeMap;
use std::path::Path;

use artifact_detective_core::{
    ArtifactType, ExtractionStatus, JobLog, LinterOutput, validate_artifact,
};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{DetectiveError, Result};
use crate::linters::{
    MarkerConfig, detect_linter_type, extract_between_markers, extract_linter_output,
};

/// Directory under the output root that receives linter outputs.
pub const LINTING_DIR: &str = "linting";

/// A configured instruction to cut one typed artifact out of job logs.
#[derive(Debug, Clone)]
pub struct LogExtractionRule {
    pub artifact_type: ArtifactType,
    /// Only jobs whose name matches are considered; `None` matches all jobs.
    pub match_job_name: Option<Regex>,
    /// Marker lines bounding the block. Without markers, linter text types
    /// fall back to the linter's own scan rules.
    pub extractor: Option<MarkerConfig>,
    /// Warn when a matching job yields nothing.
    pub required: bool,
}

impl LogExtractionRule {
    /// Resolves the artifact type tag and compiles the job-name pattern.
    ///
    /// # Errors
    ///
    /// Returns [`DetectiveError::InvalidArtifactType`] for a tag outside the
    /// catalog and [`DetectiveError::Regex`] for an invalid pattern.
    pub fn new(
        artifact_type: &str,
        match_job_name: Option<&str>,
        extractor: Option<MarkerConfig>,
        required: bool,
    ) -> Result<Self> {
        let match_job_name = match_job_name
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| DetectiveError::Regex {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;
        Ok(Self {
            artifact_type: artifact_type.parse()?,
            match_job_name,
            extractor,
            required,
        })
    }

    pub fn matches_job(&self, job_name: &str) -> bool {
        self.match_job_name
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(job_name))
    }

    /// Extracts this rule's block from `log`.
    pub fn extract(&self, log: &str) -> Option<String> {
        match &self.extractor {
            Some(markers) => extract_between_markers(log, markers),
            None => extract_linter_output(self.artifact_type.linter_label()?, log),
        }
    }
}

/// Settings for [`collect_linter_outputs`].
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    /// Worker threads; `None` or `0` uses one per available CPU.
    pub jobs: Option<usize>,
    pub rules: Vec<LogExtractionRule>,
}

/// Saved outputs grouped by run id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinterCollection {
    pub linter_outputs: BTreeMap<String, Vec<LinterOutput>>,
}

impl LinterCollection {
    pub fn total(&self) -> usize {
        self.linter_outputs.values().map(Vec::len).sum()
    }
}

/// Replaces characters outside `[A-Za-z0-9_-]` with `-`, collapses runs of
/// `-` and trims them from both ends.
///
/// ```
/// use artifact_detective::collector::sanitize_job_name;
///
/// assert_eq!(sanitize_job_name("Lint / ESLint (node 20)"), "Lint-ESLint-node-20");
/// ```
pub fn sanitize_job_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}

/// Extracts and saves linter outputs for every run in `logs_by_run`.
///
/// Saved outputs are appended to each [`JobLog::linter_outputs`] and
/// returned grouped by run. Runs without any output are omitted.
///
/// # Errors
///
/// Only fails when the worker pool cannot be created. Per-log failures are
/// logged and skipped.
pub fn collect_linter_outputs(
    output_dir: &Path,
    logs_by_run: &mut BTreeMap<String, Vec<JobLog>>,
    config: &CollectorConfig,
) -> Result<LinterCollection> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = config.jobs.filter(|jobs| *jobs > 0) {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build()?;

    let mut collection = LinterCollection::default();
    for (run_id, logs) in logs_by_run.iter_mut() {
        debug!(run = %run_id, logs = logs.len(), "Processing linter outputs");
        let run_dir = output_dir.join(LINTING_DIR).join(run_id);

        let found: Vec<Vec<LinterOutput>> = pool.install(|| {
            logs.par_iter()
                .map(|log| process_log(&run_dir, log, config))
                .collect()
        });

        let mut run_outputs = Vec::new();
        for (log, outputs) in logs.iter_mut().zip(found) {
            log.linter_outputs.extend(outputs.iter().cloned());
            run_outputs.extend(outputs);
        }
        if !run_outputs.is_empty() {
            collection.linter_outputs.insert(run_id.clone(), run_outputs);
        }
    }

    Ok(collection)
}

fn process_log(run_dir: &Path, log: &JobLog, config: &CollectorConfig) -> Vec<LinterOutput> {
    if log.extraction_status != ExtractionStatus::Success {
        return Vec::new();
    }
    let Some(log_file) = log.log_file.as_deref() else {
        return Vec::new();
    };

    let content = match std::fs::read(log_file) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            let e = DetectiveError::io(log_file, e);
            error!(job = %log.job_name, error = %e, "Failed to read job log");
            return Vec::new();
        }
    };

    let job = sanitize_job_name(&log.job_name);
    let mut outputs = Vec::new();

    match detect_linter_type(&log.job_name, &content) {
        Some(label) => {
            let block = extract_linter_output(label, &content);
            let artifact_type = ArtifactType::from_linter_label(label);
            if let (Some(block), Some(artifact_type)) = (block, artifact_type) {
                let path = run_dir.join(format!("{job}-{label}.txt"));
                outputs.extend(save(&log.job_name, &path, &block, artifact_type));
            }
        }
        None => debug!(job = %log.job_name, "No linter detected"),
    }

    for rule in config.rules.iter().filter(|rule| rule.matches_job(&log.job_name)) {
        let ty = rule.artifact_type;
        let Some(block) = rule.extract(&content) else {
            if rule.required {
                warn!(job = %log.job_name, artifact_type = %ty, "Required artifact not found in job log");
            }
            continue;
        };

        let validation = validate_artifact(ty, &block);
        if !validation.valid {
            warn!(
                job = %log.job_name,
                artifact_type = %ty,
                error = validation.error.as_deref().unwrap_or_default(),
                "Extracted content does not validate"
            );
        }
        let path = run_dir.join(format!("{job}-{ty}.{}", ty.original_format().file_extension()));
        outputs.extend(save(&log.job_name, &path, &block, ty));
    }

    outputs
}

fn save(job_name: &str, path: &Path, content: &str, artifact_type: ArtifactType) -> Option<LinterOutput> {
    match write_output(path, content) {
        Ok(()) => {
            info!(job = job_name, path = %path.display(), "Saved linter output");
            Some(LinterOutput {
                detected_type: artifact_type,
                file_path: path.to_path_buf(),
            })
        }
        Err(e) => {
            error!(job = job_name, error = %e, "Failed to save linter output");
            None
        }
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| DetectiveError::io(dir, e))?;
    }
    std::fs::write(path, content).map_err(|e| DetectiveError::io(path, e))
}
