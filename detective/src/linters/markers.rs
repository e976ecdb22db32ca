//! Extraction of blocks delimited by explicit start/end marker lines.

use serde::{Deserialize, Serialize};

use super::scan::strip_timestamp;

/// Marker lines bounding a block a CI job prints on purpose.
///
/// ```
/// use artifact_detective::linters::{extract_between_markers, MarkerConfig};
///
/// let log = "noise\nSTART_ESLINT\n  1:1  error  no-var\nEND_ESLINT\nmore noise\n";
/// let config = MarkerConfig {
///     start_marker: "START_ESLINT".into(),
///     end_marker: Some("END_ESLINT".into()),
///     include_end_marker: false,
/// };
/// assert_eq!(extract_between_markers(log, &config).as_deref(), Some("  1:1  error  no-var"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub start_marker: String,
    pub end_marker: Option<String>,
    pub include_end_marker: bool,
}

/// Returns the lines after the first line containing the start marker, up
/// to the end-marker line or the end of the log.
///
/// Returns `None` when the start marker is missing or empty, or when nothing
/// was captured.
pub fn extract_between_markers(log: &str, config: &MarkerConfig) -> Option<String> {
    if config.start_marker.is_empty() {
        return None;
    }
    let end_marker = config.end_marker.as_deref().filter(|m| !m.is_empty());

    let mut lines = log.lines().map(strip_timestamp);
    lines.by_ref().find(|line| line.contains(&config.start_marker))?;

    let mut block = Vec::new();
    for line in lines {
        if end_marker.is_some_and(|end| line.contains(end)) {
            if config.include_end_marker {
                block.push(line);
            }
            break;
        }
        block.push(line);
    }

    while block.last().is_some_and(|line| line.trim().is_empty()) {
        block.pop();
    }
    (!block.is_empty()).then(|| block.join("\n"))
}
