//! Tool text output sniffing.

use artifact_detective_core::patterns::TextSignature;
use artifact_detective_core::DetectionResult;

/// Returns the first signature in `signatures` that sniffs positive.
pub fn sniff(signatures: &[TextSignature], content: &str) -> Option<DetectionResult> {
    signatures
        .iter()
        .find(|signature| signature.sniff(content))
        .map(|signature| DetectionResult::known(signature.artifact_type))
}
