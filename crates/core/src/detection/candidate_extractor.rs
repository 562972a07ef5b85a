use crate::shared::candidate::{Candidate, RawDetection};

/// Normalizes raw detector output into validated candidates.
///
/// Degenerate boxes (`width <= 0` or `height <= 0`) are dropped silently:
/// they are routine detector noise, not errors. Order is preserved.
pub fn extract_candidates(detections: &[RawDetection]) -> Vec<Candidate> {
    detections.iter().filter_map(Candidate::from_raw).collect()
}
