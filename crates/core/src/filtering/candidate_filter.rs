use crate::shared::candidate::Candidate;

use super::thresholds::ThresholdSet;

/// Area and aspect ratio within the closed bounds of the active set.
pub fn passes_geometry(candidate: &Candidate, thresholds: &ThresholdSet) -> bool {
    let area = candidate.area();
    if area < thresholds.min_area || area > thresholds.max_area {
        return false;
    }
    let ar = candidate.aspect_ratio();
    thresholds.min_aspect_ratio <= ar && ar <= thresholds.max_aspect_ratio
}

/// A candidate without a confidence score always passes; a backend that
/// reports no confidence must never be blocked by this check.
pub fn passes_confidence(candidate: &Candidate, thresholds: &ThresholdSet) -> bool {
    match candidate.confidence() {
        None => true,
        Some(c) => c >= thresholds.min_confidence,
    }
}

/// Combined predicate, evaluated against whatever ThresholdSet is active
/// at call time (provisional or calibrated).
pub fn passes(candidate: &Candidate, thresholds: &ThresholdSet) -> bool {
    passes_geometry(candidate, thresholds) && passes_confidence(candidate, thresholds)
}
