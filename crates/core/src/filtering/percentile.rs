//! Percentile computation for threshold calibration.

/// The p-th percentile of `samples` with linear interpolation between
/// ranked values: rank = p/100 * (n-1), fractional ranks interpolate
/// between the two neighboring order statistics. Ties and tiny sample
/// counts are valid inputs.
///
/// # Panics
///
/// Panics on an empty sample set; callers guard on sample counts.
pub fn percentile(samples: &[f64], p: f64) -> f64 {
    assert!(!samples.is_empty(), "percentile of empty sample set");

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}
