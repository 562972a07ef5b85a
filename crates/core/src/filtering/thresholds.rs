/// Geometric and confidence bounds applied to every candidate.
///
/// Exactly one instance is active per run. It starts *provisional* (loose
/// fallback bounds so the pipeline never starts blind) and is replaced
/// wholesale by the calibrator at most once; there is no partial update.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdSet {
    pub min_area: f64,
    pub max_area: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    pub min_confidence: f64,
}

impl ThresholdSet {
    /// Loose bounds active until calibration fires. `max_area` scales with
    /// the frame so the fallback works across resolutions.
    pub fn provisional(fallback: &FallbackBounds, frame_area: f64) -> Self {
        Self {
            min_area: fallback.min_area,
            max_area: fallback.max_area_fraction * frame_area,
            min_aspect_ratio: fallback.min_aspect_ratio,
            max_aspect_ratio: fallback.max_aspect_ratio,
            min_confidence: fallback.min_confidence,
        }
    }
}

/// Fallback bounds used before calibration. The defaults were tuned
/// empirically on face detections and are deliberately permissive.
#[derive(Clone, Debug, PartialEq)]
pub struct FallbackBounds {
    /// Minimum candidate area in pixels (default: a 40x40 box).
    pub min_area: f64,
    /// Maximum candidate area as a fraction of the frame area.
    pub max_area_fraction: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    pub min_confidence: f64,
}

impl Default for FallbackBounds {
    fn default() -> Self {
        Self {
            min_area: 1600.0,
            max_area_fraction: 0.60,
            min_aspect_ratio: 0.30,
            max_aspect_ratio: 3.00,
            min_confidence: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_provisional_defaults() {
        let t = ThresholdSet::provisional(&FallbackBounds::default(), 1_000_000.0);
        assert_relative_eq!(t.min_area, 1600.0);
        assert_relative_eq!(t.max_area, 600_000.0);
        assert_relative_eq!(t.min_aspect_ratio, 0.30);
        assert_relative_eq!(t.max_aspect_ratio, 3.00);
        assert_relative_eq!(t.min_confidence, 0.0);
    }

    #[test]
    fn test_provisional_max_area_scales_with_frame() {
        let fallback = FallbackBounds::default();
        let small = ThresholdSet::provisional(&fallback, 100.0);
        let large = ThresholdSet::provisional(&fallback, 1000.0);
        assert_relative_eq!(small.max_area * 10.0, large.max_area);
    }
}
