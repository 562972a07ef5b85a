use super::percentile::percentile;
use super::thresholds::ThresholdSet;

const AREA_LOW_PERCENTILE: f64 = 10.0;
const AREA_HIGH_PERCENTILE: f64 = 95.0;
const ASPECT_LOW_PERCENTILE: f64 = 5.0;
const ASPECT_HIGH_PERCENTILE: f64 = 95.0;
const CONFIDENCE_PERCENTILE: f64 = 20.0;

/// Calibrator knobs. The guardrail constants are video-dependent and were
/// tuned empirically, so they are configuration rather than literals.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibratorConfig {
    /// Number of area samples to collect before calibrating.
    pub warmup_target: usize,
    /// Samples at or above this fraction of the frame area are discarded
    /// as outliers (e.g. a detector returning a near-full-frame box).
    pub outlier_area_fraction: f64,
    /// Aspect-ratio spread below which the distribution is considered
    /// collapsed and the fallback window is used instead.
    pub ar_collapse_epsilon: f64,
    pub ar_fallback_min: f64,
    pub ar_fallback_max: f64,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            warmup_target: 150,
            outlier_area_fraction: 0.60,
            ar_collapse_epsilon: 0.15,
            ar_fallback_min: 0.6,
            ar_fallback_max: 1.6,
        }
    }
}

/// Accumulates geometric/confidence samples during warm-up and derives
/// percentile-based thresholds exactly once.
///
/// Two states, one-way: **collecting** until the warm-up target is
/// reached, then **calibrated** (terminal). Samples are discarded once
/// calibration completes; only the counts survive for reporting.
pub struct ThresholdCalibrator {
    config: CalibratorConfig,
    frame_area: f64,
    areas: Vec<f64>,
    aspect_ratios: Vec<f64>,
    confidences: Vec<f64>,
    calibrated: bool,
    area_samples_seen: usize,
    confidence_samples_seen: usize,
}

impl ThresholdCalibrator {
    pub fn new(config: CalibratorConfig, frame_area: f64) -> Self {
        Self {
            config,
            frame_area,
            areas: Vec::new(),
            aspect_ratios: Vec::new(),
            confidences: Vec::new(),
            calibrated: false,
            area_samples_seen: 0,
            confidence_samples_seen: 0,
        }
    }

    /// Collects one sample. No-op once calibrated. Non-positive areas and
    /// near-full-frame outliers are skipped; confidence is recorded only
    /// when the detector actually reported one.
    pub fn add_sample(&mut self, area: f64, aspect_ratio: f64, confidence: Option<f64>) {
        if self.calibrated || area <= 0.0 {
            return;
        }
        if area >= self.config.outlier_area_fraction * self.frame_area {
            return;
        }

        self.areas.push(area);
        self.aspect_ratios.push(aspect_ratio);
        if let Some(c) = confidence {
            self.confidences.push(c);
        }
    }

    /// True once enough samples have been collected and `calibrate` has
    /// not yet run.
    pub fn ready(&self) -> bool {
        !self.calibrated && self.areas.len() >= self.config.warmup_target
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Derives the calibrated ThresholdSet and transitions to the terminal
    /// state, releasing the sample buffers. Callers gate on `ready()`.
    pub fn calibrate(&mut self) -> ThresholdSet {
        debug_assert!(self.ready(), "calibrate called before ready");

        let mut min_aspect_ratio = percentile(&self.aspect_ratios, ASPECT_LOW_PERCENTILE);
        let mut max_aspect_ratio = percentile(&self.aspect_ratios, ASPECT_HIGH_PERCENTILE);

        // Guardrail: a collapsed distribution (every box the same shape)
        // would pin the window shut and reject normal pose variation.
        if (max_aspect_ratio - min_aspect_ratio) < self.config.ar_collapse_epsilon {
            min_aspect_ratio = self.config.ar_fallback_min;
            max_aspect_ratio = self.config.ar_fallback_max;
        }

        let min_confidence = if self.confidences.is_empty() {
            0.0
        } else {
            percentile(&self.confidences, CONFIDENCE_PERCENTILE)
        };

        let thresholds = ThresholdSet {
            min_area: percentile(&self.areas, AREA_LOW_PERCENTILE),
            max_area: percentile(&self.areas, AREA_HIGH_PERCENTILE),
            min_aspect_ratio,
            max_aspect_ratio,
            min_confidence,
        };

        self.area_samples_seen = self.areas.len();
        self.confidence_samples_seen = self.confidences.len();
        self.areas = Vec::new();
        self.aspect_ratios = Vec::new();
        self.confidences = Vec::new();
        self.calibrated = true;

        thresholds
    }

    /// Area samples that fed calibration (current count while collecting).
    pub fn area_sample_count(&self) -> usize {
        if self.calibrated {
            self.area_samples_seen
        } else {
            self.areas.len()
        }
    }

    pub fn confidence_sample_count(&self) -> usize {
        if self.calibrated {
            self.confidence_samples_seen
        } else {
            self.confidences.len()
        }
    }
}
