use crate::filtering::calibrator::CalibratorConfig;
use crate::filtering::thresholds::FallbackBounds;

use super::pipeline_error::PipelineError;

/// Named numeric knobs for one pipeline run. Supplied at run start,
/// immutable afterward.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Run full detection/filtering every Nth frame; the frames in between
    /// reuse the last accepted set.
    pub frame_step: usize,
    /// A grid cell must recur this many times within the persistence
    /// window to be accepted (`<= 1` disables the filter).
    pub persistence_min_hits: usize,
    /// Quantization cell size in pixels for the persistence filter.
    pub grid_size: f64,
    /// Persistence window length (accepted-candidate evaluations).
    pub history_capacity: usize,
    /// Margin added around a candidate box before classification,
    /// as a fraction of max(w, h).
    pub crop_pad_ratio: f64,
    pub fallback: FallbackBounds,
    pub calibration: CalibratorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_step: 3,
            persistence_min_hits: 2,
            grid_size: 60.0,
            history_capacity: 10,
            crop_pad_ratio: 0.15,
            fallback: FallbackBounds::default(),
            calibration: CalibratorConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.frame_step < 1 {
            return Err(PipelineError::Config("frame_step must be >= 1".into()));
        }
        if self.grid_size <= 0.0 {
            return Err(PipelineError::Config("grid_size must be positive".into()));
        }
        if self.history_capacity < 1 {
            return Err(PipelineError::Config("history_capacity must be >= 1".into()));
        }
        if self.calibration.warmup_target < 1 {
            return Err(PipelineError::Config("warmup_target must be >= 1".into()));
        }
        Ok(())
    }
}
