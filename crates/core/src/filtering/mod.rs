pub mod calibrator;
pub mod candidate_filter;
pub mod percentile;
pub mod persistence;
pub mod thresholds;
