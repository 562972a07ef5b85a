use crate::shared::candidate::RawDetection;
use crate::shared::frame::Frame;

/// Domain interface for per-frame object detection.
///
/// Implementations may be stateful, hence `&mut self`. An `Err` means the
/// whole frame failed; the pipeline degrades to an empty accepted list for
/// that frame rather than aborting the run.
pub trait Detector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>>;
}
