use crate::shared::candidate::AcceptedCandidate;
use crate::shared::frame::Frame;

use super::run_summary::RunSummary;

/// Consumes the accepted-candidate list for every frame (drawing,
/// rendering, aggregation downstream of the engine).
///
/// `annotate` is called once per source frame, whether that frame was
/// sampled or merely reused the cached result. Sink errors are fatal.
pub trait AnnotationSink: Send {
    fn annotate(
        &mut self,
        frame: &Frame,
        accepted: &[AcceptedCandidate],
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Called once after the last frame with the run-level aggregates.
    fn finish(&mut self, _summary: &RunSummary) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
