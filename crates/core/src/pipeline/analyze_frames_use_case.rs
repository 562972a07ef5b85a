use std::path::Path;

use crate::detection::classifier::Classifier;
use crate::detection::detector::Detector;

use super::annotation_sink::AnnotationSink;
use super::engine_config::EngineConfig;
use super::frame_source::FrameSource;
use super::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use super::pipeline_error::PipelineError;
use super::run_logger::{NullRunLogger, RunLogger};
use super::run_summary::RunSummary;
use super::sampling_coordinator::SamplingCoordinator;

/// Orchestrates one full analysis run: opens the source, wires the
/// sampling coordinator, and delegates execution to the threaded
/// pipeline.
///
/// Single-use: `execute` consumes the owned collaborators, so a second
/// call fails with `PipelineError::AlreadyExecuted`.
pub struct AnalyzeFramesUseCase {
    source: Option<Box<dyn FrameSource>>,
    detector: Option<Box<dyn Detector>>,
    classifier: Option<Box<dyn Classifier>>,
    sink: Option<Box<dyn AnnotationSink>>,
    logger: Box<dyn RunLogger>,
    config: EngineConfig,
}

impl AnalyzeFramesUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn Detector>,
        classifier: Option<Box<dyn Classifier>>,
        sink: Box<dyn AnnotationSink>,
        logger: Option<Box<dyn RunLogger>>,
        config: EngineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            source: Some(source),
            detector: Some(detector),
            classifier,
            sink: Some(sink),
            logger: logger.unwrap_or_else(|| Box::new(NullRunLogger)),
            config,
        })
    }

    pub fn execute(&mut self, input: &Path) -> Result<RunSummary, PipelineError> {
        let mut source = self.source.take().ok_or(PipelineError::AlreadyExecuted)?;
        let detector = self.detector.take().ok_or(PipelineError::AlreadyExecuted)?;
        let sink = self.sink.take().ok_or(PipelineError::AlreadyExecuted)?;

        let metadata = source
            .open(input)
            .map_err(|e| PipelineError::SourceOpen(e.to_string()))?;
        self.logger.info(&format!(
            "source opened: {}x{} @ {:.1} fps, {} frames",
            metadata.width, metadata.height, metadata.fps, metadata.total_frames
        ));

        let coordinator = SamplingCoordinator::new(
            detector,
            self.classifier.take(),
            &self.config,
            &metadata,
        );

        ThreadedPipelineExecutor::new().execute(
            source,
            coordinator,
            sink,
            self.logger.as_mut(),
            &metadata,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::candidate::{AcceptedCandidate, RawDetection};
    use crate::shared::frame::Frame;
    use crate::shared::video_metadata::VideoMetadata;
    use std::sync::{Arc, Mutex};

    struct StubSource {
        frame_count: usize,
        fail_open: bool,
    }

    impl FrameSource for StubSource {
        fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err("cannot open".into());
            }
            Ok(VideoMetadata {
                width: 100,
                height: 100,
                fps: 30.0,
                total_frames: self.frame_count,
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            let count = self.frame_count;
            Box::new(
                (0..count).map(|i| Ok(Frame::new(vec![0u8; 100 * 100 * 3], 100, 100, 3, i))),
            )
        }

        fn close(&mut self) {}
    }

    struct StubDetector;

    impl Detector for StubDetector {
        fn detect(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
            Ok(vec![RawDetection {
                x: 10,
                y: 10,
                width: 30,
                height: 30,
                confidence: Some(0.9),
            }])
        }
    }

    struct CountingSink {
        frames_seen: Arc<Mutex<usize>>,
    }

    impl AnnotationSink for CountingSink {
        fn annotate(
            &mut self,
            _frame: &Frame,
            _accepted: &[AcceptedCandidate],
        ) -> Result<(), Box<dyn std::error::Error>> {
            *self.frames_seen.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn use_case(frame_count: usize, fail_open: bool) -> (AnalyzeFramesUseCase, Arc<Mutex<usize>>) {
        let frames_seen = Arc::new(Mutex::new(0));
        let mut config = EngineConfig::default();
        config.persistence_min_hits = 1;
        config.fallback.min_area = 1.0;
        let uc = AnalyzeFramesUseCase::new(
            Box::new(StubSource {
                frame_count,
                fail_open,
            }),
            Box::new(StubDetector),
            None,
            Box::new(CountingSink {
                frames_seen: frames_seen.clone(),
            }),
            None,
            config,
        )
        .unwrap();
        (uc, frames_seen)
    }

    #[test]
    fn test_execute_runs_pipeline_to_completion() {
        let (mut uc, frames_seen) = use_case(9, false);
        let summary = uc.execute(Path::new("/tmp/in.mp4")).unwrap();
        assert_eq!(*frames_seen.lock().unwrap(), 9);
        assert_eq!(summary.total_frames, 9);
        assert_eq!(summary.frames_sampled, 3); // default step 3
    }

    #[test]
    fn test_second_execute_fails() {
        let (mut uc, _) = use_case(3, false);
        uc.execute(Path::new("/tmp/in.mp4")).unwrap();
        let result = uc.execute(Path::new("/tmp/in.mp4"));
        assert!(matches!(result, Err(PipelineError::AlreadyExecuted)));
    }

    #[test]
    fn test_open_failure_is_fatal_and_run_never_starts() {
        let (mut uc, frames_seen) = use_case(3, true);
        let result = uc.execute(Path::new("/tmp/in.mp4"));
        assert!(matches!(result, Err(PipelineError::SourceOpen(_))));
        assert_eq!(*frames_seen.lock().unwrap(), 0);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = EngineConfig {
            frame_step: 0,
            ..EngineConfig::default()
        };
        let result = AnalyzeFramesUseCase::new(
            Box::new(StubSource {
                frame_count: 0,
                fail_open: false,
            }),
            Box::new(StubDetector),
            None,
            Box::new(CountingSink {
                frames_seen: Arc::new(Mutex::new(0)),
            }),
            None,
            config,
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
