use crate::pipeline::annotation_sink::AnnotationSink;
use crate::pipeline::frame_source::FrameSource;
use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::run_logger::RunLogger;
use crate::pipeline::run_summary::RunSummary;
use crate::pipeline::sampling_coordinator::SamplingCoordinator;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Bounded-buffer producer/consumer execution of the filtering pipeline.
///
/// Layout: `reader -> main [detect/calibrate/filter/classify -> sink]`.
///
/// One producer thread drains the frame source into a bounded channel so
/// decode overlaps with detection; the single consumer thread owns all
/// engine state (thresholds, persistence history, cache), which makes
/// locking unnecessary by construction. Back-pressure comes from the
/// channel capacity. There is no cancellation beyond end-of-stream or a
/// fatal error.
pub struct ThreadedPipelineExecutor {
    channel_capacity: usize,
}

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadedPipelineExecutor {
    /// Runs the pipeline to end-of-stream. The source must already be
    /// open; `metadata` supplies the total-frame hint for progress.
    pub fn execute(
        &self,
        source: Box<dyn FrameSource>,
        mut coordinator: SamplingCoordinator,
        mut sink: Box<dyn AnnotationSink>,
        logger: &mut dyn RunLogger,
        metadata: &VideoMetadata,
    ) -> Result<RunSummary, PipelineError> {
        let total_frames = metadata.total_frames;

        let (frame_tx, frame_rx) =
            crossbeam_channel::bounded::<Result<Frame, SendError>>(self.channel_capacity);
        let reader_handle = spawn_reader(source, frame_tx);

        let mut frames_done: usize = 0;
        let mut first_error: Option<PipelineError> = None;

        for frame_result in &frame_rx {
            match frame_result {
                Ok(frame) => {
                    let accepted = coordinator.process_frame(&frame);
                    if let Err(e) = sink.annotate(&frame, accepted) {
                        first_error = Some(PipelineError::Sink(e.to_string()));
                        break;
                    }
                    frames_done += 1;
                    logger.progress(frames_done, total_frames);
                }
                Err(e) => {
                    // A frame that cannot be read degrades to an
                    // annotation-free cycle; the run continues.
                    log::warn!("frame read failed, dropping cached annotations: {e}");
                    coordinator.invalidate_cache();
                }
            }
        }

        // Unblocks the reader if we bailed out early.
        drop(frame_rx);

        if reader_handle.join().is_err() && first_error.is_none() {
            first_error = Some(PipelineError::WorkerPanic("reader"));
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let summary = coordinator.summary();
        sink.finish(&summary)
            .map_err(|e| PipelineError::Sink(e.to_string()))?;
        logger.info(&format!(
            "run complete: {} frames, {} sampled, {} accepted",
            summary.total_frames, summary.frames_sampled, summary.accepted_total
        ));
        Ok(summary)
    }
}

fn spawn_reader(
    mut source: Box<dyn FrameSource>,
    frame_tx: crossbeam_channel::Sender<Result<Frame, SendError>>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for frame_result in source.frames() {
            let mapped = frame_result.map_err(|e| -> SendError { e.to_string().into() });
            if frame_tx.send(mapped).is_err() {
                break;
            }
        }
        source.close();
    })
}
