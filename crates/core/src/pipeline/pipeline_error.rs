use thiserror::Error;

/// Fatal run errors. Per-frame detector/classifier failures are *not*
/// represented here; they degrade to an empty accepted list for the
/// affected frame and the run continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to open frame source: {0}")]
    SourceOpen(String),

    #[error("annotation sink failed: {0}")]
    Sink(String),

    #[error("pipeline already executed")]
    AlreadyExecuted,

    #[error("{0} thread panicked")]
    WorkerPanic(&'static str),
}
