/// Cross-cutting observer for pipeline progress and status.
///
/// Decouples the executor from a concrete output mechanism so callers
/// (CLI, tests) can watch a run without changing orchestration code.
pub trait RunLogger: Send {
    /// Report frame-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);
}

/// Silent logger for tests and embedders with their own progress channel.
pub struct NullRunLogger;

impl RunLogger for NullRunLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger backed by the `log` crate. Progress lines are throttled to
/// every `throttle_frames` frames to avoid flooding output on long runs.
pub struct LogRunLogger {
    throttle_frames: usize,
}

impl LogRunLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
        }
    }
}

impl Default for LogRunLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl RunLogger for LogRunLogger {
    fn progress(&mut self, current: usize, total: usize) {
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("processing: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("processing: frame {current}");
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }
}
