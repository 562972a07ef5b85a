/// Metadata reported by a frame source when it is opened.
///
/// `total_frames` is a hint and may be zero when the container does not
/// carry a frame count.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
}

impl VideoMetadata {
    /// Frame area in pixels; the calibrator's outlier cap and the
    /// provisional max-area bound are expressed relative to it.
    pub fn frame_area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }
}
