use crate::shared::candidate::Label;
use crate::shared::frame::Frame;

/// Black-box classifier over a cropped candidate region (emotion,
/// identity, ...).
///
/// `Ok(None)` means "no result for this crop" and drops only that
/// candidate. `Err` is reserved for fatal failures and fails the whole
/// frame.
pub trait Classifier: Send {
    fn classify(&mut self, crop: &Frame) -> Result<Option<Label>, Box<dyn std::error::Error>>;
}
