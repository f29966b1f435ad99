use crate::error::BoxError;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for obscuring regions of a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) to avoid allocation.
pub trait FrameRedactor: Send + Sync {
    fn redact(&self, frame: &mut Frame, boxes: &[BoundingBox]) -> Result<(), BoxError>;
}
