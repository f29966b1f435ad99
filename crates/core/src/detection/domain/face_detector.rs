use crate::error::BoxError;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::GrayFrame;

/// Domain interface for face detection.
///
/// Detection is read-only (`&self`), so one detector can be built up front
/// and reused for every image in a batch.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, gray: &GrayFrame) -> Result<Vec<BoundingBox>, BoxError>;
}
