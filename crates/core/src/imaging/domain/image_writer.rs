use std::path::Path;

use crate::error::BoxError;
use crate::shared::frame::Frame;

/// Writes a frame to an image file, overwriting whatever is there.
///
/// The container format follows the destination's extension.
pub trait ImageWriter: Send + Sync {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), BoxError>;
}
