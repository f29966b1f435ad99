use std::path::Path;

use crate::error::BoxError;
use crate::shared::frame::Frame;

/// Decodes a raster image file into an RGB [`Frame`].
pub trait ImageReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Frame, BoxError>;
}
