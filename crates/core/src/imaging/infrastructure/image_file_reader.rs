use std::path::Path;

use crate::error::BoxError;
use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Decodes PNG/JPEG files with the `image` crate.
///
/// The format is sniffed from the file content, falling back to the
/// extension, so a mislabeled file still decodes and a text file named
/// `x.png` is rejected. Alpha, palette and 16-bit inputs are flattened to
/// 8-bit RGB.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, BoxError> {
        let img = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?
            .into_rgb8();
        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height, 3))
    }
}
