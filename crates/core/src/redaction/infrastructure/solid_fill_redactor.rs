use crate::error::BoxError;
use crate::redaction::domain::frame_redactor::FrameRedactor;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Default fill: opaque black.
pub const DEFAULT_FILL: [u8; 3] = [0, 0, 0];

/// Overwrites every pixel of each box with one solid color.
///
/// Hard rectangular edges, no blending. Boxes are clipped to the frame and
/// empty boxes are skipped, so overlap and draw order never matter.
pub struct SolidFillRedactor {
    fill: [u8; 3],
}

impl SolidFillRedactor {
    pub fn new(fill: [u8; 3]) -> Self {
        Self { fill }
    }
}

impl Default for SolidFillRedactor {
    fn default() -> Self {
        Self::new(DEFAULT_FILL)
    }
}

impl FrameRedactor for SolidFillRedactor {
    fn redact(&self, frame: &mut Frame, boxes: &[BoundingBox]) -> Result<(), BoxError> {
        let fw = frame.width();
        let fh = frame.height();
        let channels = frame.channels() as usize;
        if channels < 3 {
            return Err(format!("expected an RGB frame, got {channels} channel(s)").into());
        }
        let stride = fw as usize * channels;
        let data = frame.data_mut();

        for b in boxes {
            let Some(b) = b.clamp_to(fw, fh) else {
                continue;
            };
            let x0 = b.x as usize * channels;
            let x1 = b.right() as usize * channels;
            for row in b.y as usize..b.bottom() as usize {
                let line = &mut data[row * stride + x0..row * stride + x1];
                for px in line.chunks_exact_mut(channels) {
                    px[..3].copy_from_slice(&self.fill);
                }
            }
        }

        Ok(())
    }
}
