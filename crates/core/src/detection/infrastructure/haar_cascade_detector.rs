use std::path::Path;

use image::imageops::{self, FilterType};

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::rect_grouper::RectGrouper;
use crate::error::{BoxError, ScrubError};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::GrayFrame;

use super::haar_cascade::HaarCascade;
use super::integral_image::IntegralImage;

/// Multi-scale sliding-window face detector over a boosted Haar cascade.
///
/// The image is downscaled by `scale_factor` per pass and scanned with the
/// cascade's fixed window, so a hit at scale `f` maps back to a box of
/// `window * f` pixels. Raw hits are clustered by [`RectGrouper`].
pub struct HaarCascadeDetector {
    cascade: HaarCascade,
    params: DetectionParams,
    grouper: RectGrouper,
}

impl HaarCascadeDetector {
    pub fn new(cascade: HaarCascade, params: DetectionParams) -> Result<Self, ScrubError> {
        params.validate().map_err(ScrubError::InvalidParams)?;
        Ok(Self {
            cascade,
            params,
            grouper: RectGrouper::default(),
        })
    }

    /// Loads the cascade XML at `path` and builds a detector from it.
    pub fn from_file(path: &Path, params: DetectionParams) -> Result<Self, ScrubError> {
        let cascade =
            HaarCascade::load(path).map_err(|e| ScrubError::ModelUnavailable(Box::new(e)))?;
        log::info!(
            "Loaded cascade {} ({} stages, {} features)",
            path.display(),
            cascade.stages().len(),
            cascade.features().len()
        );
        Self::new(cascade, params)
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Every accepted window across all scales, before grouping.
    pub fn raw_hits(&self, gray: &GrayFrame) -> Result<Vec<BoundingBox>, BoxError> {
        if gray.is_empty() {
            return Err("cannot detect on an empty image".into());
        }

        let (win_w, win_h) = self.cascade.window_size();
        let (img_w, img_h) = (gray.width(), gray.height());
        let (max_w, max_h) = self.params.max_size.unwrap_or((img_w, img_h));
        let (min_w, min_h) = self.params.min_size;

        let mut hits = Vec::new();
        let mut factor = 1.0f64;
        loop {
            let box_w = (win_w as f64 * factor).round() as u32;
            let box_h = (win_h as f64 * factor).round() as u32;
            if box_w > max_w || box_h > max_h {
                break;
            }
            let scaled_w = (img_w as f64 / factor).round() as u32;
            let scaled_h = (img_h as f64 / factor).round() as u32;
            if scaled_w < win_w || scaled_h < win_h {
                break;
            }
            if box_w >= min_w && box_h >= min_h {
                let integral = if scaled_w == img_w && scaled_h == img_h {
                    IntegralImage::new(gray)
                } else {
                    IntegralImage::new(&downscale(gray, scaled_w, scaled_h)?)
                };
                let before = hits.len();
                self.scan(&integral, factor, (box_w, box_h), &mut hits);
                log::trace!(
                    "scale {factor:.3}: {}x{} image, {} hits",
                    scaled_w,
                    scaled_h,
                    hits.len() - before
                );
            }
            factor *= self.params.scale_factor;
        }
        Ok(hits)
    }

    fn scan(
        &self,
        integral: &IntegralImage,
        factor: f64,
        box_size: (u32, u32),
        hits: &mut Vec<BoundingBox>,
    ) {
        let (win_w, win_h) = self.cascade.window_size();
        let work_w = (integral.width() - win_w + 1) as usize;
        let work_h = (integral.height() - win_h + 1) as usize;
        let step = if factor > 2.0 { 1 } else { 2 };

        let mut y = 0;
        while y < work_h {
            let mut x = 0;
            while x < work_w {
                let result = self.run_at(integral, x, y);
                if result > 0 {
                    hits.push(BoundingBox::new(
                        (x as f64 * factor).round() as u32,
                        (y as f64 * factor).round() as u32,
                        box_size.0,
                        box_size.1,
                    ));
                }
                // Rejected by the very first stage: the neighbour is unlikely to pass either.
                if result == 0 {
                    x += step;
                }
                x += step;
            }
            y += step;
        }
    }

    /// Runs the cascade on the window at `(x, y)`.
    ///
    /// Returns 1 when every stage passes, otherwise `-i` for the rejecting
    /// stage `i` (so 0 means rejected by the first stage).
    fn run_at(&self, integral: &IntegralImage, x: usize, y: usize) -> i32 {
        let (win_w, win_h) = self.cascade.window_size();
        let (nw, nh) = (win_w as usize - 2, win_h as usize - 2);
        let area = (nw * nh) as f64;
        let sum = integral.rect_sum(x + 1, y + 1, nw, nh) as f64;
        let sq_sum = integral.rect_sq_sum(x + 1, y + 1, nw, nh);
        let nf = area * sq_sum - sum * sum;
        let inv_norm = if nf > 0.0 { 1.0 / nf.sqrt() } else { 1.0 };

        let features = self.cascade.features();
        let feature_value = |fi: usize| {
            let raw: f64 = features[fi]
                .rects
                .iter()
                .map(|r| {
                    r.weight
                        * integral.rect_sum(
                            x + r.x as usize,
                            y + r.y as usize,
                            r.width as usize,
                            r.height as usize,
                        ) as f64
                })
                .sum();
            raw * inv_norm
        };

        for (si, stage) in self.cascade.stages().iter().enumerate() {
            let score: f64 = stage
                .classifiers
                .iter()
                .map(|wc| wc.evaluate(feature_value))
                .sum();
            if score < stage.threshold {
                return -(si as i32);
            }
        }
        1
    }
}

impl FaceDetector for HaarCascadeDetector {
    fn detect(&self, gray: &GrayFrame) -> Result<Vec<BoundingBox>, BoxError> {
        let hits = self.raw_hits(gray)?;
        let grouped = self.grouper.group(&hits, self.params.min_neighbors);
        log::debug!("{} raw hits grouped into {} faces", hits.len(), grouped.len());
        Ok(grouped
            .iter()
            .filter_map(|b| b.clamp_to(gray.width(), gray.height()))
            .collect())
    }
}

fn downscale(gray: &GrayFrame, width: u32, height: u32) -> Result<GrayFrame, BoxError> {
    let src = image::GrayImage::from_raw(gray.width(), gray.height(), gray.data().to_vec())
        .ok_or("gray buffer does not match its dimensions")?;
    let resized = imageops::resize(&src, width, height, FilterType::Triangle);
    Ok(GrayFrame::new(resized.into_raw(), width, height))
}
