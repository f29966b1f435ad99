use crate::shared::constants::{DEFAULT_MIN_NEIGHBORS, DEFAULT_MIN_SIZE, DEFAULT_SCALE_FACTOR};

/// Tuning knobs for the multi-scale cascade scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    /// Pyramid step between scan passes. Must be > 1.0.
    pub scale_factor: f64,
    /// A cluster of raw hits needs more than this many members to be kept.
    pub min_neighbors: u32,
    /// Smallest face box reported, `(width, height)`.
    pub min_size: (u32, u32),
    /// Largest face box reported. `None` means bounded by the image.
    pub max_size: Option<(u32, u32)>,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_size: (DEFAULT_MIN_SIZE, DEFAULT_MIN_SIZE),
            max_size: None,
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), String> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 1.0 {
            return Err(format!(
                "scale factor must be greater than 1.0, got {}",
                self.scale_factor
            ));
        }
        if let Some((max_w, max_h)) = self.max_size {
            if max_w < self.min_size.0 || max_h < self.min_size.1 {
                return Err(format!(
                    "max size {max_w}x{max_h} is smaller than min size {}x{}",
                    self.min_size.0, self.min_size.1
                ));
            }
        }
        Ok(())
    }
}
