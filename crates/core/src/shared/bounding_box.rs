/// An axis-aligned face region in pixel coordinates.
///
/// Boxes handed to the redactor are always non-empty and contained in
/// the image they were detected on; [`BoundingBox::clamp_to`] enforces this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Intersects the box with a `width` x `height` image.
    ///
    /// Returns `None` when nothing of the box remains inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        let x1 = self.x.min(width);
        let y1 = self.y.min(height);
        let x2 = self.right().min(width);
        let y2 = self.bottom().min(height);
        let clamped = BoundingBox::new(x1, y1, x2 - x1, y2 - y1);
        (!clamped.is_empty()).then_some(clamped)
    }
}
