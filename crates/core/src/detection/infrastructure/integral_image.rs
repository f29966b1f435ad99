use crate::shared::frame::GrayFrame;

/// Summed-area tables over a grayscale plane.
///
/// Both tables carry a zero top row and left column, so they are
/// `(width + 1) x (height + 1)` and any rectangle sum costs four lookups.
pub struct IntegralImage {
    sum: Vec<i64>,
    sq_sum: Vec<f64>,
    stride: usize,
    width: u32,
    height: u32,
}

impl IntegralImage {
    pub fn new(gray: &GrayFrame) -> Self {
        let w = gray.width() as usize;
        let h = gray.height() as usize;
        let stride = w + 1;
        let mut sum = vec![0i64; stride * (h + 1)];
        let mut sq_sum = vec![0f64; stride * (h + 1)];
        let data = gray.data();

        for y in 0..h {
            let mut row_sum = 0i64;
            let mut row_sq = 0f64;
            for x in 0..w {
                let v = data[y * w + x] as i64;
                row_sum += v;
                row_sq += (v * v) as f64;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sq_sum[idx] = sq_sum[idx - stride] + row_sq;
            }
        }

        Self {
            sum,
            sq_sum,
            stride,
            width: gray.width(),
            height: gray.height(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel sum over `[x, x + w) x [y, y + h)`.
    #[inline]
    pub fn rect_sum(&self, x: usize, y: usize, w: usize, h: usize) -> i64 {
        let s = self.stride;
        let a = y * s + x;
        let b = a + w;
        let c = (y + h) * s + x;
        let d = c + w;
        self.sum[d] - self.sum[b] - self.sum[c] + self.sum[a]
    }

    /// Sum of squared pixels over `[x, x + w) x [y, y + h)`.
    #[inline]
    pub fn rect_sq_sum(&self, x: usize, y: usize, w: usize, h: usize) -> f64 {
        let s = self.stride;
        let a = y * s + x;
        let b = a + w;
        let c = (y + h) * s + x;
        let d = c + w;
        self.sq_sum[d] - self.sq_sum[b] - self.sq_sum[c] + self.sq_sum[a]
    }
}
