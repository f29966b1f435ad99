use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::GROUP_EPS;

/// Clusters raw sliding-window hits into final detections.
///
/// Hits are partitioned into equivalence classes of "similar" boxes, each
/// class is averaged into one box, and classes with too few members are
/// dropped. A surviving class nested inside a stronger one is dropped too,
/// which removes the small boxes a cascade tends to fire on inside a face.
pub struct RectGrouper {
    eps: f64,
}

impl RectGrouper {
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// Groups `rects`, keeping clusters with more than `min_neighbors` members.
    ///
    /// With `min_neighbors == 0` the input is returned unchanged.
    pub fn group(&self, rects: &[BoundingBox], min_neighbors: u32) -> Vec<BoundingBox> {
        if min_neighbors == 0 || rects.is_empty() {
            return rects.to_vec();
        }

        let (labels, n_classes) = self.partition(rects);

        let mut sums = vec![[0i64; 4]; n_classes];
        let mut counts = vec![0u32; n_classes];
        for (r, &label) in rects.iter().zip(&labels) {
            let s = &mut sums[label];
            s[0] += r.x as i64;
            s[1] += r.y as i64;
            s[2] += r.width as i64;
            s[3] += r.height as i64;
            counts[label] += 1;
        }

        let averaged: Vec<Rect> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &n)| {
                let inv = 1.0 / n as f64;
                Rect {
                    x: (s[0] as f64 * inv).round() as i64,
                    y: (s[1] as f64 * inv).round() as i64,
                    w: (s[2] as f64 * inv).round() as i64,
                    h: (s[3] as f64 * inv).round() as i64,
                }
            })
            .collect();

        let mut result = Vec::new();
        for i in 0..n_classes {
            let n1 = counts[i];
            if n1 <= min_neighbors {
                continue;
            }
            let r1 = averaged[i];
            let nested = (0..n_classes).any(|j| {
                let n2 = counts[j];
                j != i
                    && n2 > min_neighbors
                    && self.is_nested(&r1, &averaged[j])
                    && (n2 > n1.max(3) || n1 < 3)
            });
            if !nested {
                result.push(BoundingBox::new(
                    r1.x.max(0) as u32,
                    r1.y.max(0) as u32,
                    r1.w.max(0) as u32,
                    r1.h.max(0) as u32,
                ));
            }
        }
        result
    }

    /// Two boxes are similar when every edge moves by at most
    /// `eps * mean(min side)`.
    pub fn is_similar(&self, a: &BoundingBox, b: &BoundingBox) -> bool {
        let delta = self.eps
            * (a.width.min(b.width) as f64 + a.height.min(b.height) as f64)
            * 0.5;
        let close = |p: u32, q: u32| (p as f64 - q as f64).abs() <= delta;
        close(a.x, b.x) && close(a.y, b.y) && close(a.right(), b.right()) && close(a.bottom(), b.bottom())
    }

    fn is_nested(&self, inner: &Rect, outer: &Rect) -> bool {
        let dx = (outer.w as f64 * self.eps).round() as i64;
        let dy = (outer.h as f64 * self.eps).round() as i64;
        inner.x >= outer.x - dx
            && inner.y >= outer.y - dy
            && inner.x + inner.w <= outer.x + outer.w + dx
            && inner.y + inner.h <= outer.y + outer.h + dy
    }

    /// Union-find over the similarity relation. Labels are dense and
    /// numbered in order of first appearance.
    fn partition(&self, rects: &[BoundingBox]) -> (Vec<usize>, usize) {
        let n = rects.len();
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if self.is_similar(&rects[i], &rects[j]) {
                    let ri = find(&mut parent, i);
                    let rj = find(&mut parent, j);
                    if ri != rj {
                        parent[rj] = ri;
                    }
                }
            }
        }

        let mut root_label = vec![usize::MAX; n];
        let mut labels = Vec::with_capacity(n);
        let mut n_classes = 0;
        for i in 0..n {
            let root = find(&mut parent, i);
            if root_label[root] == usize::MAX {
                root_label[root] = n_classes;
                n_classes += 1;
            }
            labels.push(root_label[root]);
        }
        (labels, n_classes)
    }
}

impl Default for RectGrouper {
    fn default() -> Self {
        Self::new(GROUP_EPS)
    }
}

#[derive(Clone, Copy, Debug)]
struct Rect {
    x: i64,
    y: i64,
    w: i64,
    h: i64,
}
