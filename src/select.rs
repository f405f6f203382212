use std::cmp::Ordering;

/// Point coordinates grouped by axis.
///
/// Block `d` holds coordinate `d` of every point in input order, so a
/// selection pass over one axis only touches one contiguous block.
#[derive(Clone, Debug)]
pub struct CoordinateTable<const D: usize> {
    count: usize,
    coords: Vec<f64>,
}

impl<const D: usize> CoordinateTable<D> {
    pub fn new(points: &[[f64; D]]) -> Self {
        let count = points.len();
        let mut coords = Vec::with_capacity(D * count);
        for axis in 0..D {
            coords.extend(points.iter().map(|p| p[axis]));
        }
        Self { count, coords }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn get(&self, axis: usize, index: usize) -> f64 {
        self.coords[axis * self.count + index]
    }

    /// All coordinates of one axis, in input order.
    pub fn axis(&self, axis: usize) -> &[f64] {
        &self.coords[axis * self.count..(axis + 1) * self.count]
    }

    /// Orders two point indices by their coordinate on `axis`, ties by index.
    #[inline]
    pub fn compare(&self, axis: usize, a: usize, b: usize) -> Ordering {
        let block = self.axis(axis);
        block[a].total_cmp(&block[b]).then(a.cmp(&b))
    }
}

/// Reorders `indices` so that position `k` holds the `k`-th smallest point by `axis`.
///
/// Everything left of `k` compares `<=` and everything right of it `>=`;
/// neither side is sorted. Runs in expected linear time.
///
/// # Panics
///
/// Panics if `k >= indices.len()`.
pub fn select_median<const D: usize>(indices: &mut [usize], k: usize, axis: usize, table: &CoordinateTable<D>) {
    let _ = indices.select_nth_unstable_by(k, |&a, &b| table.compare(axis, a, b));
}
