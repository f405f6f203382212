use crate::error::{KdResult, KdTreeError};

/// Generic axis-aligned bounding box for N-dimensional space.
///
/// The box is closed on both ends: a point on the boundary is inside.
/// Every constructor except [`BoundingBox::new`] keeps `min[d] <= max[d]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// Creates the box spanned by two arbitrary opposite corners.
    pub fn from_corners(a: [f64; D], b: [f64; D]) -> Self {
        let mut min = a;
        let mut max = b;
        for i in 0..D {
            if min[i] > max[i] {
                std::mem::swap(&mut min[i], &mut max[i]);
            }
        }
        Self { min, max }
    }

    /// Creates the degenerate box holding exactly one point.
    pub fn from_point(point: [f64; D]) -> Self {
        Self { min: point, max: point }
    }

    /// Checks that every bound is finite and `min <= max` on every axis.
    pub fn validate(&self) -> KdResult<()> {
        for axis in 0..D {
            let (min, max) = (self.min[axis], self.max[axis]);
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(KdTreeError::InvalidBounds { axis, min, max });
            }
        }
        Ok(())
    }

    /// Euclidean distance from `point` to the nearest point of the box.
    ///
    /// Zero when the point lies inside or on the boundary.
    pub fn distance(&self, point: &[f64; D]) -> f64 {
        self.distance_sq(point).sqrt()
    }

    /// Squared version of [`BoundingBox::distance`].
    pub fn distance_sq(&self, point: &[f64; D]) -> f64 {
        let mut d2 = 0.0;
        for i in 0..D {
            let v = point[i];
            if v < self.min[i] {
                d2 += (self.min[i] - v).powi(2);
            } else if v > self.max[i] {
                d2 += (v - self.max[i]).powi(2);
            }
        }
        d2
    }

    /// Closed containment test, equivalent to `distance(point) == 0`.
    pub fn contains(&self, point: &[f64; D]) -> bool {
        (0..D).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }

    /// Whether the two closed boxes share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        (0..D).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    pub fn center(&self) -> [f64; D] {
        let mut c = [0.0; D];
        for i in 0..D {
            c[i] = 0.5 * (self.min[i] + self.max[i]);
        }
        c
    }

    /// Splits the box on `axis` at `value` into a lower and an upper half.
    ///
    /// The lower half gets `max[axis] = value`, the upper half gets
    /// `min[axis] = value`; all other bounds are copied.
    pub fn split(&self, axis: usize, value: f64) -> (Self, Self) {
        let mut lower = *self;
        let mut upper = *self;
        lower.max[axis] = value;
        upper.min[axis] = value;
        (lower, upper)
    }
}
