use crate::error::{KdResult, KdTreeError};

/// Configuration for [`KdTree`](crate::KdTree) construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdTreeConfig {
    /// Axis the root splits on. Deeper levels cycle `(axis + 1) % D`.
    pub start_axis: usize,
    /// Reject points outside the bounding box.
    ///
    /// Non-finite coordinates are rejected regardless of this flag. Turning it
    /// off makes "every point lies inside the bounds" a caller precondition;
    /// the node boxes of points outside the bounds are not well formed.
    pub validate_points: bool,
}

impl Default for KdTreeConfig {
    fn default() -> Self {
        Self {
            start_axis: 0,
            validate_points: true,
        }
    }
}

impl KdTreeConfig {
    pub fn with_start_axis(mut self, axis: usize) -> Self {
        self.start_axis = axis;
        self
    }

    /// Toggles the bounding-box check on input points. See [`KdTreeConfig::validate_points`].
    pub fn with_validation(mut self, validate_points: bool) -> Self {
        self.validate_points = validate_points;
        self
    }

    /// Checks the configuration against the dimension `D`.
    pub fn validate<const D: usize>(&self) -> KdResult<()> {
        if self.start_axis >= D {
            return Err(KdTreeError::InvalidStartAxis { axis: self.start_axis, dims: D });
        }
        Ok(())
    }
}
