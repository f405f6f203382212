//! Error types for building and maintaining a [`KdTree`](crate::KdTree).

use thiserror::Error;

/// Errors reported when the input to a build violates its preconditions.
///
/// Validation happens before any node is allocated, so a failed build never
/// leaves a partially constructed tree behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KdTreeError {
    /// A bounding box has `min > max` on some axis, or a non-finite bound.
    #[error("invalid bounding box on axis {axis}: min {min} > max {max} or not finite")]
    InvalidBounds { axis: usize, min: f64, max: f64 },

    /// A point has a NaN or infinite coordinate.
    #[error("point {index} has a non-finite coordinate on axis {axis}")]
    NonFiniteCoordinate { index: usize, axis: usize },

    /// A point lies outside the bounding box of the tree.
    #[error("point {index} lies outside the bounding box")]
    PointOutOfBounds { index: usize },

    /// The starting split axis does not exist in this dimension.
    #[error("start axis {axis} is out of range for {dims} dimensions")]
    InvalidStartAxis { axis: usize, dims: usize },

    /// More points than the tree's `u32` node links can address.
    #[error("{count} points exceed the tree capacity of {max}")]
    TooManyPoints { count: usize, max: usize },

    /// A flat coordinate buffer whose length is not a multiple of the dimension.
    #[error("flat point buffer of length {len} is not a multiple of {dims}")]
    MalformedPoints { len: usize, dims: usize },
}

/// Result type alias for tree operations.
pub type KdResult<T> = Result<T, KdTreeError>;
