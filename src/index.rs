use crate::bounds::BoundingBox;
use crate::config::KdTreeConfig;
use crate::error::{KdResult, KdTreeError};
use crate::kdtree::KdTree;
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::trace;

/// Owner of a point set and the [`KdTree`] built over it.
///
/// Every mutation discards the current tree and builds a fresh one from the
/// whole point set. A mutation that fails validation leaves both the points
/// and the tree untouched.
#[derive(Clone, Debug)]
pub struct PointIndex<const D: usize> {
    tree: KdTree<D>,
}

impl<const D: usize> PointIndex<D> {
    /// Creates an empty index over `bounds`.
    ///
    /// # Errors
    ///
    /// Returns an error if `bounds` is malformed.
    pub fn new(bounds: BoundingBox<D>) -> KdResult<Self> {
        Self::with_config(bounds, KdTreeConfig::default())
    }

    /// Creates an empty index with a custom tree configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `bounds` is malformed or `config` does not fit `D`.
    pub fn with_config(bounds: BoundingBox<D>, config: KdTreeConfig) -> KdResult<Self> {
        let tree = KdTree::build_with_config(bounds, &[], config)?;
        Ok(Self { tree })
    }

    pub fn bounds(&self) -> &BoundingBox<D> {
        self.tree.bounds()
    }

    pub fn points(&self) -> &[[f64; D]] {
        self.tree.points()
    }

    pub fn count_points(&self) -> usize {
        self.tree.points().len()
    }

    /// The current tree snapshot.
    pub fn tree(&self) -> &KdTree<D> {
        &self.tree
    }

    /// Replaces the point set and rebuilds.
    ///
    /// # Errors
    ///
    /// Returns an error if a point is rejected by the tree's validation.
    pub fn set_points(&mut self, points: &[[f64; D]]) -> KdResult<()> {
        self.rebuild(points)
    }

    /// Replaces the point set from a flat `[x0, y0, x1, y1, ...]` buffer and rebuilds.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length is not a multiple of `D` or a
    /// point is rejected by the tree's validation.
    pub fn set_points_flat(&mut self, coords: &[f64]) -> KdResult<()> {
        if D == 0 || coords.len() % D != 0 {
            return Err(KdTreeError::MalformedPoints { len: coords.len(), dims: D });
        }
        let points: Vec<[f64; D]> = coords
            .chunks_exact(D)
            .map(|chunk| {
                let mut p = [0.0; D];
                p.copy_from_slice(chunk);
                p
            })
            .collect();
        self.rebuild(&points)
    }

    /// Appends one point and rebuilds the whole tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is rejected by the tree's validation.
    pub fn add_point(&mut self, point: [f64; D]) -> KdResult<()> {
        let mut points = self.tree.points().to_vec();
        points.push(point);
        self.rebuild(&points)
    }

    pub fn clear(&mut self) {
        // An empty point set always passes validation.
        if let Ok(tree) = KdTree::build_with_config(*self.tree.bounds(), &[], *self.tree.config()) {
            self.tree = tree;
        }
    }

    /// Replaces the point set with `count` points drawn uniformly from the bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the samples are rejected by the tree's validation;
    /// the previous point set is kept in that case.
    pub fn random_points(&mut self, count: usize) -> KdResult<()> {
        let mut rng = StdRng::seed_from_u64(get_seed());
        let bounds = *self.tree.bounds();
        let points: Vec<[f64; D]> = (0..count)
            .map(|_| {
                let mut p = [0.0; D];
                for i in 0..D {
                    p[i] = lerp(bounds.min[i], bounds.max[i], rng.r#gen::<f64>());
                }
                p
            })
            .collect();
        self.rebuild(&points)
    }

    pub fn query(&self, range: &BoundingBox<D>) -> Vec<[f64; D]> {
        self.tree.query(range)
    }

    pub fn query_indices(&self, range: &BoundingBox<D>) -> Vec<usize> {
        self.tree.query_indices(range)
    }

    fn rebuild(&mut self, points: &[[f64; D]]) -> KdResult<()> {
        let tree = KdTree::build_with_config(*self.tree.bounds(), points, *self.tree.config())?;
        trace!(points = points.len(), "rebuilt point index");
        self.tree = tree;
        Ok(())
    }
}

/// Interpolates between `min` and `max` without forming `max - min`, which
/// overflows for bounds near `f64::MAX`.
fn lerp(min: f64, max: f64, t: f64) -> f64 {
    (min * (1.0 - t) + max * t).clamp(min, max)
}

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789 // Fixed seed for tests
    }
}
