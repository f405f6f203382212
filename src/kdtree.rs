//! Balanced k-d tree of nested boxes.
//!
//! Every node owns one input point and the box it is responsible for. An
//! internal node splits its box on its own axis at its point's coordinate:
//! the left child gets the lower half, the right child the upper half. The
//! nodes live in a flat arena in pre-order, the root is slot 0.

use crate::bounds::BoundingBox;
use crate::config::KdTreeConfig;
use crate::error::{KdResult, KdTreeError};
use crate::select::{CoordinateTable, select_median};
use rayon::prelude::*;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq)]
struct BoxNode<const D: usize> {
    bounds: BoundingBox<D>,
    point: [f64; D],
    // Position of `point` in the input sequence.
    index: usize,
    axis: usize,
    depth: u32,
    parent: Option<u32>,
    left: Option<u32>,
    right: Option<u32>,
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Left,
    Right,
}

/// Pending subdivision of the index range `[start, end)` into the box `bounds`.
#[derive(Clone, Copy, Debug)]
struct SubdivisionTask<const D: usize> {
    bounds: BoundingBox<D>,
    axis: usize,
    start: usize,
    end: usize,
    depth: u32,
    parent: Option<(u32, Side)>,
}

/// An immutable k-d tree built from a snapshot of points.
///
/// The tree is never updated in place. When the point set changes, build a
/// new one (see [`PointIndex`](crate::PointIndex) for an owner that does this).
#[derive(Clone, Debug, PartialEq)]
pub struct KdTree<const D: usize> {
    bounds: BoundingBox<D>,
    config: KdTreeConfig,
    points: Vec<[f64; D]>,
    nodes: Vec<BoxNode<D>>,
    height: usize,
}

impl<const D: usize> KdTree<D> {
    /// Builds a tree over `points` inside `bounds` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounding box is malformed or a point is
    /// non-finite or outside the box.
    pub fn build(bounds: BoundingBox<D>, points: &[[f64; D]]) -> KdResult<Self> {
        Self::build_with_config(bounds, points, KdTreeConfig::default())
    }

    /// Builds a tree over `points` inside `bounds`.
    ///
    /// Subdivision uses an explicit work stack, so arbitrarily large inputs
    /// never recurse. Ties on the split axis are broken by input position,
    /// which makes the shape reproducible for the same input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not fit `D`, if the bounding
    /// box is malformed, if there are more than `u32::MAX` points, if a point
    /// is non-finite or, when `config.validate_points` is set, if a point lies
    /// outside the box.
    pub fn build_with_config(bounds: BoundingBox<D>, points: &[[f64; D]], config: KdTreeConfig) -> KdResult<Self> {
        config.validate::<D>()?;
        bounds.validate()?;
        check_capacity(points.len())?;
        validate_points(&bounds, points, config.validate_points)?;

        let mut tree = KdTree {
            bounds,
            config,
            points: points.to_vec(),
            nodes: Vec::new(),
            height: 0,
        };

        if points.is_empty() {
            debug!(points = 0, "built empty kd-tree");
            return Ok(tree);
        }

        let count = points.len();
        let table = CoordinateTable::new(points);
        let mut indices: Vec<usize> = (0..count).collect();
        tree.nodes.reserve(count);

        let mut stack = vec![SubdivisionTask {
            bounds,
            axis: config.start_axis,
            start: 0,
            end: count,
            depth: 0,
            parent: None,
        }];

        while let Some(task) = stack.pop() {
            let len = task.end - task.start;
            let half = (len - 1) / 2;
            select_median(&mut indices[task.start..task.end], half, task.axis, &table);

            let index = indices[task.start + half];
            let value = table.get(task.axis, index);
            // `check_capacity` keeps every slot within `u32`.
            let id = tree.nodes.len() as u32;
            tree.nodes.push(BoxNode {
                bounds: task.bounds,
                point: points[index],
                index,
                axis: task.axis,
                depth: task.depth,
                parent: task.parent.map(|(p, _)| p),
                left: None,
                right: None,
            });
            tree.height = tree.height.max(task.depth as usize + 1);

            match task.parent {
                Some((p, Side::Left)) => tree.nodes[p as usize].left = Some(id),
                Some((p, Side::Right)) => tree.nodes[p as usize].right = Some(id),
                None => {}
            }

            let (lower, upper) = task.bounds.split(task.axis, value);
            let axis = (task.axis + 1) % D;

            // Right is pushed first so the left subtree is laid out right after its parent.
            if len - half > 1 {
                stack.push(SubdivisionTask {
                    bounds: upper,
                    axis,
                    start: task.start + half + 1,
                    end: task.end,
                    depth: task.depth + 1,
                    parent: Some((id, Side::Right)),
                });
            }
            if half > 0 {
                stack.push(SubdivisionTask {
                    bounds: lower,
                    axis,
                    start: task.start,
                    end: task.start + half,
                    depth: task.depth + 1,
                    parent: Some((id, Side::Left)),
                });
            }
        }

        debug!(
            points = count,
            nodes = tree.nodes.len(),
            height = tree.height,
            start_axis = config.start_axis,
            "built kd-tree"
        );
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of levels; zero for an empty tree, one for a single leaf.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> &BoundingBox<D> {
        &self.bounds
    }

    pub fn config(&self) -> &KdTreeConfig {
        &self.config
    }

    /// The point snapshot the tree was built from, in input order.
    pub fn points(&self) -> &[[f64; D]] {
        &self.points
    }

    pub fn root(&self) -> Option<NodeRef<'_, D>> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeRef { tree: self, id: 0 })
        }
    }

    /// Iterates over all nodes in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_, D>> + '_ {
        (0..self.nodes.len() as u32).map(move |id| NodeRef { tree: self, id })
    }

    /// Collects every stored point inside the closed box `range`.
    pub fn query(&self, range: &BoundingBox<D>) -> Vec<[f64; D]> {
        let mut results = Vec::new();
        self.query_with(range, |_, point| results.push(*point));
        results
    }

    /// Like [`KdTree::query`], but returns input positions instead of points.
    pub fn query_indices(&self, range: &BoundingBox<D>) -> Vec<usize> {
        let mut results = Vec::new();
        self.query_with(range, |index, _| results.push(index));
        results
    }

    pub fn count(&self, range: &BoundingBox<D>) -> usize {
        let mut count = 0;
        self.query_with(range, |_, _| count += 1);
        count
    }

    /// Calls `visitor` with the input position and coordinates of every point inside `range`.
    ///
    /// The order of the calls is unspecified.
    pub fn query_with<F>(&self, range: &BoundingBox<D>, mut visitor: F)
    where
        F: FnMut(usize, &[f64; D]),
    {
        let visited = self.walk(range, &mut visitor);
        trace!(visited, nodes = self.nodes.len(), "range query");
    }

    /// Number of nodes a query for `range` inspects.
    #[cfg(test)]
    fn count_visited(&self, range: &BoundingBox<D>) -> usize {
        self.walk(range, &mut |_: usize, _: &[f64; D]| {})
    }

    fn walk<F>(&self, range: &BoundingBox<D>, visitor: &mut F) -> usize
    where
        F: FnMut(usize, &[f64; D]),
    {
        let mut visited = 0;
        if !self.nodes.is_empty() {
            self.query_recursive(0, range, visitor, &mut visited);
        }
        visited
    }

    /// Runs independent range queries against this snapshot in parallel.
    pub fn query_many(&self, ranges: &[BoundingBox<D>]) -> Vec<Vec<[f64; D]>> {
        ranges.par_iter().map(|range| self.query(range)).collect()
    }

    fn query_recursive<F>(&self, id: u32, range: &BoundingBox<D>, visitor: &mut F, visited: &mut usize)
    where
        F: FnMut(usize, &[f64; D]),
    {
        let node = &self.nodes[id as usize];
        *visited += 1;

        if range.contains(&node.point) {
            visitor(node.index, &node.point);
        }

        // Points equal to the split value may sit on either side, hence the
        // non-strict comparisons.
        let value = node.point[node.axis];
        if let Some(left) = node.left {
            if range.min[node.axis] <= value {
                self.query_recursive(left, range, visitor, visited);
            }
        }
        if let Some(right) = node.right {
            if range.max[node.axis] >= value {
                self.query_recursive(right, range, visitor, visited);
            }
        }
    }
}

/// Largest point count whose node slots fit the `u32` links.
const MAX_POINTS: usize = u32::MAX as usize;

fn check_capacity(count: usize) -> KdResult<()> {
    if count > MAX_POINTS {
        return Err(KdTreeError::TooManyPoints { count, max: MAX_POINTS });
    }
    Ok(())
}

// Non-finite coordinates are always rejected: a NaN split value fails both
// pruning comparisons and would hide both subtrees.
fn validate_points<const D: usize>(bounds: &BoundingBox<D>, points: &[[f64; D]], check_bounds: bool) -> KdResult<()> {
    for (index, point) in points.iter().enumerate() {
        if let Some(axis) = point.iter().position(|v| !v.is_finite()) {
            return Err(KdTreeError::NonFiniteCoordinate { index, axis });
        }
        if check_bounds && !bounds.contains(point) {
            return Err(KdTreeError::PointOutOfBounds { index });
        }
    }
    Ok(())
}

/// Read-only handle to a node of a [`KdTree`].
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'a, const D: usize> {
    tree: &'a KdTree<D>,
    id: u32,
}

impl<'a, const D: usize> NodeRef<'a, D> {
    fn node(&self) -> &'a BoxNode<D> {
        &self.tree.nodes[self.id as usize]
    }

    /// Arena slot of this node; the root is 0 and slots follow pre-order.
    pub fn id(&self) -> usize {
        self.id as usize
    }

    /// The region this node is responsible for.
    pub fn bounds(&self) -> &'a BoundingBox<D> {
        &self.node().bounds
    }

    /// The point stored at this node, which is also its splitting point.
    pub fn point(&self) -> &'a [f64; D] {
        &self.node().point
    }

    /// Position of the stored point in the input sequence.
    pub fn index(&self) -> usize {
        self.node().index
    }

    pub fn axis(&self) -> usize {
        self.node().axis
    }

    pub fn depth(&self) -> usize {
        self.node().depth as usize
    }

    pub fn is_leaf(&self) -> bool {
        let node = self.node();
        node.left.is_none() && node.right.is_none()
    }

    pub fn left(&self) -> Option<Self> {
        self.node().left.map(|id| NodeRef { tree: self.tree, id })
    }

    pub fn right(&self) -> Option<Self> {
        self.node().right.map(|id| NodeRef { tree: self.tree, id })
    }

    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|id| NodeRef { tree: self.tree, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> KdTree<2> {
        let bounds = BoundingBox::new([-10.0, -10.0], [10.0, 10.0]);
        let points = [[1.0, 1.0], [-2.0, 3.0], [5.0, -5.0], [0.0, 0.0], [7.0, 7.0]];
        KdTree::build(bounds, &points).unwrap()
    }

    fn sorted(mut points: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
        points.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
        points
    }

    #[test]
    fn test_query_scenario() {
        let tree = scenario();
        let found = tree.query(&BoundingBox::new([-3.0, -3.0], [6.0, 6.0]));
        assert_eq!(sorted(found), vec![[-2.0, 3.0], [0.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn test_root_is_median_on_start_axis() {
        let tree = scenario();
        let root = tree.root().unwrap();
        // x-coordinates are -2, 0, 1, 5, 7; rank 2 is 1.
        assert_eq!(root.point(), &[1.0, 1.0]);
        assert_eq!(root.axis(), 0);
        assert_eq!(root.left().unwrap().axis(), 1);
        assert_eq!(root.bounds(), tree.bounds());
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_empty_tree() {
        let bounds = BoundingBox::new([0.0, 0.0], [1.0, 1.0]);
        let tree = KdTree::build(bounds, &[]).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.root().is_none());
        assert!(tree.query(&bounds).is_empty());
        assert_eq!(tree.count(&bounds), 0);
    }

    #[test]
    fn test_single_point() {
        let tree = KdTree::build(BoundingBox::new([0.0, 0.0], [4.0, 4.0]), &[[2.0, 2.0]]).unwrap();
        assert_eq!(tree.len(), 1);
        let root = tree.root().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.point(), &[2.0, 2.0]);
        assert_eq!(tree.query(&BoundingBox::new([2.0, 2.0], [2.0, 2.0])), vec![[2.0, 2.0]]);
        assert!(tree.query(&BoundingBox::new([3.0, 3.0], [4.0, 4.0])).is_empty());
    }

    #[test]
    fn test_arena_is_preorder_with_parent_links() {
        let tree = scenario();
        for node in tree.nodes() {
            for child in [node.left(), node.right()].into_iter().flatten() {
                assert!(child.id() > node.id());
                assert_eq!(child.parent().unwrap().id(), node.id());
                assert_eq!(child.depth(), node.depth() + 1);
            }
        }
        assert_eq!(tree.root().unwrap().left().unwrap().id(), 1);
    }

    #[test]
    fn test_duplicates_on_split_axis() {
        let bounds = BoundingBox::new([0.0, 0.0], [10.0, 10.0]);
        let points = [[1.0, 0.0], [1.0, 5.0], [1.0, 9.0], [1.0, 5.0]];
        let tree = KdTree::build(bounds, &points).unwrap();
        let range = BoundingBox::new([1.0, 0.0], [1.0, 9.0]);
        assert_eq!(tree.count(&range), 4);
        let mut idx = tree.query_indices(&BoundingBox::new([1.0, 5.0], [1.0, 5.0]));
        idx.sort();
        assert_eq!(idx, vec![1, 3]);
    }

    #[test]
    fn test_start_axis_is_recorded() {
        let bounds = BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let points: Vec<[f64; 3]> = (0..7).map(|i| [i as f64 / 7.0, 0.5, 1.0 - i as f64 / 7.0]).collect();
        let config = KdTreeConfig::default().with_start_axis(2);
        let tree = KdTree::build_with_config(bounds, &points, config).unwrap();
        for node in tree.nodes() {
            assert_eq!(node.axis(), (2 + node.depth()) % 3);
        }
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let bounds = BoundingBox::new([0.0, 0.0], [1.0, 1.0]);
        assert_eq!(
            KdTree::build(bounds, &[[0.5, 0.5], [2.0, 0.5]]).unwrap_err(),
            KdTreeError::PointOutOfBounds { index: 1 }
        );
        assert_eq!(
            KdTree::build(bounds, &[[0.5, f64::NAN]]).unwrap_err(),
            KdTreeError::NonFiniteCoordinate { index: 0, axis: 1 }
        );
        assert!(KdTree::build(BoundingBox::new([1.0, 0.0], [0.0, 1.0]), &[]).is_err());

        let relaxed = KdTreeConfig::default().with_validation(false);
        assert!(KdTree::build_with_config(bounds, &[[2.0, 0.5]], relaxed).is_ok());
    }

    #[test]
    fn test_non_finite_rejected_without_bounds_check() {
        let bounds = BoundingBox::new([0.0, 0.0], [1.0, 1.0]);
        let relaxed = KdTreeConfig::default().with_validation(false);
        let points = [[0.2, 0.2], [f64::NAN, 0.5], [0.8, 0.8]];
        assert_eq!(
            KdTree::build_with_config(bounds, &points, relaxed).unwrap_err(),
            KdTreeError::NonFiniteCoordinate { index: 1, axis: 0 }
        );
        assert!(KdTree::build_with_config(bounds, &[[0.5, f64::INFINITY]], relaxed).is_err());
    }

    #[test]
    fn test_capacity_limit() {
        assert!(check_capacity(0).is_ok());
        assert!(check_capacity(MAX_POINTS).is_ok());
        #[cfg(target_pointer_width = "64")]
        assert_eq!(
            check_capacity(MAX_POINTS + 1),
            Err(KdTreeError::TooManyPoints { count: MAX_POINTS + 1, max: MAX_POINTS })
        );
    }

    #[test]
    fn test_query_prunes_subtrees() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(11);
        let bounds = BoundingBox::new([0.0, 0.0], [100.0, 100.0]);
        let points: Vec<[f64; 2]> = (0..20_000)
            .map(|_| [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)])
            .collect();
        let tree = KdTree::build(bounds, &points).unwrap();

        let range = BoundingBox::new([40.0, 40.0], [40.5, 40.5]);
        let visited = tree.count_visited(&range);
        assert!(visited > 0);
        assert!(visited * 50 < tree.len(), "Visited {} of {} nodes", visited, tree.len());

        // A query covering everything has nothing to prune.
        assert_eq!(tree.count_visited(&bounds), tree.len());
        // A query below every point only follows the leftmost path.
        let below = tree.count_visited(&BoundingBox::new([-5.0, -5.0], [-1.0, -1.0]));
        assert!(below <= tree.height(), "Visited {} nodes for an empty corner", below);
    }

    #[test]
    fn test_query_many_matches_query() {
        let tree = scenario();
        let ranges = [
            BoundingBox::new([-3.0, -3.0], [6.0, 6.0]),
            BoundingBox::new([-10.0, -10.0], [10.0, 10.0]),
            BoundingBox::new([8.0, 8.0], [9.0, 9.0]),
        ];
        let batch = tree.query_many(&ranges);
        assert_eq!(batch.len(), 3);
        for (range, found) in ranges.iter().zip(batch) {
            assert_eq!(sorted(found), sorted(tree.query(range)));
        }
    }
}
