//! # kdbox
//!
//! `kdbox` is a Rust library for orthogonal range queries over points in a
//! fixed-dimension space, designed to be used in Rust as well as compiled to
//! WebAssembly (WASM). It builds a balanced k-d tree in which every node
//! carries the box it is responsible for, so the partition can be drawn as
//! well as searched.
//!
//! ## Features
//!
//! - **Any dimension**: points are `[f64; D]` with `D` a const generic.
//! - **Balanced build**: median selection on a dimension-major coordinate table,
//!   iterative subdivision with an explicit work stack.
//! - **Box geometry**: each node exposes its box, split point and split axis.
//! - **Replace-on-write**: [`PointIndex`] rebuilds the tree on every change, so
//!   queries always run against one complete snapshot.
//! - **WASM-first**: a 2D binding for drawing the partition in the browser.
//!
//! ## Example
//!
//! ```
//! use kdbox::{BoundingBox, KdTree};
//!
//! let bounds = BoundingBox::new([-10.0, -10.0], [10.0, 10.0]);
//! let points = [[1.0, 1.0], [-2.0, 3.0], [5.0, -5.0], [0.0, 0.0], [7.0, 7.0]];
//! let tree = KdTree::build(bounds, &points).unwrap();
//!
//! let found = tree.query(&BoundingBox::new([-3.0, -3.0], [6.0, 6.0]));
//! assert_eq!(found.len(), 3);
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`KdTree`] struct; [`PointIndex`] owns a
//! mutable point set and keeps a tree over it up to date.

mod bounds;
mod config;
mod error;
mod index;
mod kdtree;
mod select;
pub mod wasm;

pub use bounds::BoundingBox;
pub use config::KdTreeConfig;
pub use error::KdResult;
pub use error::KdTreeError;
pub use index::PointIndex;
pub use kdtree::KdTree;
pub use kdtree::NodeRef;
pub use select::CoordinateTable;
pub use select::select_median;
