use crate::bounds::BoundingBox;
use crate::index::PointIndex;
use crate::wasm::parse_js_point;
use wasm_bindgen::prelude::*;

// --- Bounding Box ---

#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox2D {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[wasm_bindgen]
impl BoundingBox2D {
    #[wasm_bindgen(constructor)]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox2D {
        BoundingBox2D { min_x, min_y, max_x, max_y }
    }
}

impl From<BoundingBox2D> for BoundingBox<2> {
    fn from(b: BoundingBox2D) -> Self {
        Self { min: [b.min_x, b.min_y], max: [b.max_x, b.max_y] }
    }
}

// --- Tree ---

#[wasm_bindgen(js_name = KdTree2D)]
pub struct KdTree2D {
    inner: PointIndex<2>,
}

#[wasm_bindgen(js_class = KdTree2D)]
impl KdTree2D {
    #[wasm_bindgen(constructor)]
    pub fn new(bounds: BoundingBox2D) -> Result<KdTree2D, JsError> {
        Ok(KdTree2D { inner: PointIndex::new(bounds.into())? })
    }

    /// Replaces all points from a flat `[x0, y0, x1, y1, ...]` array.
    pub fn set_points(&mut self, points: &[f64]) -> Result<(), JsError> {
        Ok(self.inner.set_points_flat(points)?)
    }

    pub fn add_point(&mut self, x: f64, y: f64) -> Result<(), JsError> {
        Ok(self.inner.add_point([x, y])?)
    }

    pub fn random_points(&mut self, count: usize) -> Result<(), JsError> {
        Ok(self.inner.random_points(count)?)
    }

    pub fn clear(&mut self) { self.inner.clear(); }

    #[wasm_bindgen(getter)]
    pub fn count_points(&self) -> usize { self.inner.count_points() }
    #[wasm_bindgen(getter)]
    pub fn count_nodes(&self) -> usize { self.inner.tree().len() }
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> usize { self.inner.tree().height() }
    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<f64> { self.inner.points().iter().flatten().copied().collect() }

    /// Points inside the query box as a flat `[x0, y0, ...]` array.
    pub fn query(&self, range: BoundingBox2D) -> Vec<f64> {
        self.inner.query(&range.into()).into_iter().flatten().collect()
    }

    /// Queries the box spanned by two `[x, y]` corners given in any order.
    pub fn query_corners(&self, a: JsValue, b: JsValue) -> Option<Vec<f64>> {
        let range = BoundingBox::from_corners(parse_js_point(&a)?, parse_js_point(&b)?);
        Some(self.inner.query(&range).into_iter().flatten().collect())
    }

    /// Every node as `[min_x, min_y, max_x, max_y, point_x, point_y, axis]`, in pre-order.
    pub fn boxes(&self) -> Vec<f64> {
        let tree = self.inner.tree();
        let mut out = Vec::with_capacity(tree.len() * 7);
        for node in tree.nodes() {
            let b = node.bounds();
            let p = node.point();
            out.extend_from_slice(&[b.min[0], b.min[1], b.max[0], b.max[1], p[0], p[1], node.axis() as f64]);
        }
        out
    }
}
