//! Browser bindings.
//!
//! The classes here wrap the generic Rust API for a fixed dimension so that
//! JavaScript can feed points, run queries and read back the partition boxes
//! for drawing.

mod d2;

pub use d2::{BoundingBox2D, KdTree2D};

use js_sys::Array;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

/// Number of `f64` values per node in the flat buffer returned by `boxes()`.
#[wasm_bindgen(typescript_custom_section)]
const TS_CONSTANTS_NODES: &'static str = r#"
export const NODE_STRIDE_2D = 7;
"#;

/// Reads a `[x, y, ...]` JavaScript array into a point.
///
/// Returns `None` unless the value is an array of exactly `D` numbers.
pub fn parse_js_point<const D: usize>(val: &JsValue) -> Option<[f64; D]> {
    let arr = val.dyn_ref::<Array>()?;
    point_from_values(arr.iter().map(|v| v.as_f64()))
}

/// Collects exactly `D` present coordinates into a point.
fn point_from_values<const D: usize>(values: impl IntoIterator<Item = Option<f64>>) -> Option<[f64; D]> {
    let mut point = [0.0; D];
    let mut values = values.into_iter();
    for slot in point.iter_mut() {
        *slot = values.next()??;
    }
    if values.next().is_some() {
        return None;
    }
    Some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_from_values() {
        assert_eq!(point_from_values::<2>([Some(1.0), Some(-2.5)]), Some([1.0, -2.5]));
        assert_eq!(point_from_values::<2>([Some(1.0)]), None);
        assert_eq!(point_from_values::<2>([Some(1.0), None]), None);
        assert_eq!(point_from_values::<2>([Some(1.0), Some(2.0), Some(3.0)]), None);
        assert_eq!(point_from_values::<0>([]), Some([]));
    }
}
