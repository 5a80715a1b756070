//! WebAssembly exports for the stateless edge stages.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images travel
//! as flat RGBA bytes (`width * height * 4`), edge masks as flat single-byte
//! planes (`width * height`, 0 or 255).

use ndarray::{Array2, Array3};
use wasm_bindgen::prelude::*;

use crate::filters::edge::{canny, CannyParams};
use crate::selection::remove_small_components;

// ============================================================================
// Canny
// ============================================================================

/// Canny edge detection on an RGBA image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `low` - Weak-edge threshold
/// * `high` - Strong-edge threshold
///
/// # Returns
/// Flat edge mask (length = width * height)
#[wasm_bindgen]
pub fn canny_edges_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    low: f32,
    high: f32,
) -> Result<Vec<u8>, JsError> {
    let input = Array3::from_shape_vec((height, width, 4), data.to_vec())
        .map_err(|_| JsError::new("Invalid dimensions"))?;

    let params = CannyParams::default().with_thresholds(low, high);
    let edges = canny(input.view(), &params).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(edges.into_raw_vec_and_offset().0)
}

// ============================================================================
// Small-edge removal
// ============================================================================

/// Drop 8-connected edge components smaller than `min_size` pixels.
#[wasm_bindgen]
pub fn remove_small_edges_wasm(
    mask: &[u8],
    width: usize,
    height: usize,
    min_size: usize,
) -> Result<Vec<u8>, JsError> {
    let edges = Array2::from_shape_vec((height, width), mask.to_vec())
        .map_err(|_| JsError::new("Invalid dimensions"))?;

    let result = remove_small_components(edges.view(), min_size);
    Ok(result.into_raw_vec_and_offset().0)
}
