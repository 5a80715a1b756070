//! Canny edge detection.
//!
//! The detector runs the classic five stages over a (height, width, channels)
//! u8 image and produces a binary edge map (0 = background, 255 = edge):
//!
//! 1. Grayscale conversion (BT.601 luminance)
//! 2. Gaussian smoothing (default 5x5, sigma 1.4)
//! 3. 3x3 Sobel gradients with replicated borders
//! 4. Non-maximum suppression along the quantized gradient direction
//! 5. Double-threshold hysteresis with 8-connectivity
//!
//! Thresholds are expressed in Sobel magnitude units, so the familiar
//! `50 / 150` pair behaves as it does in other Canny front-ends.

use std::collections::VecDeque;
use std::time::Instant;

use ndarray::{Array2, ArrayView2, ArrayView3, Zip};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::blur::gaussian_blur_gray;
use super::core::replicate;
use super::grayscale::{to_gray, GrayscaleWeights};
use crate::error::{EdgeError, Result};

/// Edge value written for pixels that survive hysteresis.
pub const EDGE: u8 = 255;

/// tan(22.5°) and tan(67.5°) for direction quantization.
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Parameters for [`canny`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannyParams {
    /// Weak-edge threshold (gradient magnitude units)
    pub low_threshold: f32,
    /// Strong-edge threshold (gradient magnitude units)
    pub high_threshold: f32,
    /// Gaussian pre-blur standard deviation
    pub blur_sigma: f32,
    /// Gaussian pre-blur kernel length (odd)
    pub blur_kernel_size: usize,
    /// Use `sqrt(gx² + gy²)` instead of `|gx| + |gy|`
    pub l2_gradient: bool,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
            blur_sigma: 1.4,
            blur_kernel_size: 5,
            l2_gradient: false,
        }
    }
}

impl CannyParams {
    /// Same parameters with different thresholds.
    pub fn with_thresholds(self, low: f32, high: f32) -> Self {
        Self {
            low_threshold: low,
            high_threshold: high,
            ..self
        }
    }

    /// Validated `(low, high)` pair, swapped into order if needed.
    ///
    /// # Errors
    /// [`EdgeError::InvalidThresholds`] for negative or non-finite values.
    pub fn ordered_thresholds(&self) -> Result<(f32, f32)> {
        let (low, high) = (self.low_threshold, self.high_threshold);
        if !low.is_finite() || !high.is_finite() || low < 0.0 || high < 0.0 {
            return Err(EdgeError::InvalidThresholds { low, high });
        }
        Ok(if low > high { (high, low) } else { (low, high) })
    }
}

// ============================================================================
// Canny
// ============================================================================

/// Run Canny edge detection.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `params` - Thresholds and smoothing
///
/// # Returns
/// Binary edge map (height, width) with values 0 or 255
pub fn canny(input: ArrayView3<u8>, params: &CannyParams) -> Result<Array2<u8>> {
    let (low, high) = params.ordered_thresholds()?;
    let started = Instant::now();

    let gray = to_gray(input, GrayscaleWeights::BT601)?;
    let smooth = gaussian_blur_gray(gray.view(), params.blur_kernel_size, params.blur_sigma);
    let (gx, gy) = sobel_gradients(smooth.view());
    let magnitude = gradient_magnitude(gx.view(), gy.view(), params.l2_gradient);
    let thin = non_max_suppression(magnitude.view(), gx.view(), gy.view());
    let edges = hysteresis(thin.view(), low, high);

    debug!(
        width = edges.ncols(),
        height = edges.nrows(),
        low,
        high,
        edge_pixels = count_edges(edges.view()),
        elapsed_us = started.elapsed().as_micros() as u64,
        "canny complete"
    );

    Ok(edges)
}

/// Number of non-zero pixels in an edge map.
pub fn count_edges(edges: ArrayView2<u8>) -> usize {
    edges.iter().filter(|&&v| v != 0).count()
}

// ============================================================================
// Stages
// ============================================================================

/// 3x3 Sobel gradients with replicated borders.
///
/// # Returns
/// `(gx, gy)` where positive gx points right and positive gy points down
pub fn sobel_gradients(gray: ArrayView2<u8>) -> (Array2<i32>, Array2<i32>) {
    let (height, width) = gray.dim();
    let mut gx = Array2::<i32>::zeros((height, width));
    let mut gy = Array2::<i32>::zeros((height, width));
    if height == 0 || width == 0 {
        return (gx, gy);
    }

    // Sobel kernels
    let kernel_h: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
    let kernel_v: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

    Zip::indexed(&mut gx)
        .and(&mut gy)
        .par_for_each(|(y, x), out_x, out_y| {
            let mut sx = 0i32;
            let mut sy = 0i32;
            for ky in 0..3 {
                let py = replicate(y as isize + ky as isize - 1, height);
                for kx in 0..3 {
                    let px = replicate(x as isize + kx as isize - 1, width);
                    let v = gray[[py, px]] as i32;
                    sx += v * kernel_h[ky][kx];
                    sy += v * kernel_v[ky][kx];
                }
            }
            *out_x = sx;
            *out_y = sy;
        });

    (gx, gy)
}

/// Gradient magnitude, L1 (`|gx| + |gy|`) or L2.
pub fn gradient_magnitude(gx: ArrayView2<i32>, gy: ArrayView2<i32>, l2: bool) -> Array2<f32> {
    let mut magnitude = Array2::<f32>::zeros(gx.dim());
    Zip::from(&mut magnitude)
        .and(&gx)
        .and(&gy)
        .par_for_each(|m, &dx, &dy| {
            *m = if l2 {
                ((dx * dx + dy * dy) as f32).sqrt()
            } else {
                (dx.abs() + dy.abs()) as f32
            };
        });
    magnitude
}

/// Thin ridges to one pixel by keeping only local maxima along the gradient.
///
/// Ties are broken asymmetrically (strictly greater than the first
/// neighbour, at least equal to the second) so flat ridges stay one pixel
/// wide. Out-of-bounds neighbours count as zero.
pub fn non_max_suppression(
    magnitude: ArrayView2<f32>,
    gx: ArrayView2<i32>,
    gy: ArrayView2<i32>,
) -> Array2<f32> {
    let (height, width) = magnitude.dim();
    let at = |y: isize, x: isize| -> f32 {
        if y < 0 || x < 0 || y >= height as isize || x >= width as isize {
            0.0
        } else {
            magnitude[[y as usize, x as usize]]
        }
    };

    let mut output = Array2::<f32>::zeros((height, width));
    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        let m = magnitude[[y, x]];
        if m <= 0.0 {
            return;
        }
        let dx = gx[[y, x]];
        let dy = gy[[y, x]];
        let ax = dx.abs() as f32;
        let ay = dy.abs() as f32;
        let (y, x) = (y as isize, x as isize);

        let (first, second) = if ay <= ax * TAN_22_5 {
            // Horizontal gradient: compare left/right
            (at(y, x - 1), at(y, x + 1))
        } else if ay >= ax * TAN_67_5 {
            // Vertical gradient: compare up/down
            (at(y - 1, x), at(y + 1, x))
        } else if (dx > 0) == (dy > 0) {
            (at(y - 1, x - 1), at(y + 1, x + 1))
        } else {
            (at(y - 1, x + 1), at(y + 1, x - 1))
        };

        if m > first && m >= second {
            *out = m;
        }
    });

    output
}

/// Double-threshold hysteresis.
///
/// Pixels above `high` seed edges; pixels above `low` are kept only when
/// 8-connected (possibly through other weak pixels) to a seed.
pub fn hysteresis(magnitude: ArrayView2<f32>, low: f32, high: f32) -> Array2<u8> {
    let (height, width) = magnitude.dim();
    let mut edges = Array2::<u8>::zeros((height, width));
    let mut queue = VecDeque::new();

    for ((y, x), &m) in magnitude.indexed_iter() {
        if m > high {
            edges[[y, x]] = EDGE;
            queue.push_back((y, x));
        }
    }

    while let Some((y, x)) = queue.pop_front() {
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let ny = y as isize + dy;
                let nx = x as isize + dx;
                if ny < 0 || nx < 0 || ny >= height as isize || nx >= width as isize {
                    continue;
                }
                let (ny, nx) = (ny as usize, nx as usize);
                if edges[[ny, nx]] == 0 && magnitude[[ny, nx]] > low {
                    edges[[ny, nx]] = EDGE;
                    queue.push_back((ny, nx));
                }
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 100x100 white RGB image with a black 40x40 square in the middle.
    fn square_image() -> Array3<u8> {
        let mut img = Array3::<u8>::from_elem((100, 100, 3), 255);
        for y in 30..70 {
            for x in 30..70 {
                for c in 0..3 {
                    img[[y, x, c]] = 0;
                }
            }
        }
        img
    }

    #[test]
    fn test_canny_finds_square_outline() {
        let img = square_image();
        let edges = canny(img.view(), &CannyParams::default()).unwrap();

        assert_eq!(edges.dim(), (100, 100));
        assert!(count_edges(edges.view()) > 0);
        assert!(edges.iter().all(|&v| v == 0 || v == EDGE));

        // Edges hug the square boundary, nothing far away from it
        assert_eq!(edges[[5, 5]], 0);
        assert_eq!(edges[[50, 50]], 0);
        let near_left_side = (27..33).any(|x| edges[[50, x]] == EDGE);
        assert!(near_left_side);
    }

    #[test]
    fn test_canny_is_deterministic() {
        let img = square_image();
        let params = CannyParams::default().with_thresholds(40.0, 120.0);

        let a = canny(img.view(), &params).unwrap();
        let b = canny(img.view(), &params).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_canny_flat_image_has_no_edges() {
        let img = Array3::<u8>::from_elem((20, 20, 3), 90);
        let edges = canny(img.view(), &CannyParams::default()).unwrap();
        assert_eq!(count_edges(edges.view()), 0);
    }

    #[test]
    fn test_canny_swapped_thresholds_match() {
        let img = square_image();
        let ordered = canny(img.view(), &CannyParams::default().with_thresholds(50.0, 150.0)).unwrap();
        let swapped = canny(img.view(), &CannyParams::default().with_thresholds(150.0, 50.0)).unwrap();
        assert_eq!(ordered, swapped);
    }

    #[test]
    fn test_canny_rejects_negative_threshold() {
        let img = square_image();
        let err = canny(img.view(), &CannyParams::default().with_thresholds(-1.0, 10.0)).unwrap_err();
        assert!(matches!(err, EdgeError::InvalidThresholds { .. }));
    }

    #[test]
    fn test_canny_huge_threshold_suppresses_everything() {
        let img = square_image();
        let edges = canny(img.view(), &CannyParams::default().with_thresholds(2100.0, 2200.0)).unwrap();
        assert_eq!(count_edges(edges.view()), 0);
    }

    #[test]
    fn test_sobel_detects_vertical_edge() {
        let mut gray = Array2::<u8>::zeros((5, 5));
        for y in 0..5 {
            for x in 2..5 {
                gray[[y, x]] = 255;
            }
        }

        let (gx, gy) = sobel_gradients(gray.view());

        assert!(gx[[2, 2]] > 0);
        assert_eq!(gy[[2, 2]], 0);
        assert_eq!(gx[[2, 4]], 0);
    }

    #[test]
    fn test_nms_keeps_single_ridge() {
        // Horizontal gradient ridge peaking at column 2
        let magnitude = ndarray::arr2(&[[1.0f32, 3.0, 5.0, 3.0, 1.0]]);
        let gx = Array2::<i32>::from_elem((1, 5), 10);
        let gy = Array2::<i32>::zeros((1, 5));

        let thin = non_max_suppression(magnitude.view(), gx.view(), gy.view());

        assert_eq!(thin[[0, 2]], 5.0);
        assert_eq!(thin[[0, 1]], 0.0);
        assert_eq!(thin[[0, 3]], 0.0);
    }

    #[test]
    fn test_hysteresis_links_weak_to_strong() {
        let magnitude = ndarray::arr2(&[
            [200.0f32, 80.0, 80.0, 0.0, 80.0],
            [0.0, 0.0, 0.0, 0.0, 0.0],
        ]);

        let edges = hysteresis(magnitude.view(), 50.0, 150.0);

        assert_eq!(edges[[0, 0]], EDGE);
        assert_eq!(edges[[0, 1]], EDGE);
        assert_eq!(edges[[0, 2]], EDGE);
        // Isolated weak pixel is dropped
        assert_eq!(edges[[0, 4]], 0);
    }
}
