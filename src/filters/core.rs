//! Core utilities shared by the edge filters.
//!
//! This module provides:
//! - Gaussian kernel generation
//! - Replicated-border index clamping
//! - Separable convolution over single-channel planes

use ndarray::{Array2, ArrayView2, Zip};

/// Generate a normalized 1D Gaussian kernel of a fixed size.
///
/// # Arguments
/// * `size` - Kernel length; even sizes are bumped to the next odd value
/// * `sigma` - Standard deviation. A non-positive sigma is derived from
///   the size as `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
///
/// # Returns
/// Normalized kernel as Vec<f32> (sums to 1.0)
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let size = size.max(1) | 1;
    if size == 1 {
        return vec![1.0];
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (size / 2) as f32;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    // Normalize
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Clamp a signed coordinate into `0..len` (replicated border).
#[inline]
pub fn replicate(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Convolve a plane with a separable kernel (horizontal then vertical pass).
///
/// Borders are replicated. Both passes run row-parallel.
pub fn convolve_separable(plane: ArrayView2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (height, width) = plane.dim();
    if height == 0 || width == 0 {
        return Array2::zeros((height, width));
    }
    let half = (kernel.len() / 2) as isize;

    // Horizontal pass
    let mut temp = Array2::<f32>::zeros((height, width));
    Zip::indexed(&mut temp).par_for_each(|(y, x), out| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sx = replicate(x as isize + ki as isize - half, width);
            sum += plane[[y, sx]] * kv;
        }
        *out = sum;
    });

    // Vertical pass
    let mut result = Array2::<f32>::zeros((height, width));
    Zip::indexed(&mut result).par_for_each(|(y, x), out| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sy = replicate(y as isize + ki as isize - half, height);
            sum += temp[[sy, x]] * kv;
        }
        *out = sum;
    });

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernel_normalized_and_symmetric() {
        let kernel = gaussian_kernel(5, 1.4);
        assert_eq!(kernel.len(), 5);

        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[4]).abs() < 1e-6);
        assert!((kernel[1] - kernel[3]).abs() < 1e-6);
        assert!(kernel[2] > kernel[1]);
    }

    #[test]
    fn test_gaussian_kernel_even_size_bumped() {
        assert_eq!(gaussian_kernel(4, 1.0).len(), 5);
        assert_eq!(gaussian_kernel(0, 1.0), vec![1.0]);
    }

    #[test]
    fn test_gaussian_kernel_derives_sigma() {
        let kernel = gaussian_kernel(3, 0.0);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_replicate_clamps() {
        assert_eq!(replicate(-2, 10), 0);
        assert_eq!(replicate(4, 10), 4);
        assert_eq!(replicate(12, 10), 9);
    }

    #[test]
    fn test_convolve_flat_plane_unchanged() {
        let plane = Array2::<f32>::from_elem((6, 7), 42.0);
        let kernel = gaussian_kernel(5, 1.4);
        let result = convolve_separable(plane.view(), &kernel);
        assert!(result.iter().all(|&v| (v - 42.0).abs() < 1e-3));
    }
}
