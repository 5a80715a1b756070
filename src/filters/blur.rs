//! Gaussian blur for single-channel planes.
//!
//! Uses separable 2-pass convolution with replicated borders.

use ndarray::{Array2, ArrayView2};

use super::core::{convolve_separable, gaussian_kernel};

/// Apply Gaussian blur to a u8 plane.
///
/// # Arguments
/// * `input` - Grayscale plane (height, width)
/// * `kernel_size` - Odd kernel length; 1 disables blurring
/// * `sigma` - Standard deviation of the Gaussian
///
/// # Returns
/// Blurred plane, rounded back to u8
pub fn gaussian_blur_gray(input: ArrayView2<u8>, kernel_size: usize, sigma: f32) -> Array2<u8> {
    if kernel_size <= 1 {
        // No blur, return copy
        return input.to_owned();
    }

    let kernel = gaussian_kernel(kernel_size, sigma);
    let plane = input.mapv(|v| v as f32);
    let result = convolve_separable(plane.view(), &kernel);

    result.mapv(|v| v.round().clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_flat_unchanged() {
        let img = Array2::<u8>::from_elem((8, 8), 128);
        let result = gaussian_blur_gray(img.view(), 5, 1.4);
        assert!(result.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_blur_spreads_point() {
        let mut img = Array2::<u8>::zeros((9, 9));
        img[[4, 4]] = 255;

        let result = gaussian_blur_gray(img.view(), 5, 1.4);

        assert!(result[[4, 4]] < 255);
        assert!(result[[4, 5]] > 0);
        assert!(result[[5, 4]] > 0);
        assert_eq!(result[[0, 0]], 0);
    }

    #[test]
    fn test_blur_size_one_is_copy() {
        let mut img = Array2::<u8>::zeros((3, 3));
        img[[1, 1]] = 9;
        assert_eq!(gaussian_blur_gray(img.view(), 1, 1.4), img);
    }
}
