//! Grayscale conversion.
//!
//! Collapses a (height, width, channels) image into a single luminance plane.
//! Single-channel input passes through; alpha is ignored.
//!
//! Weights are BT.601 (0.299 R + 0.587 G + 0.114 B), the weighting most
//! Canny front-ends use.

use ndarray::{Array2, ArrayView3, Zip};

use crate::error::{EdgeError, Result};

/// RGB channel weights for luminance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayscaleWeights {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl GrayscaleWeights {
    pub const BT601: Self = Self { r: 0.299, g: 0.587, b: 0.114 };
}

impl Default for GrayscaleWeights {
    fn default() -> Self {
        Self::BT601
    }
}

/// Convert an image with 1, 3 or 4 channels to a single u8 luminance plane.
///
/// # Errors
/// [`EdgeError::UnsupportedChannels`] for any other channel count.
pub fn to_gray(input: ArrayView3<u8>, weights: GrayscaleWeights) -> Result<Array2<u8>> {
    let (height, width, channels) = input.dim();
    if !matches!(channels, 1 | 3 | 4) {
        return Err(EdgeError::UnsupportedChannels(channels));
    }

    let mut output = Array2::<u8>::zeros((height, width));
    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        *out = if channels == 1 {
            input[[y, x, 0]]
        } else {
            let r = input[[y, x, 0]] as f32;
            let g = input[[y, x, 1]] as f32;
            let b = input[[y, x, 2]] as f32;
            (weights.r * r + weights.g * g + weights.b * b)
                .round()
                .clamp(0.0, 255.0) as u8
        };
    });

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_gray_passthrough_single_channel() {
        let mut img = Array3::<u8>::zeros((2, 2, 1));
        img[[1, 0, 0]] = 77;

        let gray = to_gray(img.view(), GrayscaleWeights::default()).unwrap();

        assert_eq!(gray.dim(), (2, 2));
        assert_eq!(gray[[1, 0]], 77);
        assert_eq!(gray[[0, 0]], 0);
    }

    #[test]
    fn test_gray_bt601_pure_colors() {
        let mut img = Array3::<u8>::zeros((1, 3, 3));
        img[[0, 0, 0]] = 255; // red
        img[[0, 1, 1]] = 255; // green
        img[[0, 2, 2]] = 255; // blue

        let gray = to_gray(img.view(), GrayscaleWeights::BT601).unwrap();

        assert_eq!(gray[[0, 0]], 76);
        assert_eq!(gray[[0, 1]], 150);
        assert_eq!(gray[[0, 2]], 29);
    }

    #[test]
    fn test_gray_ignores_alpha() {
        let mut img = Array3::<u8>::zeros((1, 1, 4));
        img[[0, 0, 0]] = 200;
        img[[0, 0, 1]] = 200;
        img[[0, 0, 2]] = 200;
        img[[0, 0, 3]] = 0;

        let gray = to_gray(img.view(), GrayscaleWeights::BT601).unwrap();

        assert_eq!(gray[[0, 0]], 200);
    }

    #[test]
    fn test_gray_rejects_two_channels() {
        let img = Array3::<u8>::zeros((2, 2, 2));
        let err = to_gray(img.view(), GrayscaleWeights::default()).unwrap_err();
        assert!(matches!(err, EdgeError::UnsupportedChannels(2)));
    }
}
