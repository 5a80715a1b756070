//! Image file input/output.
//!
//! Decoding and encoding go through the `image` crate. Buffers are exchanged
//! as ndarray arrays in (height, width, channels) layout; single-channel
//! planes (edge maps, line art) are saved as 8-bit grayscale.
//!
//! The output format is chosen from the file extension. PNG, BMP and TIFF
//! round-trip losslessly; JPEG does not.

use std::path::Path;

use image::error::{ParameterError, ParameterErrorKind};
use image::{DynamicImage, GrayImage, ImageError, ImageFormat, RgbImage, RgbaImage};
use ndarray::{Array3, ArrayView2, ArrayView3};
use tracing::{debug, info};

use crate::error::{EdgeError, Result};

/// Borrowed raster to display or save.
#[derive(Debug, Clone, Copy)]
pub enum DisplayImage<'a> {
    /// (height, width, channels) image with 1, 3 or 4 channels
    Color(ArrayView3<'a, u8>),
    /// Single-channel plane, e.g. an edge map or line art
    Gray(ArrayView2<'a, u8>),
}

impl DisplayImage<'_> {
    /// `(height, width)`
    pub fn dim(&self) -> (usize, usize) {
        match self {
            DisplayImage::Color(img) => (img.shape()[0], img.shape()[1]),
            DisplayImage::Gray(img) => img.dim(),
        }
    }

    /// Owned (height, width, channels) copy; gray planes get one channel.
    pub fn to_array3(&self) -> Array3<u8> {
        match self {
            DisplayImage::Color(img) => img.to_owned(),
            DisplayImage::Gray(img) => img.to_owned().insert_axis(ndarray::Axis(2)),
        }
    }
}

/// Load an image file as an RGB (height, width, 3) array.
///
/// # Errors
/// [`EdgeError::Load`] when the file is missing, unreadable, or in an
/// unsupported format.
pub fn load_image(path: impl AsRef<Path>) -> Result<Array3<u8>> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| EdgeError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    let array = Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw())
        .map_err(|_| EdgeError::Load {
            path: path.to_path_buf(),
            source: dimension_mismatch(),
        })?;

    info!(path = %path.display(), width, height, "image loaded");
    Ok(array)
}

/// Save a raster, picking the encoder from the file extension.
///
/// # Errors
/// [`EdgeError::Save`] for unknown extensions and encoder or IO failures,
/// [`EdgeError::UnsupportedChannels`] for channel counts other than 1, 3, 4.
pub fn save_image(path: impl AsRef<Path>, image: DisplayImage<'_>) -> Result<()> {
    let path = path.as_ref();
    let save_err = |source: ImageError| EdgeError::Save {
        path: path.to_path_buf(),
        source,
    };

    let format = ImageFormat::from_path(path).map_err(save_err)?;
    let mut dynamic = to_dynamic(image).ok_or_else(|| save_err(dimension_mismatch()))??;

    // JPEG has no alpha channel
    if format == ImageFormat::Jpeg && dynamic.color().has_alpha() {
        dynamic = DynamicImage::ImageRgb8(dynamic.to_rgb8());
    }

    dynamic.save_with_format(path, format).map_err(save_err)?;

    let (height, width) = image.dim();
    info!(path = %path.display(), ?format, width, height, "image saved");
    Ok(())
}

/// Convert a raster into a `DynamicImage`.
///
/// Outer `None` means the buffer did not match its dimensions.
fn to_dynamic(image: DisplayImage<'_>) -> Option<Result<DynamicImage>> {
    let (height, width) = image.dim();
    let (w, h) = (width as u32, height as u32);

    let dynamic = match image {
        DisplayImage::Gray(plane) => {
            let raw: Vec<u8> = plane.iter().copied().collect();
            DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, raw)?)
        }
        DisplayImage::Color(img) => {
            let channels = img.shape()[2];
            // Logical-order iteration, independent of memory layout
            let raw: Vec<u8> = img.iter().copied().collect();
            match channels {
                1 => DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, raw)?),
                3 => DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, raw)?),
                4 => DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, raw)?),
                other => return Some(Err(EdgeError::UnsupportedChannels(other))),
            }
        }
    };

    debug!(width, height, color = ?dynamic.color(), "encoded raster");
    Some(Ok(dynamic))
}

fn dimension_mismatch() -> ImageError {
    ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_gray_display_dim_and_array3() {
        let plane = Array2::<u8>::from_elem((3, 5), 9);
        let view = DisplayImage::Gray(plane.view());

        assert_eq!(view.dim(), (3, 5));
        let arr = view.to_array3();
        assert_eq!(arr.dim(), (3, 5, 1));
        assert_eq!(arr[[2, 4, 0]], 9);
    }

    #[test]
    fn test_to_dynamic_rejects_two_channels() {
        let img = Array3::<u8>::zeros((2, 2, 2));
        let result = to_dynamic(DisplayImage::Color(img.view()));
        assert!(matches!(result, Some(Err(EdgeError::UnsupportedChannels(2)))));
    }

    #[test]
    fn test_to_dynamic_preserves_pixel_order() {
        let mut img = Array3::<u8>::zeros((2, 3, 3));
        img[[1, 2, 0]] = 200;
        img[[0, 1, 2]] = 100;

        let dynamic = to_dynamic(DisplayImage::Color(img.view())).unwrap().unwrap();
        let rgb = dynamic.to_rgb8();

        assert_eq!(rgb.get_pixel(2, 1)[0], 200);
        assert_eq!(rgb.get_pixel(1, 0)[2], 100);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_image("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, EdgeError::Load { .. }));
        assert!(err.to_string().starts_with("Unable to load image"));
    }
}
