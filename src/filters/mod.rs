//! Filter modules for edge detection.
//!
//! ## Supported Formats
//!
//! | Input | Shape | Type | Description |
//! |-------|-------|------|-------------|
//! | Grayscale8 | (H, W, 1) | u8 | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha (ignored), 0-255 |
//!
//! Intermediate planes are (H, W). Edge maps are (H, W) u8 with values
//! 0 or 255.
//!
//! ## Stages
//!
//! - **grayscale**: luminance plane from 1, 3 or 4 channels
//! - **blur**: separable Gaussian smoothing
//! - **edge**: Sobel gradients, non-maximum suppression, hysteresis
//!
//! Per-pixel passes run in parallel through ndarray's rayon integration.

pub mod core;
pub mod grayscale;
pub mod blur;
pub mod edge;
