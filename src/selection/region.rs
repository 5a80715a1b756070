//! Rectangular region selections: crop, erase, and display mapping.
//!
//! A [`Region`] holds the two corners of a drag gesture in any order. It is
//! normalized and clamped against the target image before use, giving
//! half-open [`Bounds`] `[x0, x1) x [y0, y1)`.

use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array2, Array3, ArrayView3};

use crate::error::{EdgeError, Result};

/// Two corners of a rectangular selection, in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// Clamped, normalized half-open pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Bounds {
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl Region {
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Corners reordered so `(x1, y1)` is top-left.
    pub fn normalized(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    /// Normalize and clamp to an image of `width` x `height`.
    pub fn clamp_to(self, width: usize, height: usize) -> Bounds {
        let r = self.normalized();
        let cx = |v: i64| v.clamp(0, width as i64) as usize;
        let cy = |v: i64| v.clamp(0, height as i64) as usize;
        Bounds {
            x0: cx(r.x1),
            y0: cy(r.y1),
            x1: cx(r.x2),
            y1: cy(r.y2),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

impl FromStr for Region {
    type Err = String;

    /// Parse `X1,Y1,X2,Y2`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("expected X1,Y1,X2,Y2, got '{s}'"));
        }
        let mut v = [0i64; 4];
        for (slot, part) in v.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid coordinate '{part}' in '{s}'"))?;
        }
        Ok(Region::new(v[0], v[1], v[2], v[3]))
    }
}

// ============================================================================
// Crop / Erase
// ============================================================================

/// Copy out the sub-image covered by `region`.
///
/// # Errors
/// [`EdgeError::EmptyRegion`] when the clamped region has no area.
pub fn crop(input: ArrayView3<u8>, region: Region) -> Result<Array3<u8>> {
    let (height, width, _) = input.dim();
    let b = region.clamp_to(width, height);
    if b.is_empty() {
        return Err(EdgeError::EmptyRegion { region });
    }
    Ok(input.slice(s![b.y0..b.y1, b.x0..b.x1, ..]).to_owned())
}

/// Zero every edge pixel inside `region`.
///
/// # Returns
/// Number of edge pixels that were cleared
pub fn erase(edges: &mut Array2<u8>, region: Region) -> usize {
    let (height, width) = edges.dim();
    let b = region.clamp_to(width, height);
    if b.is_empty() {
        return 0;
    }

    let mut cleared = 0;
    edges
        .slice_mut(s![b.y0..b.y1, b.x0..b.x1])
        .map_inplace(|v| {
            if *v != 0 {
                cleared += 1;
                *v = 0;
            }
        });
    cleared
}

// ============================================================================
// Viewport
// ============================================================================

/// Display canvas an image is fitted into (aspect preserved, centred).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Map a drag from canvas coordinates to an image-space region.
    ///
    /// Returns `None` when either the canvas or the image has no area.
    pub fn to_image_region(
        &self,
        start: (i64, i64),
        end: (i64, i64),
        image_width: usize,
        image_height: usize,
    ) -> Option<Region> {
        if self.width == 0 || self.height == 0 || image_width == 0 || image_height == 0 {
            return None;
        }

        let (cw, ch) = (self.width as f64, self.height as f64);
        let (iw, ih) = (image_width as f64, image_height as f64);
        let scale = (cw / iw).min(ch / ih);
        let scaled_w = (iw * scale) as i64;
        let scaled_h = (ih * scale) as i64;
        let offset_x = (self.width as i64 - scaled_w).div_euclid(2);
        let offset_y = (self.height as i64 - scaled_h).div_euclid(2);

        let map = |v: i64, offset: i64, max: usize| -> i64 {
            let img = ((v - offset) as f64 / scale) as i64;
            img.clamp(0, max as i64)
        };

        Some(Region::new(
            map(start.0, offset_x, image_width),
            map(start.1, offset_y, image_height),
            map(end.0, offset_x, image_width),
            map(end.1, offset_y, image_height),
        ))
    }
}

impl FromStr for Viewport {
    type Err = String;

    /// Parse `W,H`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(',')
            .ok_or_else(|| format!("expected W,H, got '{s}'"))?;
        let w = w.trim().parse().map_err(|_| format!("invalid width '{w}'"))?;
        let h = h.trim().parse().map_err(|_| format!("invalid height '{h}'"))?;
        Ok(Viewport::new(w, h))
    }
}
