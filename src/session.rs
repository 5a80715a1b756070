//! Interactive editing session.
//!
//! [`EdgeSession`] owns the buffers of one editing pass and replaces them
//! wholesale as the user moves through the pipeline:
//!
//! ```text
//! load -> crop -> find edges -> delete / prune -> create line -> save
//! ```
//!
//! Derived buffers are invalidated when their source changes: loading or
//! cropping clears the edge map and line art, and any edge change clears
//! the line art.

use std::path::Path;

use ndarray::{Array2, Array3};
use tracing::{info, warn};

use crate::config::EdgeConfig;
use crate::error::{EdgeError, Result};
use crate::filters::edge::{canny, count_edges};
use crate::io::{self, DisplayImage};
use crate::line::{self, LineArt};
use crate::selection::{self, Region};

/// State of one editing pass.
#[derive(Debug, Clone, Default)]
pub struct EdgeSession {
    config: EdgeConfig,
    original: Option<Array3<u8>>,
    current: Option<Array3<u8>>,
    edges: Option<Array2<u8>>,
    line: Option<LineArt>,
}

impl EdgeSession {
    pub fn new(config: EdgeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    pub fn original(&self) -> Option<&Array3<u8>> {
        self.original.as_ref()
    }

    pub fn current(&self) -> Option<&Array3<u8>> {
        self.current.as_ref()
    }

    pub fn edges(&self) -> Option<&Array2<u8>> {
        self.edges.as_ref()
    }

    pub fn line(&self) -> Option<&LineArt> {
        self.line.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_edges(&self) -> bool {
        self.edges.is_some()
    }

    /// Load an image file; it becomes both the original and current image.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<&Array3<u8>> {
        let image = io::load_image(path)?;
        Ok(self.set_image(image))
    }

    /// Start from an in-memory image instead of a file.
    pub fn set_image(&mut self, image: Array3<u8>) -> &Array3<u8> {
        self.original = Some(image.clone());
        self.edges = None;
        self.line = None;
        self.current.insert(image)
    }

    /// Crop the current image to a region given by two corners in any order.
    ///
    /// # Errors
    /// [`EdgeError::NoImageLoaded`], or [`EdgeError::EmptyRegion`] when the
    /// clamped region has no area (the image is left untouched).
    pub fn crop_image(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) -> Result<&Array3<u8>> {
        let current = self.current.as_ref().ok_or(EdgeError::NoImageLoaded)?;
        let region = Region::new(x1, y1, x2, y2);
        let cropped = selection::crop(current.view(), region)?;

        let (height, width, _) = cropped.dim();
        info!(%region, width, height, "image cropped");

        self.edges = None;
        self.line = None;
        Ok(self.current.insert(cropped))
    }

    /// Run Canny on the current image with the configured parameters.
    pub fn find_edges(&mut self) -> Result<&Array2<u8>> {
        let current = self.current.as_ref().ok_or(EdgeError::NoImageLoaded)?;
        let edges = canny(current.view(), &self.config.canny)?;

        info!(
            low = self.config.canny.low_threshold,
            high = self.config.canny.high_threshold,
            edge_pixels = count_edges(edges.view()),
            "edges detected"
        );

        self.line = None;
        Ok(self.edges.insert(edges))
    }

    /// Update thresholds; re-detect immediately when an image is loaded.
    ///
    /// The config is only updated when detection succeeds, so invalid
    /// thresholds leave the previous edge map in place.
    pub fn set_thresholds(&mut self, low: f32, high: f32) -> Result<Option<&Array2<u8>>> {
        let previous = self.config.canny;
        self.config.canny = previous.with_thresholds(low, high);

        if !self.has_image() {
            if let Err(err) = self.config.canny.ordered_thresholds() {
                self.config.canny = previous;
                return Err(err);
            }
            return Ok(None);
        }

        if let Err(err) = self.find_edges() {
            self.config.canny = previous;
            return Err(err);
        }
        Ok(self.edges.as_ref())
    }

    /// Zero every edge pixel inside the region.
    ///
    /// An empty region deletes nothing.
    pub fn delete_edges_in_region(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) -> Result<&Array2<u8>> {
        let edges = self.edges.as_mut().ok_or(EdgeError::NoEdgesDetected)?;
        let region = Region::new(x1, y1, x2, y2);
        let cleared = selection::erase(edges, region);

        if cleared == 0 {
            warn!(%region, "no edges inside region");
        } else {
            info!(%region, cleared, "edges deleted");
        }

        self.line = None;
        Ok(&*edges)
    }

    /// Drop 8-connected edge components smaller than `min_size` pixels.
    pub fn remove_small_edges(&mut self, min_size: usize) -> Result<&Array2<u8>> {
        let edges = self.edges.as_ref().ok_or(EdgeError::NoEdgesDetected)?;
        let before = count_edges(edges.view());
        let filtered = selection::remove_small_components(edges.view(), min_size);

        info!(
            min_size,
            removed = before - count_edges(filtered.view()),
            "small edges removed"
        );

        self.line = None;
        Ok(self.edges.insert(filtered))
    }

    /// [`remove_small_edges`](Self::remove_small_edges) with the configured size.
    pub fn remove_small_edges_default(&mut self) -> Result<&Array2<u8>> {
        let min_size = self.config.edit.min_edge_size;
        self.remove_small_edges(min_size)
    }

    /// Compose line art from the remaining edges.
    pub fn create_line(&mut self) -> Result<&LineArt> {
        let edges = self.edges.as_ref().ok_or(EdgeError::NoEdgesDetected)?;
        let art = line::create_line(edges.view(), &self.config.line)?;

        info!(mode = %self.config.line.mode, paths = art.paths.len(), "line created");
        Ok(self.line.insert(art))
    }

    /// The buffer to show: line art, else edges, else the current image.
    pub fn display_image(&self) -> Option<DisplayImage<'_>> {
        if let Some(line) = &self.line {
            Some(DisplayImage::Gray(line.image.view()))
        } else if let Some(edges) = &self.edges {
            Some(DisplayImage::Gray(edges.view()))
        } else {
            self.current
                .as_ref()
                .map(|current| DisplayImage::Color(current.view()))
        }
    }

    /// Save `image`, or the display image when `None`.
    ///
    /// # Errors
    /// [`EdgeError::NoImageToSave`] when there is nothing to save.
    pub fn save_image<'a>(&'a self, path: impl AsRef<Path>, image: Option<DisplayImage<'a>>) -> Result<()> {
        let image = image
            .or_else(|| self.display_image())
            .ok_or(EdgeError::NoImageToSave)?;
        io::save_image(path, image)
    }

    /// Drop all buffers; the configuration is kept.
    pub fn reset(&mut self) {
        let config = std::mem::take(&mut self.config);
        *self = Self::new(config);
        info!("session reset");
    }
}
