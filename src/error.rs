//! Error types for the edge pipeline.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::selection::Region;

/// Errors raised by pipeline stages and the editing session.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    #[error("No image loaded")]
    NoImageLoaded,

    #[error("No edges detected")]
    NoEdgesDetected,

    #[error("No edges remaining to trace")]
    NoEdgesRemaining,

    #[error("No image to save")]
    NoImageToSave,

    #[error("Selected region {region} is empty")]
    EmptyRegion { region: Region },

    #[error("Invalid Canny thresholds: low={low}, high={high}")]
    InvalidThresholds { low: f32, high: f32 },

    #[error("Unsupported channel count: {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),

    #[error("Unable to load image from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to save image to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, EdgeError>;
