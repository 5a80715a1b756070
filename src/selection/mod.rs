//! Selection algorithms for edge editing.
//!
//! This module provides:
//! - **Regions**: rectangular crop and erase, plus display-to-image mapping
//! - **Components**: 8-connected labelling and small-component removal
//! - **Contours**: Moore-neighbour boundary tracing for line composition

pub mod components;
pub mod contour;
pub mod region;

pub use components::{label_components, remove_small_components, Component};
pub use contour::{trace_contours, Point};
pub use region::{crop, erase, Bounds, Region, Viewport};
