//! EdgeStag
//!
//! Turn a photo into line art: load, crop, detect Canny edges, prune them
//! interactively, compose a line and save the result.
//!
//! ## Image Format
//! Images are ndarray arrays in (height, width, channels) layout:
//! - **Grayscale**: (height, width, 1)
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4), alpha is ignored by edge detection
//!
//! Edge maps and line art are (height, width) u8 planes. Edge maps use
//! 255 for edges on 0; line art uses dark ink (0) on white paper (255).
//!
//! ## Pipeline
//! Every stage is a free function over array views ([`filters::edge::canny`],
//! [`selection::crop`], [`selection::erase`],
//! [`selection::remove_small_components`], [`line::create_line`]).
//! [`EdgeSession`] owns the buffers between stages for interactive use.
//!
//! Python bindings are available with the `python` feature and WASM exports
//! with the `wasm` feature.

pub mod config;
pub mod error;
pub mod filters;
pub mod io;
pub mod line;
pub mod logging;
pub mod selection;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{load_config, EdgeConfig};
pub use error::{EdgeError, Result};
pub use filters::edge::{canny, CannyParams};
pub use io::DisplayImage;
pub use line::{LineArt, LineMode, LineParams};
pub use selection::{Region, Viewport};
pub use session::EdgeSession;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use std::path::PathBuf;

    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3, ToPyArray};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::config::EdgeConfig;
    use crate::error::EdgeError;
    use crate::filters::edge::{canny, CannyParams};
    use crate::line::LineMode;
    use crate::selection::remove_small_components;
    use crate::session::EdgeSession;

    fn to_py_err(err: EdgeError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Interactive edge editing session.
    ///
    /// Images are numpy arrays of shape (H, W, C) u8; edge maps and line art
    /// are (H, W) u8.
    #[pyclass(name = "EdgeSession")]
    pub struct PyEdgeSession {
        inner: EdgeSession,
    }

    #[pymethods]
    impl PyEdgeSession {
        #[new]
        #[pyo3(signature = (low_threshold=50.0, high_threshold=150.0, line_mode="trace", thickness=1))]
        fn new(low_threshold: f32, high_threshold: f32, line_mode: &str, thickness: u32) -> PyResult<Self> {
            let mut config = EdgeConfig::default();
            config.canny = config.canny.with_thresholds(low_threshold, high_threshold);
            config.line.mode = line_mode.parse::<LineMode>().map_err(PyValueError::new_err)?;
            config.line.thickness = thickness;
            config
                .validate()
                .map_err(|e| PyValueError::new_err(e.to_string()))?;
            Ok(Self {
                inner: EdgeSession::new(config),
            })
        }

        #[getter]
        fn has_image(&self) -> bool {
            self.inner.has_image()
        }

        #[getter]
        fn has_edges(&self) -> bool {
            self.inner.has_edges()
        }

        /// Load an image file and return it as (H, W, 3).
        fn load_image<'py>(&mut self, py: Python<'py>, path: PathBuf) -> PyResult<Bound<'py, PyArray3<u8>>> {
            let image = self.inner.load_image(path).map_err(to_py_err)?;
            Ok(image.to_pyarray(py))
        }

        /// Replace the session image with an in-memory array.
        fn set_image(&mut self, image: PyReadonlyArray3<'_, u8>) {
            self.inner.set_image(image.as_array().to_owned());
        }

        fn crop_image<'py>(
            &mut self,
            py: Python<'py>,
            x1: i64,
            y1: i64,
            x2: i64,
            y2: i64,
        ) -> PyResult<Bound<'py, PyArray3<u8>>> {
            let image = self.inner.crop_image(x1, y1, x2, y2).map_err(to_py_err)?;
            Ok(image.to_pyarray(py))
        }

        fn find_edges<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<u8>>> {
            let edges = self.inner.find_edges().map_err(to_py_err)?;
            Ok(edges.to_pyarray(py))
        }

        /// Update thresholds; returns the new edge map, or None without an image.
        fn set_thresholds<'py>(
            &mut self,
            py: Python<'py>,
            low: f32,
            high: f32,
        ) -> PyResult<Option<Bound<'py, PyArray2<u8>>>> {
            let edges = self.inner.set_thresholds(low, high).map_err(to_py_err)?;
            Ok(edges.map(|e| e.to_pyarray(py)))
        }

        fn delete_edges_in_region<'py>(
            &mut self,
            py: Python<'py>,
            x1: i64,
            y1: i64,
            x2: i64,
            y2: i64,
        ) -> PyResult<Bound<'py, PyArray2<u8>>> {
            let edges = self
                .inner
                .delete_edges_in_region(x1, y1, x2, y2)
                .map_err(to_py_err)?;
            Ok(edges.to_pyarray(py))
        }

        #[pyo3(signature = (min_size=None))]
        fn remove_small_edges<'py>(
            &mut self,
            py: Python<'py>,
            min_size: Option<usize>,
        ) -> PyResult<Bound<'py, PyArray2<u8>>> {
            let edges = match min_size {
                Some(size) => self.inner.remove_small_edges(size),
                None => self.inner.remove_small_edges_default(),
            }
            .map_err(to_py_err)?;
            Ok(edges.to_pyarray(py))
        }

        fn create_line<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<u8>>> {
            let art = self.inner.create_line().map_err(to_py_err)?;
            Ok(art.image.to_pyarray(py))
        }

        /// Line art, else edges, else the current image, as (H, W, C).
        fn display_image<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray3<u8>>> {
            self.inner
                .display_image()
                .map(|image| image.to_array3().into_pyarray(py))
        }

        fn save_image(&self, path: PathBuf) -> PyResult<()> {
            self.inner.save_image(path, None).map_err(to_py_err)
        }

        fn reset(&mut self) {
            self.inner.reset();
        }
    }

    // ========================================================================
    // Stateless stages
    // ========================================================================

    /// Canny edge map (H, W) of an (H, W, C) u8 image.
    #[pyfunction]
    #[pyo3(signature = (image, low_threshold=50.0, high_threshold=150.0, l2_gradient=false))]
    pub fn canny_edges<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        low_threshold: f32,
        high_threshold: f32,
        l2_gradient: bool,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let params = CannyParams {
            l2_gradient,
            ..CannyParams::default().with_thresholds(low_threshold, high_threshold)
        };
        let edges = canny(image.as_array(), &params).map_err(to_py_err)?;
        Ok(edges.into_pyarray(py))
    }

    /// Drop 8-connected components smaller than `min_size` from an edge map.
    #[pyfunction]
    pub fn remove_small_edges<'py>(
        py: Python<'py>,
        edges: PyReadonlyArray2<'py, u8>,
        min_size: usize,
    ) -> Bound<'py, PyArray2<u8>> {
        remove_small_components(edges.as_array(), min_size).into_pyarray(py)
    }

    #[pymodule]
    pub fn edgestag(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<PyEdgeSession>()?;
        m.add_function(wrap_pyfunction!(canny_edges, m)?)?;
        m.add_function(wrap_pyfunction!(remove_small_edges, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::edgestag;
