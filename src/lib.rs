//! ImageStag Equalize
//!
//! Multi-core histogram equalization for 8-bit grayscale images, with
//! Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Images are `(height, width, 1)` u8 arrays. Width must be a multiple of
//! 16 unless the border histogram stage is enabled through
//! [`EqualizeOptions::border_histogram`].
//!
//! ## Pipeline Architecture
//! [`EqualizeHistogram`] binds an input and an output image once and can then
//! be run repeatedly. Each run accumulates a histogram in parallel, builds the
//! cumulative distribution and lookup table on the calling thread, and remaps
//! the pixels in parallel. Parallel stages go through a [`Scheduler`] passed
//! to the pipeline, so tests can substitute [`SequentialScheduler`].

pub mod error;
pub mod filters;
pub mod scheduler;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{EqualizeError, Result};
pub use filters::equalize::{
    equalize_histogram_u8, equalize_histogram_with, EqualizeHistogram, EqualizeOptions,
    PipelineState,
};
pub use scheduler::{RayonScheduler, Scheduler, SequentialScheduler};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::filters::equalize::{self, EqualizeOptions};
    use crate::scheduler::RayonScheduler;

    // ========================================================================
    // Histogram Equalization
    // ========================================================================

    /// Equalize the histogram of a grayscale u8 image.
    ///
    /// # Arguments
    /// * `image` - Array of shape (height, width, 1)
    /// * `border_histogram` - Accept widths that are not a multiple of 16
    /// * `num_threads` - Worker count; 0 uses the shared rayon pool
    ///
    /// Raises `ValueError` if the image shape is not accepted.
    #[pyfunction]
    #[pyo3(signature = (image, border_histogram=false, num_threads=0))]
    pub fn equalize_histogram<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        border_histogram: bool,
        num_threads: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let options = EqualizeOptions {
            border_histogram,
            ..EqualizeOptions::default()
        };
        let scheduler = if num_threads == 0 {
            RayonScheduler::new()
        } else {
            RayonScheduler::with_threads(num_threads)
                .map_err(|e| PyRuntimeError::new_err(e.to_string()))?
        };

        let result = equalize::equalize_histogram_with(image.as_array(), scheduler, options)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// ImageStag equalization extension module
    #[pymodule]
    pub fn imagestag_equalize(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(equalize_histogram, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::imagestag_equalize;
