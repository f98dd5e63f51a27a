//! WebAssembly exports for ImageStag equalization.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. WASM has no
//! worker threads here, so every stage runs on the calling thread.

use ndarray::ArrayView3;
use wasm_bindgen::prelude::*;

use crate::filters::equalize::{equalize_histogram_with, EqualizeOptions};
use crate::scheduler::SequentialScheduler;

// ============================================================================
// Histogram Equalization - u8 (8-bit)
// ============================================================================

/// Equalize the histogram of a grayscale u8 image.
///
/// # Arguments
/// * `data` - Flat array of gray bytes (length = width * height)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `border_histogram` - Accept widths that are not a multiple of 16
///
/// # Returns
/// Flat array of equalized gray bytes, or an error if the dimensions are rejected
#[wasm_bindgen]
pub fn equalize_histogram_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    border_histogram: bool,
) -> Result<Vec<u8>, JsError> {
    let input = ArrayView3::from_shape((height, width, 1), data)?;
    let options = EqualizeOptions {
        border_histogram,
        ..EqualizeOptions::default()
    };

    let result = equalize_histogram_with(input, SequentialScheduler, options)?;
    Ok(result.into_raw_vec_and_offset().0)
}
