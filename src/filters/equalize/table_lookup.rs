//! Pixel remapping through a finished LUT.

use ndarray::{ArrayView3, ArrayViewMut3, Zip};

use super::cumulative::Lut;
use crate::filters::core::{gray_plane, gray_plane_mut};

/// Writes `lut[input]` for every pixel of a row partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableLookupKernel;

impl TableLookupKernel {
    /// Remap one partition.
    ///
    /// # Arguments
    /// * `input` - Row partition of a `(height, width, 1)` image
    /// * `output` - Matching partition of the output image, same shape
    /// * `lut` - Completed lookup table
    pub fn remap(&self, input: ArrayView3<u8>, output: ArrayViewMut3<u8>, lut: &Lut) {
        let src = gray_plane(input);
        let mut dst = gray_plane_mut(output);

        // Fast path for row-major contiguous buffers
        if let (Some(src), Some(dst)) = (src.as_slice(), dst.as_slice_mut()) {
            for (d, &s) in dst.iter_mut().zip(src.iter()) {
                *d = lut.get(s);
            }
            return;
        }

        Zip::from(&mut dst).and(&src).for_each(|d, &s| *d = lut.get(s));
    }
}
