//! Core image helpers shared by the equalization stages.
//!
//! Images follow the crate-wide `(height, width, channels)` layout. The
//! equalization pipeline only accepts grayscale `(height, width, 1)` views;
//! these helpers validate that shape and expose the single channel as a
//! 2D plane.

use ndarray::{ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};

use crate::error::{EqualizeError, Result};

/// Return `(height, width)` of a grayscale image, rejecting other channel counts.
///
/// # Arguments
/// * `dim` - `(height, width, channels)` of the image
/// * `role` - "input" or "output", used in the error message
pub fn gray_dims(dim: (usize, usize, usize), role: &'static str) -> Result<(usize, usize)> {
    let (height, width, channels) = dim;
    if channels != 1 {
        return Err(EqualizeError::NotSingleChannel { role, channels });
    }
    Ok((height, width))
}

/// Reject widths that are not a multiple of `stride`.
pub fn check_width_alignment(width: usize, stride: usize) -> Result<()> {
    if width % stride != 0 {
        return Err(EqualizeError::UnalignedWidth { width, stride });
    }
    Ok(())
}

/// Reject an output whose dimensions differ from the input.
pub fn check_same_shape(
    input: (usize, usize, usize),
    output: (usize, usize, usize),
) -> Result<()> {
    if input != output {
        return Err(EqualizeError::ShapeMismatch { input, output });
    }
    Ok(())
}

/// View the single channel of a grayscale image as a `(height, width)` plane.
#[inline]
pub fn gray_plane<'a>(image: ArrayView3<'a, u8>) -> ArrayView2<'a, u8> {
    image.index_axis_move(Axis(2), 0)
}

/// Mutable counterpart of [`gray_plane`].
#[inline]
pub fn gray_plane_mut<'a>(image: ArrayViewMut3<'a, u8>) -> ArrayViewMut2<'a, u8> {
    image.index_axis_move(Axis(2), 0)
}
