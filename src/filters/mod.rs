//! Filter modules for image processing.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale8 | (H, W, 1) | u8 | Single luminance channel, 0-255 |
//!
//! Images are `ndarray` views in `(height, width, channels)` order. Views may
//! be strided (e.g. a sub-window of a larger buffer); the kernels take a
//! contiguous fast path when rows are packed.
//!
//! ## Filter Categories
//!
//! - **Tonal**: histogram equalization (`equalize`)

pub mod core;
pub mod equalize;
