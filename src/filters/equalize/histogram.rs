//! Intensity histogram and the kernels that fill it.
//!
//! [`HistogramKernel`] counts pixels in whole blocks of
//! [`NUM_ELEMS_PROCESSED_PER_ITERATION`] and is run once per row partition.
//! Each partition counts into a private table and merges it into the shared
//! histogram under a lock, so partitions can run in any order.
//!
//! [`BorderHistogramKernel`] counts the trailing pixels of each row that do
//! not fill a whole block. It only runs when the pipeline is configured to
//! accept unaligned widths.

use ndarray::{s, ArrayView3};
use parking_lot::Mutex;

use crate::filters::core::gray_plane;

/// Number of histogram bins (one per 8-bit intensity).
pub const NUM_BINS: usize = 256;

/// Pixels consumed per inner iteration of the accumulator.
pub const NUM_ELEMS_PROCESSED_PER_ITERATION: usize = 16;

// ============================================================================
// Histogram
// ============================================================================

/// 256-bin frequency count of 8-bit intensities.
///
/// Bins are `u64` so a single intensity can cover more than `u32::MAX` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; NUM_BINS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self { bins: [0; NUM_BINS] }
    }

    /// Zero every bin.
    pub fn reset(&mut self) {
        self.bins = [0; NUM_BINS];
    }

    pub fn bins(&self) -> &[u64; NUM_BINS] {
        &self.bins
    }

    pub fn get(&self, value: u8) -> u64 {
        self.bins[value as usize]
    }

    /// Sum of all bins.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Add a partial count into this histogram.
    pub fn merge(&mut self, partial: &[u64; NUM_BINS]) {
        for (bin, &count) in self.bins.iter_mut().zip(partial.iter()) {
            *bin += count;
        }
    }
}

// ============================================================================
// Accumulator
// ============================================================================

/// Counts stride-aligned pixels of a row partition into a shared histogram.
#[derive(Debug, Clone, Copy)]
pub struct HistogramKernel {
    stride: usize,
}

impl Default for HistogramKernel {
    fn default() -> Self {
        Self {
            stride: NUM_ELEMS_PROCESSED_PER_ITERATION,
        }
    }
}

impl HistogramKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_elems_processed_per_iteration(&self) -> usize {
        self.stride
    }

    /// Accumulate one partition of the image.
    ///
    /// Pixels past the last whole block of each row are skipped; they are
    /// the border kernel's job.
    ///
    /// # Arguments
    /// * `rows` - Row partition of a `(height, width, 1)` image
    /// * `shared` - Histogram all partitions merge into
    pub fn accumulate(&self, rows: ArrayView3<u8>, shared: &Mutex<Histogram>) {
        let plane = gray_plane(rows);
        let aligned = plane.ncols() - plane.ncols() % self.stride;
        let mut local = [0u64; NUM_BINS];

        for row in plane.rows() {
            match row.as_slice() {
                Some(pixels) => {
                    for block in pixels[..aligned].chunks_exact(self.stride) {
                        for &v in block {
                            local[v as usize] += 1;
                        }
                    }
                }
                None => {
                    for &v in row.slice(s![..aligned]).iter() {
                        local[v as usize] += 1;
                    }
                }
            }
        }

        shared.lock().merge(&local);
    }
}

// ============================================================================
// Border accumulator
// ============================================================================

/// Counts the pixels of each row left over after the last whole block.
#[derive(Debug, Clone, Copy)]
pub struct BorderHistogramKernel {
    stride: usize,
}

impl BorderHistogramKernel {
    /// # Arguments
    /// * `stride` - Block width used by the main accumulator
    pub fn new(stride: usize) -> Self {
        Self { stride }
    }

    pub fn accumulate(&self, image: ArrayView3<u8>, shared: &Mutex<Histogram>) {
        let plane = gray_plane(image);
        let start = plane.ncols() - plane.ncols() % self.stride;
        if start == plane.ncols() {
            return;
        }

        let mut local = [0u64; NUM_BINS];
        for &v in plane.slice(s![.., start..]).iter() {
            local[v as usize] += 1;
        }
        shared.lock().merge(&local);
    }
}
