//! Cumulative distribution and lookup table construction.
//!
//! Runs on the coordinating thread once the histogram is final. The LUT maps
//! intensity `i` to
//!
//! ```text
//! round((cdf[i] - cdf_min) * 255 / (total - cdf_min))
//! ```
//!
//! where `cdf_min` is the first nonzero cumulative count. Intensities below
//! the darkest populated bin saturate to 0. Rounding is half away from zero
//! (`f64::round`). When every pixel shares one value (`total == cdf_min`),
//! or the image has no pixels, the LUT is the identity.

use super::histogram::{Histogram, NUM_BINS};

/// Running sum of a [`Histogram`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeDistribution {
    values: [u64; NUM_BINS],
}

impl Default for CumulativeDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl CumulativeDistribution {
    pub fn new() -> Self {
        Self {
            values: [0; NUM_BINS],
        }
    }

    /// Recompute the running sum from `hist`.
    pub fn fill_from(&mut self, hist: &Histogram) {
        let mut sum = 0u64;
        for (value, &count) in self.values.iter_mut().zip(hist.bins().iter()) {
            sum += count;
            *value = sum;
        }
    }

    pub fn values(&self) -> &[u64; NUM_BINS] {
        &self.values
    }

    /// Smallest nonzero cumulative count, or 0 for an empty distribution.
    pub fn min_nonzero(&self) -> u64 {
        self.values.iter().copied().find(|&v| v > 0).unwrap_or(0)
    }

    /// Final entry, equal to the number of pixels counted.
    pub fn total(&self) -> u64 {
        self.values[NUM_BINS - 1]
    }
}

/// 256-entry intensity mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lut {
    table: [u8; NUM_BINS],
}

impl Default for Lut {
    fn default() -> Self {
        Self::identity()
    }
}

impl Lut {
    pub fn identity() -> Self {
        let mut table = [0u8; NUM_BINS];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self { table }
    }

    pub fn from_table(table: [u8; NUM_BINS]) -> Self {
        Self { table }
    }

    #[inline]
    pub fn get(&self, value: u8) -> u8 {
        self.table[value as usize]
    }

    pub fn table(&self) -> &[u8; NUM_BINS] {
        &self.table
    }
}

/// Builds the cumulative distribution and the equalization LUT.
#[derive(Debug, Clone, Copy, Default)]
pub struct CumulativeDistributionKernel {
    total_pixels: u64,
}

impl CumulativeDistributionKernel {
    /// # Arguments
    /// * `total_pixels` - `width * height` of the bound input image
    pub fn new(total_pixels: u64) -> Self {
        Self { total_pixels }
    }

    /// Fill `cdf` from `hist`, then derive `lut` from it.
    pub fn run(&self, hist: &Histogram, cdf: &mut CumulativeDistribution, lut: &mut Lut) {
        cdf.fill_from(hist);
        debug_assert_eq!(cdf.total(), self.total_pixels);

        let cd_min = cdf.min_nonzero();
        if self.total_pixels <= cd_min {
            *lut = Lut::identity();
            return;
        }

        let scale = 255.0 / (self.total_pixels - cd_min) as f64;
        for (entry, &cum) in lut.table.iter_mut().zip(cdf.values.iter()) {
            let mapped = (cum.saturating_sub(cd_min) as f64 * scale).round();
            *entry = mapped.clamp(0.0, 255.0) as u8;
        }
    }
}
