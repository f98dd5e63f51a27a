//! Histogram equalization for 8-bit grayscale images.
//!
//! Equalization redistributes intensities so the output histogram is as
//! close to uniform as a monotonic remapping allows. It is computed in
//! three dependent stages:
//!
//! 1. **Histogram** - parallel over row partitions, partial counts merged
//! 2. **Cumulative distribution + LUT** - sequential, on the calling thread
//! 3. **Table lookup** - parallel over row partitions, disjoint output rows
//!
//! An optional border stage counts the pixels past the last 16-pixel block
//! of each row. It is off by default, and while it is off the image width
//! must be a multiple of 16.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type |
//! |--------|-------|------|
//! | Grayscale8 | (H, W, 1) | u8 |
//!
//! ## Usage
//!
//! ```
//! use imagestag_equalize::filters::equalize::{EqualizeHistogram, EqualizeOptions};
//! use imagestag_equalize::scheduler::SequentialScheduler;
//! use ndarray::Array3;
//!
//! let input = Array3::from_shape_fn((4, 16, 1), |(y, x, _)| (y * 16 + x) as u8);
//! let mut output = Array3::<u8>::zeros((4, 16, 1));
//!
//! let mut eq = EqualizeHistogram::new(SequentialScheduler);
//! eq.configure(input.view(), output.view_mut()).unwrap();
//! eq.run();
//! assert_eq!(eq.lut().get(63), 255);
//! ```

pub mod cumulative;
pub mod histogram;
pub mod table_lookup;

use log::{debug, trace, warn};
use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis};
use parking_lot::Mutex;

use crate::error::{EqualizeError, Result};
use crate::filters::core::{check_same_shape, check_width_alignment, gray_dims};
use crate::scheduler::{Job, RayonScheduler, Scheduler, Window};

pub use cumulative::{CumulativeDistribution, CumulativeDistributionKernel, Lut};
pub use histogram::{
    BorderHistogramKernel, Histogram, HistogramKernel, NUM_BINS,
    NUM_ELEMS_PROCESSED_PER_ITERATION,
};
pub use table_lookup::TableLookupKernel;

// ============================================================================
// Options
// ============================================================================

/// Settings fixed at pipeline construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqualizeOptions {
    /// Count the pixels past the last whole 16-pixel block of each row.
    ///
    /// Enabling this is what allows widths that are not a multiple of 16.
    pub border_histogram: bool,
    /// Lower bound on rows per partition, so small images are not split
    /// into more jobs than they are worth.
    pub min_rows_per_partition: usize,
}

impl Default for EqualizeOptions {
    fn default() -> Self {
        Self {
            border_histogram: false,
            min_rows_per_partition: 16,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Lifecycle of an [`EqualizeHistogram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Unconfigured,
    Configured,
    Running,
}

/// Images and kernels bound by `configure`.
struct Bound<'i, 'o> {
    input: ArrayView3<'i, u8>,
    output: ArrayViewMut3<'o, u8>,
    histogram_kernel: HistogramKernel,
    border_histogram_kernel: Option<BorderHistogramKernel>,
    cd_histogram_kernel: CumulativeDistributionKernel,
    map_histogram_kernel: TableLookupKernel,
}

/// Histogram equalization pipeline bound to one input and one output image.
///
/// Configure once, then call [`run`](Self::run) as often as needed; every run
/// recomputes the histogram, distribution and LUT from the current input.
/// [`set_input`](Self::set_input) swaps in a new input of the configured
/// shape between runs, and [`output`](Self::output) reads the result without
/// releasing the pipeline.
pub struct EqualizeHistogram<'i, 'o, S: Scheduler> {
    scheduler: S,
    options: EqualizeOptions,
    state: PipelineState,
    bound: Option<Bound<'i, 'o>>,
    hist: Mutex<Histogram>,
    cum_dist: CumulativeDistribution,
    cd_lut: Lut,
    run_border_histogram: bool,
}

impl<'i, 'o, S: Scheduler> EqualizeHistogram<'i, 'o, S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_options(scheduler, EqualizeOptions::default())
    }

    pub fn with_options(scheduler: S, options: EqualizeOptions) -> Self {
        Self {
            scheduler,
            options,
            state: PipelineState::Unconfigured,
            bound: None,
            hist: Mutex::new(Histogram::new()),
            cum_dist: CumulativeDistribution::new(),
            cd_lut: Lut::identity(),
            run_border_histogram: false,
        }
    }

    /// Validate and bind the images.
    ///
    /// On error nothing is computed, the output is left untouched and the
    /// pipeline is unconfigured; it may be configured again.
    ///
    /// # Arguments
    /// * `input` - Grayscale image (height, width, 1)
    /// * `output` - Destination with the same shape as `input`
    pub fn configure(
        &mut self,
        input: ArrayView3<'i, u8>,
        output: ArrayViewMut3<'o, u8>,
    ) -> Result<()> {
        self.state = PipelineState::Unconfigured;
        self.bound = None;
        self.run_border_histogram = false;

        let validated = self.validate(input.dim(), output.dim());
        if let Err(e) = &validated {
            warn!("equalize: rejected configuration: {e}");
        }
        let (height, width) = validated?;

        let histogram_kernel = HistogramKernel::new();
        let stride = histogram_kernel.num_elems_processed_per_iteration();

        self.run_border_histogram = self.options.border_histogram && width % stride != 0;
        let border_histogram_kernel = self
            .run_border_histogram
            .then(|| BorderHistogramKernel::new(stride));

        self.bound = Some(Bound {
            input,
            output,
            histogram_kernel,
            border_histogram_kernel,
            cd_histogram_kernel: CumulativeDistributionKernel::new((height * width) as u64),
            map_histogram_kernel: TableLookupKernel,
        });
        self.state = PipelineState::Configured;

        debug!(
            "equalize: configured {}x{} (border histogram: {})",
            width, height, self.run_border_histogram
        );
        Ok(())
    }

    fn validate(
        &self,
        input: (usize, usize, usize),
        output: (usize, usize, usize),
    ) -> Result<(usize, usize)> {
        let (height, width) = gray_dims(input, "input")?;
        gray_dims(output, "output")?;
        if !self.options.border_histogram {
            check_width_alignment(width, NUM_ELEMS_PROCESSED_PER_ITERATION)?;
        }
        check_same_shape(input, output)?;
        Ok((height, width))
    }

    /// Replace the bound input with another image of the configured shape.
    ///
    /// The kernels and the output stay bound. A differently shaped image is
    /// rejected and the previous input is kept.
    ///
    /// # Panics
    /// If the pipeline has not been successfully configured.
    pub fn set_input(&mut self, input: ArrayView3<'i, u8>) -> Result<()> {
        let Some(bound) = self.bound.as_mut() else {
            panic!("EqualizeHistogram::set_input called before configure()");
        };

        let configured = bound.input.dim();
        if input.dim() != configured {
            let err = EqualizeError::InputShapeChanged {
                configured,
                rebound: input.dim(),
            };
            warn!("equalize: {err}");
            return Err(err);
        }

        bound.input = input;
        Ok(())
    }

    /// Equalize the bound input into the bound output.
    ///
    /// # Panics
    /// If the pipeline has not been successfully configured.
    pub fn run(&mut self) {
        assert!(
            self.state == PipelineState::Configured,
            "EqualizeHistogram::run called in state {:?}; configure() must succeed first",
            self.state
        );

        let Self {
            scheduler,
            options,
            state,
            bound,
            hist,
            cum_dist,
            cd_lut,
            ..
        } = self;
        let Some(bound) = bound.as_mut() else {
            panic!("EqualizeHistogram::run called without bound images");
        };

        *state = PipelineState::Running;
        hist.get_mut().reset();

        let rows = Window::new(bound.input.len_of(Axis(0)))
            .rows_per_partition(scheduler.num_partitions(), options.min_rows_per_partition);
        trace!("equalize: {} rows per partition", rows);

        // Histogram of the input, one job per row partition
        {
            let kernel = bound.histogram_kernel;
            let shared = &*hist;
            let jobs: Vec<Job<'_>> = bound
                .input
                .axis_chunks_iter(Axis(0), rows)
                .map(|chunk| Box::new(move || kernel.accumulate(chunk, shared)) as Job<'_>)
                .collect();
            debug!("equalize: histogram over {} partitions", jobs.len());
            scheduler.run_parallel(jobs);
        }

        // Pixels past the last whole block
        if let Some(border) = bound.border_histogram_kernel {
            let input = bound.input.view();
            let shared = &*hist;
            scheduler.run_sequential(Box::new(move || border.accumulate(input, shared)));
        }

        // Cumulative distribution and LUT; exclusive access to the histogram
        {
            let kernel = bound.cd_histogram_kernel;
            let hist = &*hist.get_mut();
            let (cdf, lut) = (&mut *cum_dist, &mut *cd_lut);
            scheduler.run_sequential(Box::new(move || kernel.run(hist, cdf, lut)));
        }

        // Remap through the finished LUT
        {
            let kernel = bound.map_histogram_kernel;
            let lut = &*cd_lut;
            let jobs: Vec<Job<'_>> = bound
                .input
                .axis_chunks_iter(Axis(0), rows)
                .zip(bound.output.axis_chunks_iter_mut(Axis(0), rows))
                .map(|(src, dst)| Box::new(move || kernel.remap(src, dst, lut)) as Job<'_>)
                .collect();
            scheduler.run_parallel(jobs);
        }

        *state = PipelineState::Configured;
        debug!("equalize: run complete");
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Whether the border stage is part of the configured pipeline.
    pub fn runs_border_histogram(&self) -> bool {
        self.run_border_histogram
    }

    /// Read access to the bound output, `None` until configured.
    pub fn output(&self) -> Option<ArrayView3<'_, u8>> {
        self.bound.as_ref().map(|bound| bound.output.view())
    }

    /// Histogram of the most recent run.
    pub fn histogram(&self) -> Histogram {
        self.hist.lock().clone()
    }

    /// Cumulative distribution of the most recent run.
    pub fn cumulative_distribution(&self) -> &CumulativeDistribution {
        &self.cum_dist
    }

    /// LUT of the most recent run.
    pub fn lut(&self) -> &Lut {
        &self.cd_lut
    }
}

// ============================================================================
// One-shot helpers
// ============================================================================

/// Equalize a grayscale u8 image on rayon's global pool.
///
/// # Arguments
/// * `input` - Image with 1 channel (height, width, 1); width a multiple of 16
///
/// # Returns
/// Equalized image with the same shape, or the configuration error
pub fn equalize_histogram_u8(input: ArrayView3<u8>) -> Result<Array3<u8>> {
    equalize_histogram_with(input, RayonScheduler::new(), EqualizeOptions::default())
}

/// Equalize a grayscale u8 image with an explicit scheduler and options.
pub fn equalize_histogram_with<S: Scheduler>(
    input: ArrayView3<u8>,
    scheduler: S,
    options: EqualizeOptions,
) -> Result<Array3<u8>> {
    let mut output = Array3::<u8>::zeros(input.raw_dim());
    {
        let mut pipeline = EqualizeHistogram::with_options(scheduler, options);
        pipeline.configure(input.view(), output.view_mut())?;
        pipeline.run();
    }
    Ok(output)
}
