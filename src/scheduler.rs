//! Worker scheduling for the parallel pipeline stages.
//!
//! A [`Scheduler`] runs a batch of independent jobs and returns only once
//! every job has finished. That return is the barrier the equalization
//! pipeline relies on between its stages.
//!
//! Two implementations are provided:
//! - [`RayonScheduler`] - rayon's global pool, or a dedicated pool of N threads
//! - [`SequentialScheduler`] - runs every job on the calling thread, in order

use log::trace;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{EqualizeError, Result};

/// A unit of work borrowed from the caller for the duration of one stage.
pub type Job<'scope> = Box<dyn FnOnce() + Send + 'scope>;

/// Executes pipeline stages on behalf of the coordinator.
pub trait Scheduler: Send + Sync {
    /// Number of partitions a parallel stage should be split into.
    fn num_partitions(&self) -> usize;

    /// Run all jobs, blocking until every one of them has completed.
    fn run_parallel<'scope>(&self, jobs: Vec<Job<'scope>>);

    /// Run a single job that must not overlap with any other stage.
    fn run_sequential<'scope>(&self, job: Job<'scope>) {
        job();
    }
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    fn num_partitions(&self) -> usize {
        (**self).num_partitions()
    }

    fn run_parallel<'scope>(&self, jobs: Vec<Job<'scope>>) {
        (**self).run_parallel(jobs)
    }

    fn run_sequential<'scope>(&self, job: Job<'scope>) {
        (**self).run_sequential(job)
    }
}

// ============================================================================
// Rayon
// ============================================================================

/// Scheduler backed by rayon.
///
/// `RayonScheduler::new()` shares rayon's global pool with the rest of the
/// process; `with_threads` owns a dedicated pool.
#[derive(Default)]
pub struct RayonScheduler {
    pool: Option<ThreadPool>,
}

impl RayonScheduler {
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Build a scheduler with its own pool of `num_threads` workers.
    ///
    /// # Arguments
    /// * `num_threads` - Worker count; 0 lets rayon pick from the CPU count
    ///
    /// # Returns
    /// The scheduler, or `EqualizeError::ThreadPool` if the pool could not be built
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("equalize-worker-{i}"))
            .build()
            .map_err(|e| EqualizeError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }
}

impl Scheduler for RayonScheduler {
    fn num_partitions(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn run_parallel<'scope>(&self, jobs: Vec<Job<'scope>>) {
        trace!("rayon: running {} jobs", jobs.len());
        let run = move || jobs.into_par_iter().for_each(|job| job());
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

// ============================================================================
// Sequential
// ============================================================================

/// Runs every job on the calling thread in submission order.
///
/// Deterministic stand-in for a worker pool, used by tests and by targets
/// without threads (WASM).
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialScheduler;

impl Scheduler for SequentialScheduler {
    fn num_partitions(&self) -> usize {
        1
    }

    fn run_parallel<'scope>(&self, jobs: Vec<Job<'scope>>) {
        for job in jobs {
            job();
        }
    }
}

// ============================================================================
// Iteration window
// ============================================================================

/// Row extent a stage splits across partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub height: usize,
}

impl Window {
    pub fn new(height: usize) -> Self {
        Self { height }
    }

    /// Rows handed to each partition when splitting over `partitions` workers.
    ///
    /// Never returns 0, so it is always a valid chunk size for
    /// `axis_chunks_iter`.
    pub fn rows_per_partition(&self, partitions: usize, min_rows: usize) -> usize {
        self.height
            .div_ceil(partitions.max(1))
            .max(min_rows)
            .max(1)
    }
}
