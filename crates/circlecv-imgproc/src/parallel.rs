use rayon::prelude::*;
use thiserror::Error;

use circlecv_image::Image;

/// Number of work items from which [`ExecutionStrategy::Auto`] switches to parallel execution.
const AUTO_PARALLEL_THRESHOLD: usize = 100_000;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// Input and output sizes do not match.
    #[error("source and destination slices must have the same length")]
    SizeMismatch,
}

/// Controls how parallel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Use the global Rayon thread pool.
    Parallel,

    /// Parallel on the global pool once the workload reaches 100K items, serial otherwise.
    #[default]
    Auto,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Whether a workload of `work_items` elements runs in parallel under this strategy.
    pub fn is_parallel(&self, work_items: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => work_items >= AUTO_PARALLEL_THRESHOLD,
            ExecutionStrategy::Fixed(_) => true,
        }
    }

    /// Number of workers a workload of `work_items` elements is split across.
    pub fn num_workers(&self, work_items: usize) -> usize {
        if !self.is_parallel(work_items) {
            return 1;
        }
        match self {
            ExecutionStrategy::Fixed(n) => *n,
            _ => rayon::current_num_threads(),
        }
    }

    /// Run `op` under this strategy.
    ///
    /// `Fixed(n)` installs `op` on a fresh pool of `n` threads so that any rayon
    /// iterator used inside runs there. Every other strategy runs `op` on the
    /// calling thread.
    ///
    /// # Errors
    ///
    /// Fails when `Fixed(0)` is requested or when the pool cannot be built.
    pub fn install<R, F>(&self, op: F) -> Result<R, ParallelError>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self {
            ExecutionStrategy::Fixed(0) => Err(ParallelError::InvalidThreadCount(0)),
            ExecutionStrategy::Fixed(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;
                Ok(pool.install(op))
            }
            _ => Ok(op()),
        }
    }
}

/// Apply a function to each pixel in the image in parallel.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Trait to execute operations on a slice with a given strategy.
pub trait ExecuteExt<T> {
    /// Execute an operation on the slice with the given strategy.
    ///
    /// # Arguments
    ///
    /// * `strategy` - The execution strategy.
    /// * `dst` - The destination slice.
    /// * `op` - The operation to perform on each (source, destination) element pair.
    fn execute_with<F>(
        &self,
        strategy: ExecutionStrategy,
        dst: &mut [T],
        op: F,
    ) -> Result<(), ParallelError>
    where
        F: Fn((&T, &mut T)) + Sync + Send;
}

impl<T: Sync + Send> ExecuteExt<T> for &[T] {
    fn execute_with<F>(
        &self,
        strategy: ExecutionStrategy,
        dst: &mut [T],
        op: F,
    ) -> Result<(), ParallelError>
    where
        F: Fn((&T, &mut T)) + Sync + Send,
    {
        if self.len() != dst.len() {
            return Err(ParallelError::SizeMismatch);
        }

        if !strategy.is_parallel(self.len()) {
            self.iter().zip(dst.iter_mut()).for_each(op);
            return Ok(());
        }

        strategy.install(|| {
            self.par_iter().zip(dst.par_iter_mut()).for_each(op);
        })
    }
}
