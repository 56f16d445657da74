use std::collections::HashMap;

use circlecv_image::ImageSize;
use rayon::prelude::*;

use super::config::AccumulatorStrategy;
use super::edges::{EdgePixel, EdgeSet};
use super::HoughError;
use crate::parallel::{ExecutionStrategy, ParallelError};

/// Bytes per cell of a [`DenseAccumulator`].
pub const DENSE_CELL_BYTES: usize = std::mem::size_of::<u32>();

/// Estimated bytes per occupied cell of a [`SparseAccumulator`], table overhead included.
pub const SPARSE_CELL_BYTES: usize = 48;

/// A cell of the accumulator: center bin and radius offset from the minimum radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bin {
    /// Horizontal center bin.
    pub x: usize,
    /// Vertical center bin.
    pub y: usize,
    /// Radius index, `radius - min_radius`.
    pub r: usize,
}

/// Dimensions of the accumulator grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatorShape {
    /// Number of horizontal bins, `ceil(width / dp)`.
    pub cols: usize,
    /// Number of vertical bins, `ceil(height / dp)`.
    pub rows: usize,
    /// Number of radii.
    pub radii: usize,
}

impl AccumulatorShape {
    /// Shape of the grid for an image of `size` at resolution ratio `dp`.
    pub fn new(size: ImageSize, dp: f32, radii: usize) -> Self {
        Self {
            cols: (size.width as f32 / dp).ceil() as usize,
            rows: (size.height as f32 / dp).ceil() as usize,
            radii,
        }
    }

    /// Total number of cells, `None` on overflow.
    pub fn num_cells(&self) -> Option<usize> {
        self.cols.checked_mul(self.rows)?.checked_mul(self.radii)
    }

    fn index(&self, bin: Bin) -> usize {
        (bin.r * self.rows + bin.y) * self.cols + bin.x
    }

    fn bin(&self, index: usize) -> Bin {
        let plane = self.cols * self.rows;
        Bin {
            x: index % self.cols,
            y: (index % plane) / self.cols,
            r: index / plane,
        }
    }
}

/// Storage for the votes of one detection run.
pub trait VoteAccumulator: Sized + Send {
    /// Create an accumulator with every cell at zero.
    fn with_shape(shape: AccumulatorShape) -> Self;

    /// Shape of the grid.
    fn shape(&self) -> AccumulatorShape;

    /// Add one vote to `bin`.
    fn increment(&mut self, bin: Bin);

    /// Add the votes of `other` cell by cell.
    fn merge(&mut self, other: Self);

    /// Votes held by `bin`.
    fn votes(&self, bin: Bin) -> u32;

    /// Visit every cell holding at least one vote.
    fn for_each_cell(&self, f: impl FnMut(Bin, u32));
}

/// Accumulator backed by one counter per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseAccumulator {
    shape: AccumulatorShape,
    cells: Vec<u32>,
}

impl VoteAccumulator for DenseAccumulator {
    fn with_shape(shape: AccumulatorShape) -> Self {
        let num_cells = shape.num_cells().unwrap_or(0);
        Self {
            shape,
            cells: vec![0; num_cells],
        }
    }

    fn shape(&self) -> AccumulatorShape {
        self.shape
    }

    fn increment(&mut self, bin: Bin) {
        let idx = self.shape.index(bin);
        self.cells[idx] += 1;
    }

    fn merge(&mut self, other: Self) {
        self.cells
            .iter_mut()
            .zip(other.cells.iter())
            .for_each(|(a, b)| *a += b);
    }

    fn votes(&self, bin: Bin) -> u32 {
        self.cells[self.shape.index(bin)]
    }

    fn for_each_cell(&self, mut f: impl FnMut(Bin, u32)) {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > 0)
            .for_each(|(idx, &v)| f(self.shape.bin(idx), v));
    }
}

/// Accumulator that only stores the cells that received votes.
///
/// Cells are keyed by their [`Bin`], so grids too large to index with a `usize` still work.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseAccumulator {
    shape: AccumulatorShape,
    cells: HashMap<Bin, u32>,
}

impl VoteAccumulator for SparseAccumulator {
    fn with_shape(shape: AccumulatorShape) -> Self {
        Self {
            shape,
            cells: HashMap::new(),
        }
    }

    fn shape(&self) -> AccumulatorShape {
        self.shape
    }

    fn increment(&mut self, bin: Bin) {
        *self.cells.entry(bin).or_insert(0) += 1;
    }

    fn merge(&mut self, other: Self) {
        for (bin, v) in other.cells {
            *self.cells.entry(bin).or_insert(0) += v;
        }
    }

    fn votes(&self, bin: Bin) -> u32 {
        self.cells.get(&bin).copied().unwrap_or(0)
    }

    fn for_each_cell(&self, mut f: impl FnMut(Bin, u32)) {
        for (&bin, &v) in &self.cells {
            f(bin, v);
        }
    }
}

/// Storage chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Storage {
    Dense,
    Sparse,
}

/// How the votes of a run are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VotePlan {
    pub storage: Storage,
    /// Number of partial accumulators filled concurrently.
    pub workers: usize,
    /// Number of radii voted in one pass over the edges.
    pub band: usize,
}

/// Bytes needed by `workers` dense partials of `shape`, `None` on overflow.
pub fn dense_footprint(shape: AccumulatorShape, workers: usize) -> Option<usize> {
    shape
        .num_cells()?
        .checked_mul(DENSE_CELL_BYTES)?
        .checked_mul(workers)
}

/// Upper bound of the bytes needed by `workers` sparse partials of `shape` fed by
/// `num_edges` edge pixels, `None` on overflow.
///
/// Each edge pixel votes at most twice per radius, and no partial holds more
/// cells than a radius plane has.
pub fn sparse_footprint(shape: AccumulatorShape, num_edges: usize, workers: usize) -> Option<usize> {
    let plane = shape.cols.saturating_mul(shape.rows);
    let per_radius = plane
        .saturating_mul(workers)
        .min(num_edges.saturating_mul(2));
    per_radius
        .checked_mul(shape.radii)?
        .checked_mul(SPARSE_CELL_BYTES)
}

/// Pick the storage, the number of workers and the radius band of a run.
///
/// The run fails only when a single radius plane held by a single worker does
/// not fit the ceiling, so whether it fails does not depend on the requested
/// worker count. Otherwise the workers are reduced until one plane per worker
/// fits, then the radii are voted in the deepest bands the ceiling allows.
///
/// [`AccumulatorStrategy::Auto`] keeps the whole grid dense when it fits, and
/// otherwise takes the storage with the smaller footprint per radius.
pub(crate) fn plan_storage(
    strategy: AccumulatorStrategy,
    shape: AccumulatorShape,
    num_edges: usize,
    workers: usize,
    limit: usize,
) -> Result<VotePlan, HoughError> {
    let workers = workers.max(1);
    let footprint = |storage: Storage, radii: usize, workers: usize| {
        let shape = AccumulatorShape { radii, ..shape };
        match storage {
            Storage::Dense => dense_footprint(shape, workers),
            Storage::Sparse => sparse_footprint(shape, num_edges, workers),
        }
        .unwrap_or(usize::MAX)
    };

    let storage = match strategy {
        AccumulatorStrategy::Dense => Storage::Dense,
        AccumulatorStrategy::Sparse => Storage::Sparse,
        AccumulatorStrategy::Auto if footprint(Storage::Dense, shape.radii, workers) <= limit => {
            Storage::Dense
        }
        AccumulatorStrategy::Auto => {
            let fitting = [Storage::Dense, Storage::Sparse]
                .into_iter()
                .filter(|&s| footprint(s, 1, 1) <= limit)
                .min_by_key(|&s| footprint(s, 1, workers));
            match fitting {
                Some(storage) => storage,
                None => {
                    let required = footprint(Storage::Dense, 1, 1).min(footprint(Storage::Sparse, 1, 1));
                    return Err(HoughError::ResourceLimitExceeded { required, limit });
                }
            }
        }
    };

    let required = footprint(storage, 1, 1);
    if required > limit {
        return Err(HoughError::ResourceLimitExceeded { required, limit });
    }

    let workers = largest_fitting(workers, |w| footprint(storage, 1, w) <= limit);
    let band = largest_fitting(shape.radii, |radii| footprint(storage, radii, workers) <= limit);
    if band < shape.radii {
        log::debug!(
            "the {:?} accumulator exceeds {limit} bytes, voting {band} of {} radii per pass",
            storage,
            shape.radii
        );
    }

    Ok(VotePlan {
        storage,
        workers,
        band,
    })
}

// largest value in `1..=max` accepted by `fits`, which must hold on a prefix of the range
fn largest_fitting(max: usize, fits: impl Fn(usize) -> bool) -> usize {
    let (mut lo, mut hi) = (1, max.max(1));
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// Casts the votes of edge pixels into an accumulator.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Voter {
    pub shape: AccumulatorShape,
    pub size: ImageSize,
    pub dp: f32,
    pub min_radius: usize,
}

impl Voter {
    fn vote_edge<A: VoteAccumulator>(&self, acc: &mut A, edge: &EdgePixel) {
        let (width, height) = (self.size.width as f32, self.size.height as f32);
        let (sin, cos) = edge.direction.sin_cos();
        let (px, py) = (edge.x as f32, edge.y as f32);

        for r in 0..self.shape.radii {
            let radius = (self.min_radius + r) as f32;
            // a zero radius has a single candidate center
            let signs: &[f32] = if radius == 0.0 { &[1.0] } else { &[-1.0, 1.0] };

            for &sign in signs {
                let cx = px + sign * radius * cos;
                let cy = py + sign * radius * sin;
                if cx < 0.0 || cy < 0.0 || cx >= width || cy >= height {
                    continue;
                }

                let x = (cx / self.dp + 0.5).floor() as usize;
                let y = (cy / self.dp + 0.5).floor() as usize;
                if x >= self.shape.cols || y >= self.shape.rows {
                    continue;
                }

                acc.increment(Bin { x, y, r });
            }
        }
    }

    fn vote_all<A: VoteAccumulator>(&self, edges: &[EdgePixel]) -> A {
        let mut acc = A::with_shape(self.shape);
        edges.iter().for_each(|e| self.vote_edge(&mut acc, e));
        acc
    }

    /// Fill an accumulator from `edges`, splitting the work across `workers` partials.
    pub fn cast<A: VoteAccumulator>(
        &self,
        edges: &EdgeSet,
        strategy: ExecutionStrategy,
        workers: usize,
    ) -> Result<A, ParallelError> {
        if workers <= 1 || edges.len() <= 1 {
            return Ok(self.vote_all(edges.as_slice()));
        }

        let chunk_len = edges.len().div_ceil(workers);
        strategy.install(|| {
            edges
                .as_slice()
                .par_chunks(chunk_len)
                .map(|chunk| self.vote_all::<A>(chunk))
                .reduce_with(|mut a, b| {
                    a.merge(b);
                    a
                })
                .unwrap_or_else(|| A::with_shape(self.shape))
        })
    }
}
