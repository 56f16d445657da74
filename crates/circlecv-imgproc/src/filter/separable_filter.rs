use circlecv_image::{Image, ImageDtype, ImageError};
use rayon::prelude::*;

use crate::parallel::ExecutionStrategy;

/// A separable 2D filter that applies horizontal and vertical 1D correlations sequentially.
///
/// Borders are handled by replicating the edge pixels.
struct SeparableFilter<'a> {
    kernel_x: &'a [f32],
    kernel_y: &'a [f32],
}

impl SeparableFilter<'_> {
    fn half_x(&self) -> isize {
        (self.kernel_x.len() / 2) as isize
    }

    fn half_y(&self) -> isize {
        (self.kernel_y.len() / 2) as isize
    }

    /// Correlate one source row with the horizontal kernel into `row_tmp`.
    fn horizontal_row<T: ImageDtype, const C: usize>(&self, src_row: &[T], row_tmp: &mut [f32]) {
        let cols = src_row.len() / C;
        let half = self.half_x();
        for c in 0..cols {
            let mut acc = [0.0f32; C];
            for (i, &k) in self.kernel_x.iter().enumerate() {
                let x = (c as isize + i as isize - half).clamp(0, cols as isize - 1) as usize;
                for (ch, acc_val) in acc.iter_mut().enumerate() {
                    *acc_val += src_row[x * C + ch].into() * k;
                }
            }
            row_tmp[c * C..(c + 1) * C].copy_from_slice(&acc);
        }
    }

    /// Correlate the temporary buffer with the vertical kernel for output row `r`.
    fn vertical_row<T: ImageDtype>(
        &self,
        tmp: &[f32],
        dst_row: &mut [T],
        r: usize,
        rows: usize,
    ) {
        let row_len = dst_row.len();
        let half = self.half_y();
        for (i, dst_val) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (j, &k) in self.kernel_y.iter().enumerate() {
                let y = (r as isize + j as isize - half).clamp(0, rows as isize - 1) as usize;
                acc += tmp[y * row_len + i] * k;
            }
            *dst_val = T::from_f32(acc);
        }
    }

    fn apply<T: ImageDtype, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<T, C>,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImageError> {
        let rows = src.rows();
        let row_len = src.cols() * C;
        if rows == 0 || row_len == 0 {
            return Ok(());
        }

        let src_data = src.as_slice();
        let mut tmp = vec![0.0f32; src_data.len()];

        if strategy.is_parallel(src.size().num_pixels()) {
            strategy.install(|| {
                tmp.par_chunks_exact_mut(row_len)
                    .zip(src_data.par_chunks_exact(row_len))
                    .for_each(|(row_tmp, src_row)| self.horizontal_row::<T, C>(src_row, row_tmp));

                let tmp = &tmp;
                dst.as_slice_mut()
                    .par_chunks_exact_mut(row_len)
                    .enumerate()
                    .for_each(|(r, dst_row)| self.vertical_row(tmp, dst_row, r, rows));
            })
            .map_err(|e| ImageError::ExecutionError(e.to_string()))?;
        } else {
            tmp.chunks_exact_mut(row_len)
                .zip(src_data.chunks_exact(row_len))
                .for_each(|(row_tmp, src_row)| self.horizontal_row::<T, C>(src_row, row_tmp));

            dst.as_slice_mut()
                .chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(r, dst_row)| self.vertical_row(&tmp, dst_row, r, rows));
        }

        Ok(())
    }
}

/// Apply a separable filter with execution strategy control.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel, odd length.
/// * `kernel_y` - The vertical kernel, odd length.
/// * `strategy` - Execution strategy.
pub fn separable_filter_with_strategy<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    strategy: ExecutionStrategy,
) -> Result<(), ImageError>
where
    T: ImageDtype,
{
    if kernel_x.len() % 2 == 0 || kernel_y.len() % 2 == 0 {
        return Err(ImageError::InvalidKernelLength(
            kernel_x.len(),
            kernel_y.len(),
        ));
    }

    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let filter = SeparableFilter { kernel_x, kernel_y };
    filter.apply(src, dst, strategy)
}

/// Apply a separable filter to an image.
///
/// Uses [`ExecutionStrategy::Auto`]. For explicit control, use
/// [`separable_filter_with_strategy`].
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
pub fn separable_filter<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError>
where
    T: ImageDtype,
{
    separable_filter_with_strategy(src, dst, kernel_x, kernel_y, ExecutionStrategy::Auto)
}
