use circlecv_image::{Image, ImageDtype, ImageError};

use super::{kernels, separable_filter_with_strategy};
use crate::parallel::ExecutionStrategy;

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y). Both must be odd.
/// * `sigma` - The sigma of the gaussian kernel, xy-ordered. Non-positive values
///   are derived from the kernel size.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use circlecv_image::Image;
/// use circlecv_imgproc::filter::gaussian_blur;
///
/// let src = Image::<f32, 1>::from_size_val([9, 9].into(), 255.0).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// gaussian_blur(&src, &mut dst, (7, 7), (2.0, 2.0)).unwrap();
/// assert!(dst.as_slice().iter().all(|v| (v - 255.0).abs() < 1e-3));
/// ```
pub fn gaussian_blur<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
) -> Result<(), ImageError> {
    gaussian_blur_with_strategy(src, dst, kernel_size, sigma, ExecutionStrategy::Auto)
}

/// Blur an image using a gaussian blur filter with execution strategy control.
///
/// See [`gaussian_blur`].
pub fn gaussian_blur_with_strategy<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    let kernel_x = kernels::gaussian_kernel_1d(kernel_size.0, sigma.0);
    let kernel_y = kernels::gaussian_kernel_1d(kernel_size.1, sigma.1);
    separable_filter_with_strategy(src, dst, &kernel_x, &kernel_y, strategy)
}

/// Compute the first order image derivative in both x and y using a 3x3 Sobel operator.
///
/// The kernels are not normalized and borders are replicated.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dx` - The horizontal derivative with shape (H, W, C).
/// * `dy` - The vertical derivative with shape (H, W, C).
/// * `strategy` - Execution strategy.
pub fn spatial_gradient<const C: usize>(
    src: &Image<f32, C>,
    dx: &mut Image<f32, C>,
    dy: &mut Image<f32, C>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dy.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dy.cols(),
            dy.rows(),
        ));
    }

    let (derivative, smoothing) = kernels::sobel_kernel3_1d();
    separable_filter_with_strategy(src, dx, &derivative, &smoothing, strategy)?;
    separable_filter_with_strategy(src, dy, &smoothing, &derivative, strategy)?;

    Ok(())
}
