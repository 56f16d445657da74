use circlecv_image::{Image, ImageError};

use crate::filter::gaussian_blur;
use crate::parallel::{ExecuteExt, ExecutionStrategy};

/// Invert an 8-bit grayscale image, i.e. `dst = 255 - src`.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
pub fn invert(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    src.as_slice()
        .execute_with(ExecutionStrategy::Auto, dst.as_slice_mut(), |(s, d)| {
            *d = 255 - *s
        })
        .map_err(|e| ImageError::ExecutionError(e.to_string()))
}

/// Render a grayscale image as a pencil sketch.
///
/// The image is inverted, blurred with a gaussian of size `kernel_size` and a sigma
/// derived from it, inverted back and then used as the divisor of a colour dodge:
///
/// dst(x,y) = clamp(src(x,y) * 256 / blurred(x,y), 0, 255)
///
/// Pixels where the divisor is zero are set to zero.
///
/// # Arguments
///
/// * `src` - The grayscale input image.
/// * `dst` - The output sketch, same size as `src`.
/// * `kernel_size` - The gaussian kernel size, must be odd.
///
/// # Errors
///
/// Returns an error if the sizes do not match or the kernel size is even.
///
/// # Example
///
/// ```
/// use circlecv_image::Image;
/// use circlecv_imgproc::enhance::pencil_sketch;
///
/// let src = Image::<u8, 1>::from_size_val([8, 8].into(), 128).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// pencil_sketch(&src, &mut dst, 21).unwrap();
/// assert!(dst.as_slice().iter().all(|&v| v == 255));
/// ```
pub fn pencil_sketch(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    if kernel_size % 2 == 0 {
        return Err(ImageError::InvalidKernelLength(kernel_size, kernel_size));
    }

    let mut inverted = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    invert(src, &mut inverted)?;

    let mut blurred = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    gaussian_blur(
        &inverted,
        &mut blurred,
        (kernel_size, kernel_size),
        (0.0, 0.0),
    )?;

    // reuse the first buffer for the divisor
    invert(&blurred, &mut inverted)?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter().zip(inverted.as_slice()))
        .for_each(|(d, (&gray, &divisor))| {
            *d = if divisor == 0 {
                0
            } else {
                (gray as f32 * 256.0 / divisor as f32)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
        });

    Ok(())
}
