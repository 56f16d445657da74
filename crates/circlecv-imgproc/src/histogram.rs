use circlecv_image::{Image, ImageError};
use rayon::prelude::*;

/// Compute the pixel intensity histogram of an image.
///
/// NOTE: this is limited to 8-bit 1-channel images.
///
/// # Arguments
///
/// * `src` - The input image to compute the histogram.
/// * `hist` - The output histogram, counts are added to it.
/// * `num_bins` - The number of bins to use for the histogram.
///
/// # Errors
///
/// Returns an error if the number of bins is invalid.
///
/// # Example
///
/// ```
/// use circlecv_image::{Image, ImageSize};
/// use circlecv_imgproc::histogram::compute_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
/// ).unwrap();
///
/// let mut histogram = vec![0; 3];
///
/// compute_histogram(&image, &mut histogram, 3).unwrap();
/// assert_eq!(histogram, vec![3, 3, 3]);
/// ```
pub fn compute_histogram(
    src: &Image<u8, 1>,
    hist: &mut [usize],
    num_bins: usize,
) -> Result<(), ImageError> {
    if num_bins == 0 || num_bins > 256 || hist.len() != num_bins {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    let mut bin_lut = [0usize; 256];
    for (i, bin) in bin_lut.iter_mut().enumerate() {
        *bin = (i * num_bins) >> 8;
    }

    let counts = src
        .as_slice()
        .par_chunks(4096)
        .fold(
            || vec![0usize; num_bins],
            |mut local, chunk| {
                for &px in chunk {
                    local[bin_lut[px as usize]] += 1;
                }
                local
            },
        )
        .reduce(
            || vec![0usize; num_bins],
            |mut a, b| {
                a.iter_mut().zip(b.iter()).for_each(|(a, b)| *a += b);
                a
            },
        );

    hist.iter_mut()
        .zip(counts.iter())
        .for_each(|(h, c)| *h += c);

    Ok(())
}

/// Summary statistics of the pixel intensities of a grayscale image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityStats {
    /// Mean intensity.
    pub mean: f64,
    /// Median intensity, the average of the two middle values for an even pixel count.
    pub median: f64,
    /// Population standard deviation of the intensities.
    pub std_dev: f64,
}

/// Compute the mean, median and standard deviation of an 8-bit grayscale image.
///
/// # Errors
///
/// Returns [`ImageError::EmptyImage`] if the image has no pixels.
///
/// # Example
///
/// ```
/// use circlecv_image::Image;
/// use circlecv_imgproc::histogram::intensity_stats;
///
/// let image = Image::<u8, 1>::new([4, 1].into(), vec![10, 20, 30, 40]).unwrap();
/// let stats = intensity_stats(&image).unwrap();
///
/// assert_eq!(stats.mean, 25.0);
/// assert_eq!(stats.median, 25.0);
/// ```
pub fn intensity_stats(src: &Image<u8, 1>) -> Result<IntensityStats, ImageError> {
    let num_pixels = src.as_slice().len();
    if num_pixels == 0 {
        return Err(ImageError::EmptyImage);
    }

    let mut hist = vec![0usize; 256];
    compute_histogram(src, &mut hist, 256)?;

    let n = num_pixels as f64;
    let mean = hist
        .iter()
        .enumerate()
        .map(|(v, &c)| v as f64 * c as f64)
        .sum::<f64>()
        / n;

    let variance = hist
        .iter()
        .enumerate()
        .map(|(v, &c)| {
            let d = v as f64 - mean;
            d * d * c as f64
        })
        .sum::<f64>()
        / n;

    let median = if num_pixels % 2 == 1 {
        value_at_rank(&hist, num_pixels / 2) as f64
    } else {
        let lo = value_at_rank(&hist, num_pixels / 2 - 1);
        let hi = value_at_rank(&hist, num_pixels / 2);
        (lo + hi) as f64 / 2.0
    };

    Ok(IntensityStats {
        mean,
        median,
        std_dev: variance.sqrt(),
    })
}

/// Intensity of the pixel at `rank` (0-based) in sorted order.
fn value_at_rank(hist: &[usize], rank: usize) -> usize {
    let mut seen = 0;
    for (v, &c) in hist.iter().enumerate() {
        seen += c;
        if seen > rank {
            return v;
        }
    }
    hist.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use circlecv_image::ImageSize;

    #[test]
    fn test_compute_histogram() -> Result<(), ImageError> {
        let image = Image::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
        )?;

        let mut histogram = vec![0; 3];

        compute_histogram(&image, &mut histogram, 3)?;
        assert_eq!(histogram, vec![3, 3, 3]);

        Ok(())
    }

    #[test]
    fn test_compute_histogram_invalid_bins() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let mut histogram = vec![0; 4];
        assert_eq!(
            compute_histogram(&image, &mut histogram, 3),
            Err(ImageError::InvalidHistogramBins(3))
        );
        let mut histogram = vec![0; 257];
        assert_eq!(
            compute_histogram(&image, &mut histogram, 257),
            Err(ImageError::InvalidHistogramBins(257))
        );
        Ok(())
    }

    #[test]
    fn test_intensity_stats() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([5, 1].into(), vec![1, 2, 3, 4, 100])?;
        let stats = intensity_stats(&image)?;

        assert_relative_eq!(stats.mean, 22.0);
        assert_relative_eq!(stats.median, 3.0);
        // population variance: (21² + 20² + 19² + 18² + 78²) / 5
        assert_relative_eq!(stats.std_dev, (7610.0f64 / 5.0).sqrt(), epsilon = 1e-9);

        Ok(())
    }

    #[test]
    fn test_intensity_stats_even_median() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([2, 2].into(), vec![255, 0, 10, 11])?;
        let stats = intensity_stats(&image)?;
        assert_relative_eq!(stats.median, 10.5);
        Ok(())
    }

    #[test]
    fn test_intensity_stats_empty() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([0, 0].into(), vec![])?;
        assert_eq!(intensity_stats(&image), Err(ImageError::EmptyImage));
        Ok(())
    }
}
