use std::f32::consts::TAU;

use circlecv_image::{Image, ImageSize};
use rayon::prelude::*;

use super::HoughError;
use crate::filter::spatial_gradient;
use crate::parallel::ExecutionStrategy;

/// Gradient strength and orientation at one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradientSample {
    /// Euclidean norm of the Sobel response, never negative.
    pub magnitude: f32,
    /// Angle of the gradient in radians, in `[0, 2π)`. Meaningless when the magnitude is zero.
    pub direction: f32,
}

impl GradientSample {
    fn from_derivatives(dx: f32, dy: f32) -> Self {
        let magnitude = (dx * dx + dy * dy).sqrt();
        if magnitude == 0.0 {
            return Self::default();
        }

        let mut direction = dy.atan2(dx).rem_euclid(TAU);
        if direction >= TAU {
            direction = 0.0;
        }

        Self {
            magnitude,
            direction,
        }
    }
}

/// Per-pixel gradient of an intensity field.
///
/// The one-pixel border carries zero samples.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    size: ImageSize,
    samples: Vec<GradientSample>,
}

impl GradientField {
    /// Compute the 3x3 Sobel gradient of `field`.
    ///
    /// # Errors
    ///
    /// Returns [`HoughError::EmptyInput`] for a field without pixels.
    pub fn compute(field: &Image<f32, 1>, strategy: ExecutionStrategy) -> Result<Self, HoughError> {
        let size = field.size();
        if size.is_empty() {
            return Err(HoughError::EmptyInput);
        }

        let mut dx = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        spatial_gradient(field, &mut dx, &mut dy, strategy)?;

        let (cols, rows) = (size.width, size.height);
        let (dx, dy) = (dx.as_slice(), dy.as_slice());
        let fill_row = |(y, row): (usize, &mut [GradientSample])| {
            if y == 0 || y + 1 >= rows {
                return;
            }
            for x in 1..cols.saturating_sub(1) {
                let idx = y * cols + x;
                row[x] = GradientSample::from_derivatives(dx[idx], dy[idx]);
            }
        };

        let mut samples = vec![GradientSample::default(); size.num_pixels()];
        if strategy.is_parallel(size.num_pixels()) {
            strategy.install(|| {
                samples
                    .par_chunks_exact_mut(cols)
                    .enumerate()
                    .for_each(&fill_row)
            })?;
        } else {
            samples.chunks_exact_mut(cols).enumerate().for_each(&fill_row);
        }

        Ok(Self { size, samples })
    }

    /// Size of the field in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Sample at pixel `(x, y)`, `None` outside the field.
    pub fn get(&self, x: usize, y: usize) -> Option<&GradientSample> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.samples.get(y * self.size.width + x)
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[GradientSample] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn vertical_step(size: ImageSize, flip: bool) -> Result<Image<f32, 1>, HoughError> {
        let mut field = Image::<f32, 1>::from_size_val(size, 0.0)?;
        for y in 0..size.height {
            for x in size.width / 2..size.width {
                field.set_pixel(x, y, 0, 10.0)?;
            }
        }
        if flip {
            field.as_slice_mut().iter_mut().for_each(|v| *v = 10.0 - *v);
        }
        Ok(field)
    }

    #[test]
    fn test_gradient_step() -> Result<(), HoughError> {
        let size = ImageSize {
            width: 6,
            height: 5,
        };
        let field = vertical_step(size, false)?;
        let gradient = GradientField::compute(&field, ExecutionStrategy::Serial)?;

        let sample = gradient.get(2, 2).copied().unwrap_or_default();
        assert_relative_eq!(sample.magnitude, 40.0);
        assert_relative_eq!(sample.direction, 0.0);

        // flat regions and borders are zero
        assert_eq!(gradient.get(1, 2), Some(&GradientSample::default()));
        assert_eq!(gradient.get(3, 0), Some(&GradientSample::default()));
        assert_eq!(gradient.get(5, 2), Some(&GradientSample::default()));
        assert_eq!(gradient.get(6, 2), None);

        let flipped = GradientField::compute(&vertical_step(size, true)?, ExecutionStrategy::Serial)?;
        let sample = flipped.get(3, 2).copied().unwrap_or_default();
        assert_relative_eq!(sample.direction, PI);

        Ok(())
    }

    #[test]
    fn test_gradient_direction_range() {
        let up = GradientSample::from_derivatives(0.0, 3.0);
        assert_relative_eq!(up.direction, FRAC_PI_2);
        assert_relative_eq!(up.magnitude, 3.0);

        let down = GradientSample::from_derivatives(0.0, -3.0);
        assert_relative_eq!(down.direction, 3.0 * FRAC_PI_2, epsilon = 1e-6);

        let almost_zero = GradientSample::from_derivatives(1.0, -1e-9);
        assert!(almost_zero.direction >= 0.0 && almost_zero.direction < TAU);

        assert_eq!(
            GradientSample::from_derivatives(0.0, 0.0),
            GradientSample::default()
        );
    }

    #[test]
    fn test_gradient_tiny_fields() -> Result<(), HoughError> {
        for (w, h) in [(1, 1), (2, 5), (5, 2)] {
            let field = Image::<f32, 1>::from_size_val([w, h].into(), 3.0)?;
            let gradient = GradientField::compute(&field, ExecutionStrategy::Serial)?;
            assert!(gradient.samples().iter().all(|s| s.magnitude == 0.0));
        }

        let empty = Image::<f32, 1>::new([0, 4].into(), vec![])?;
        assert_eq!(
            GradientField::compute(&empty, ExecutionStrategy::Serial),
            Err(HoughError::EmptyInput)
        );
        Ok(())
    }

    #[test]
    fn test_gradient_serial_matches_parallel() -> Result<(), HoughError> {
        let size = ImageSize {
            width: 31,
            height: 17,
        };
        let data = (0..size.num_pixels())
            .map(|i| ((i * 37) % 101) as f32)
            .collect();
        let field = Image::<f32, 1>::new(size, data)?;

        let serial = GradientField::compute(&field, ExecutionStrategy::Serial)?;
        let parallel = GradientField::compute(&field, ExecutionStrategy::Fixed(3))?;
        assert_eq!(serial, parallel);
        Ok(())
    }
}
