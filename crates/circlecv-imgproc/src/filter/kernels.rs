/// Derive the gaussian sigma for a kernel size, the way it is done when no sigma is given.
///
/// sigma = 0.3 * ((kernel_size - 1) * 0.5 - 1) + 0.8
pub fn gaussian_sigma_from_size(kernel_size: usize) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel. A non-positive sigma is derived
///   from the kernel size with [`gaussian_sigma_from_size`].
///
/// # Returns
///
/// A normalized vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        gaussian_sigma_from_size(kernel_size)
    };

    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size as f32 - 1.0) / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create the 3x3 sobel kernel as a separable pair.
///
/// # Returns
///
/// A tuple with the derivative kernel `[-1, 0, 1]` and the smoothing kernel `[1, 2, 1]`.
/// The kernels are not normalized, so a unit step produces a response of 4.
pub fn sobel_kernel3_1d() -> ([f32; 3], [f32; 3]) {
    ([-1.0, 0.0, 1.0], [1.0, 2.0, 1.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sobel_kernel3_1d() {
        let (derivative, smoothing) = sobel_kernel3_1d();
        assert_eq!(derivative, [-1.0, 0.0, 1.0]);
        assert_eq!(smoothing, [1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 0.5);

        let expected = [
            0.00026386508,
            0.10645077,
            0.78657067,
            0.10645077,
            0.00026386508,
        ];

        for (k, e) in kernel.iter().zip(expected.iter()) {
            assert_relative_eq!(k, e, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_gaussian_kernel_derived_sigma() {
        assert_relative_eq!(gaussian_sigma_from_size(3), 0.8);
        assert_relative_eq!(gaussian_sigma_from_size(21), 3.5, epsilon = 1e-6);

        let derived = gaussian_kernel_1d(7, 0.0);
        let explicit = gaussian_kernel_1d(7, gaussian_sigma_from_size(7));
        assert_eq!(derived, explicit);
        assert_relative_eq!(derived.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    }
}
