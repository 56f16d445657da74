//! Circle detection with the gradient Hough transform.
//!
//! Every interior pixel whose Sobel gradient magnitude reaches `param1 / 2` votes,
//! for each radius of the searched range, for the two centers lying along its
//! gradient line. Cells of the `(x, y, radius)` accumulator gathering at least
//! `param2` votes become candidates, which are then kept strongest first as long
//! as their center stays `min_dist` away from the centers already kept.
//!
//! The input is expected to be grayscale and smoothed, e.g. with
//! [`crate::filter::gaussian_blur`].
//!
//! ```
//! use circlecv_image::Image;
//! use circlecv_imgproc::filter::gaussian_blur;
//! use circlecv_imgproc::hough::{hough_circles, HoughCirclesConfig};
//!
//! let mut disk = Image::<f32, 1>::from_size_val([100, 100].into(), 0.0).unwrap();
//! for y in 0..100usize {
//!     for x in 0..100usize {
//!         if (x as f32 - 50.0).hypot(y as f32 - 50.0) <= 20.0 {
//!             disk.set_pixel(x, y, 0, 255.0).unwrap();
//!         }
//!     }
//! }
//!
//! let mut field = disk.clone();
//! gaussian_blur(&disk, &mut field, (7, 7), (2.0, 2.0)).unwrap();
//!
//! let config = HoughCirclesConfig::new(1.0, 20.0, 50.0, 40.0, 10, 30);
//! let circles = hough_circles(&field, &config).unwrap();
//!
//! assert_eq!(circles.count(), 1);
//! ```

/// Vote storage and casting.
pub mod accumulator;

mod circles;
pub use circles::*;

mod config;
pub use config::*;

/// Edge pixel selection.
pub mod edges;

mod error;
pub use error::HoughError;

/// Per-pixel gradient magnitude and direction.
pub mod gradient;

/// Peak thresholding and suppression.
pub mod peaks;
