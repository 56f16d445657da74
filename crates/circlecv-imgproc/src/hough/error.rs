use circlecv_image::ImageError;

use crate::parallel::ParallelError;

/// Errors raised by the circle detector.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum HoughError {
    /// A configuration value is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending field.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The input field has zero width or height.
    #[error("input field is empty")]
    EmptyInput,

    /// The accumulator would need more memory than allowed.
    #[error("accumulator needs {required} bytes, limit is {limit} bytes")]
    ResourceLimitExceeded {
        /// Estimated footprint in bytes, `usize::MAX` when it overflows.
        required: usize,
        /// Configured ceiling in bytes.
        limit: usize,
    },

    /// Failure in an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Failure in the thread pool.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}

impl HoughError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        HoughError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
