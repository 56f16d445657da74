/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must match have different sizes.
    #[error("Image size ({0}x{1}) does not match the expected size ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel value cannot be cast to the requested type.
    #[error("Failed to cast pixel data to {0}")]
    CastError(String),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel index ({0}, {1}) is out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds for an image with {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the number of histogram bins is not valid.
    #[error("Invalid number of histogram bins: {0}")]
    InvalidHistogramBins(usize),

    /// Error when a filter kernel has an unsupported length.
    #[error("Invalid kernel length: kernel_x {0}, kernel_y {1}")]
    InvalidKernelLength(usize, usize),

    /// Error when the execution backend of an operation fails.
    #[error("Failed to execute the operation: {0}")]
    ExecutionError(String),

    /// Error when an operation needs at least one pixel.
    #[error("Image is empty")]
    EmptyImage,
}
