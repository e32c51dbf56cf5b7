/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image size is not valid.
    #[error("Invalid image size ({0}, {1}) mismatch ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds {1}")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a pixel value cannot be represented in the target type.
    #[error("Failed to cast image data to {0}")]
    CastError(String),

    /// Error when the pixel format is not one of the supported depths.
    #[error("Only 8-bit, 16-bit, 32-bit float or RGB images are supported, got {bits} bits x {channels} channels")]
    UnsupportedDepth {
        /// Bits per channel of the rejected format.
        bits: u8,
        /// Number of channels of the rejected format.
        channels: u8,
    },

    /// Error when the number of planes does not match the pixel depth.
    #[error("Expected {expected} planes for {depth:?}, got {actual}")]
    InvalidPlaneCount {
        /// Pixel depth being assembled.
        depth: crate::PixelDepth,
        /// Number of planes the depth requires.
        expected: usize,
        /// Number of planes provided.
        actual: usize,
    },
}
