use morpho_image::ImageError;

/// Errors related to morphological operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MorphologyError {
    /// The underlying image buffers are invalid or mismatched.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The requested structuring element cannot be generated.
    #[error("Undefined structuring element: {0}")]
    UndefinedElement(String),

    /// The input of a binary operation is not a strict 0/255 image.
    #[error("Only binary image (0/255) supported: {0}")]
    NotBinary(String),

    /// The operation name does not match any morphological operator.
    #[error("Unknown morphological operation: {0}")]
    UnknownOperation(String),
}
