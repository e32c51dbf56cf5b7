//! Mathematical morphology on single-channel `f32` images.
//!
//! Grayscale operators sample a [`StructuringElement`] neighborhood with edge
//! replication. Binary operators work on strict 0/255 images.

use morpho_image::{Image, ImageError};

/// Error types for the morphological operations.
pub mod error;
pub use error::MorphologyError;

/// Structuring element shapes and generation.
pub mod kernels;
pub use kernels::{ElementShape, StructuringElement, MAX_ELEMENT_SIZE};

mod border;
pub use border::sample_replicate;

/// Grayscale operators and their composites.
pub mod ops;
pub use ops::{
    bottom_hat, close, dilate, erode, erode_bug, gradient, median, open, top_hat, MorphOp,
};

mod binary;
pub use binary::{BACKGROUND, FOREGROUND};

/// Binary thinning.
pub mod skeleton;
pub use skeleton::{skeletonize, skeletonize_and_prune};

/// Binary spur pruning.
pub mod prune;
pub use prune::prune;

pub(crate) fn check_same_size(
    src: &Image<f32, 1>,
    dst: &Image<f32, 1>,
) -> Result<(), MorphologyError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        )
        .into());
    }
    Ok(())
}
