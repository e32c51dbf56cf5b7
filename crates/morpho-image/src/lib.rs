#![deny(missing_docs)]
//! Image types and traits for generating and manipulating images

/// image representation for morphological processing.
pub mod image;

/// pixel depths accepted by the morphology engine.
pub mod depth;

/// Error types for the image module.
pub mod error;

pub use crate::depth::{DepthImage, PixelDepth};
pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
