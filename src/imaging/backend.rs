//! Image codec backend trait and its error type.
//!
//! The [`ImageBackend`] trait is the seam between pipeline logic and file
//! formats: decode a source, encode a still, encode the shared animated GIF.
//! Pixel work (crop, resize, composite, text) happens on in-memory
//! [`DynamicImage`]s in [`operations`](super::operations) and never needs a
//! backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{GifParams, Quality};
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image codec backends.
pub trait ImageBackend {
    /// Decode an image file.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode an image, choosing the format from the path's extension.
    fn save(&self, image: &DynamicImage, path: &Path, quality: Quality)
    -> Result<(), BackendError>;

    /// Encode `frames` as one looping animated GIF.
    fn save_gif(&self, frames: Vec<DynamicImage>, params: &GifParams) -> Result<(), BackendError>;
}
