//! Error types for the carclass-vision crate.

use thiserror::Error;

/// Result type alias for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while preparing an image for inference.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The input bytes are not a valid or supported image.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Tensor construction from the pixel buffer failed.
    #[error("Failed to build input tensor: {0}")]
    Tensor(String),
}

impl VisionError {
    /// Create a tensor construction error.
    pub fn tensor(msg: impl Into<String>) -> Self {
        Self::Tensor(msg.into())
    }
}
