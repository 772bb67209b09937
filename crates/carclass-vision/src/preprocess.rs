//! Decode, resize, and normalize uploaded images into model input tensors.

use crate::error::{VisionError, VisionResult};
use candle_core::{Device, Tensor};
use image::{imageops::FilterType, RgbImage};

/// Model input height in pixels.
pub const INPUT_HEIGHT: usize = 224;

/// Model input width in pixels.
pub const INPUT_WIDTH: usize = 224;

/// Model input channel count (RGB).
pub const INPUT_CHANNELS: usize = 3;

/// Decode raw bytes into an RGB pixel grid.
///
/// Any source channel layout (grayscale, RGBA, paletted, ...) is coerced to
/// 3-channel RGB; an alpha channel is dropped rather than composited.
///
/// # Errors
///
/// Returns [`VisionError::Decode`] if the bytes are not a valid image in a
/// supported format.
pub fn decode_rgb(bytes: &[u8]) -> VisionResult<RgbImage> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(decoded.to_rgb8())
}

/// Preprocess an already-decoded RGB image into the classifier input tensor.
///
/// The image is stretch-resized to exactly 224×224 (aspect ratio is not
/// preserved), pixel values are scaled from `0..=255` to `[0, 1]`, and a batch
/// dimension of size 1 is prepended, yielding shape `(1, 224, 224, 3)`.
pub fn preprocess_rgb(image: &RgbImage) -> VisionResult<Tensor> {
    let resized = image::imageops::resize(
        image,
        INPUT_WIDTH as u32,
        INPUT_HEIGHT as u32,
        FilterType::Triangle,
    );

    // Row-major RGB layout matches the (H, W, C) tensor layout directly.
    let pixels: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|p| p as f32 / 255.0)
        .collect();

    Tensor::from_vec(
        pixels,
        (1, INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS),
        &Device::Cpu,
    )
    .map_err(|e| VisionError::tensor(e.to_string()))
}

/// Decode and preprocess image bytes in one step.
///
/// Equivalent to [`decode_rgb`] followed by [`preprocess_rgb`].
pub fn preprocess(bytes: &[u8]) -> VisionResult<Tensor> {
    let image = decode_rgb(bytes)?;
    preprocess_rgb(&image)
}
