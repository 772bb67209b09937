//! Image preprocessing for the carclass classifier.
//!
//! This crate turns uploaded image bytes into the fixed-shape input tensor the
//! classifier expects. The pipeline is:
//!
//! 1. Decode the bytes into a pixel grid (any format the `image` crate
//!    supports).
//! 2. Coerce to 3-channel RGB, dropping alpha if present.
//! 3. Stretch-resize to exactly 224×224. Aspect ratio is NOT preserved.
//! 4. Normalize u8 pixel values to `[0, 1]` by dividing by 255.
//! 5. Prepend a batch dimension of size 1.
//!
//! Everything here is a pure function of its input bytes; no side effects.
//!
//! # Example
//!
//! ```no_run
//! use carclass_vision::preprocess;
//!
//! # fn example(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let tensor = preprocess(bytes)?;
//! assert_eq!(tensor.dims(), &[1, 224, 224, 3]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod preprocess;

pub use error::{VisionError, VisionResult};
pub use preprocess::{
    decode_rgb, preprocess, preprocess_rgb, INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH,
};
