//! Image classification core.
//!
//! Data flow for one request:
//!
//! ```text
//! bytes / base64 ─► codec ─► DynamicImage ─► preprocess ─► (3, H, W)
//!   ─► batch (1, 3, H, W) ─► Inference::infer ─► [ln p_cat, ln p_dog]
//!   ─► result ─► { label, confidence }
//! ```
//!
//! Nothing here logs, retries or holds state between calls.

pub mod codec;
pub mod pipeline;
pub mod preprocess;
pub mod result;

use thiserror::Error;

pub use codec::MAX_PIXELS;
pub use pipeline::{classify_base64, classify_bytes, classify_image, ClassifyError};
pub use result::{ClassificationResult, Label};

/// The input could not be turned into an image.
#[derive(Debug, Error)]
pub enum InvalidImage {
    #[error("empty image payload")]
    Empty,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unrecognised or corrupt image data: {0}")]
    Format(#[source] image::ImageError),

    #[error("unsupported image dimensions {width}x{height}")]
    Dimensions { width: u32, height: u32 },

    #[error("image too large: {width}x{height} exceeds {max_pixels} pixels")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("unknown output format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}
