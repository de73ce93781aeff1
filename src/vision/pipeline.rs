//! Classification pipeline: decode → preprocess → batch → infer → result.
//!
//! Stateless and synchronous; callers may run it concurrently against one
//! shared [`Inference`] implementation. Errors from each stage are returned
//! as-is, with no retry.

use image::DynamicImage;
use ndarray::Axis;
use thiserror::Error;

use crate::model::{Inference, ModelError};

use super::codec;
use super::preprocess::{self, CANONICAL_SIZE};
use super::result::{self, ClassificationResult, OutputError};
use super::InvalidImage;

/// Longest edge a preprocessed tensor may have. Caps the aspect ratio of
/// accepted images at 16:1 so a thin strip cannot blow up into a huge tensor.
pub const MAX_TENSOR_EDGE: u32 = CANONICAL_SIZE * 16;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    InvalidImage(#[from] InvalidImage),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("unusable model output: {0}")]
    Output(#[from] OutputError),
}

/// Classify an encoded image file.
pub fn classify_bytes<M>(bytes: &[u8], model: &M) -> Result<ClassificationResult, ClassifyError>
where
    M: Inference + ?Sized,
{
    let image = codec::decode_bytes(bytes)?;
    classify_image(&image, model)
}

/// Classify a base64-encoded image file.
pub fn classify_base64<M>(text: &str, model: &M) -> Result<ClassificationResult, ClassifyError>
where
    M: Inference + ?Sized,
{
    let image = codec::decode_base64(text)?;
    classify_image(&image, model)
}

/// Classify an already decoded image.
pub fn classify_image<M>(
    image: &DynamicImage,
    model: &M,
) -> Result<ClassificationResult, ClassifyError>
where
    M: Inference + ?Sized,
{
    check_dimensions(image)?;
    let batch = preprocess::preprocess(image).insert_axis(Axis(0));
    let output = model.infer(batch.view())?;
    Ok(result::build_result(&output)?)
}

fn check_dimensions(image: &DynamicImage) -> Result<(), InvalidImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(InvalidImage::Dimensions { width, height });
    }
    let (tw, th) = preprocess::target_dimensions(width, height, CANONICAL_SIZE);
    if tw.max(th) > MAX_TENSOR_EDGE {
        return Err(InvalidImage::Dimensions { width, height });
    }
    Ok(())
}
