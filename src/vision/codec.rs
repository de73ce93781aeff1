//! Image decoding from untrusted bytes or base64 text, and base64 encoding.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits};

use super::InvalidImage;

/// Largest image accepted for decoding, in pixels (about 9459x9459).
/// Checked against the header before any pixel buffer is allocated.
pub const MAX_PIXELS: u64 = 89_478_485;

/// Parse a complete encoded image file (PNG, JPEG, GIF, BMP, WebP).
pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, InvalidImage> {
    decode_bytes_within(bytes, MAX_PIXELS)
}

/// [`decode_bytes`] with an explicit pixel budget.
pub(crate) fn decode_bytes_within(
    bytes: &[u8],
    max_pixels: u64,
) -> Result<DynamicImage, InvalidImage> {
    if bytes.is_empty() {
        return Err(InvalidImage::Empty);
    }

    let (width, height) = reader(bytes)?
        .into_dimensions()
        .map_err(InvalidImage::Format)?;
    if width == 0 || height == 0 {
        return Err(InvalidImage::Dimensions { width, height });
    }
    if u64::from(width) * u64::from(height) > max_pixels {
        return Err(InvalidImage::TooLarge {
            width,
            height,
            max_pixels,
        });
    }

    // Pin the decoder to the header's size so no frame can grow past it.
    let mut limits = Limits::default();
    limits.max_image_width = Some(width);
    limits.max_image_height = Some(height);

    let mut reader = reader(bytes)?;
    reader.limits(limits);
    reader.decode().map_err(InvalidImage::Format)
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, InvalidImage> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| InvalidImage::Format(ImageError::IoError(e)))
}

/// Base64-decode `text`, then parse it like [`decode_bytes`].
///
/// Surrounding whitespace, embedded line breaks and a leading
/// `data:<mime>;base64,` prefix are accepted.
pub fn decode_base64(text: &str) -> Result<DynamicImage, InvalidImage> {
    let bytes = STANDARD.decode(strip_envelope(text).as_bytes())?;
    decode_bytes(&bytes)
}

/// Encode `image` in `format` (a name such as `"PNG"` or `"jpeg"`) and
/// return it as standard base64.
pub fn encode_base64(image: &DynamicImage, format: &str) -> Result<String, InvalidImage> {
    let fmt = ImageFormat::from_extension(format.to_ascii_lowercase())
        .ok_or_else(|| InvalidImage::UnsupportedFormat(format.to_string()))?;
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), fmt)
        .map_err(InvalidImage::Encode)?;
    Ok(STANDARD.encode(buf))
}

/// [`encode_base64`] with the default PNG container.
pub fn encode_png_base64(image: &DynamicImage) -> Result<String, InvalidImage> {
    encode_base64(image, "PNG")
}

fn strip_envelope(text: &str) -> String {
    let trimmed = text.trim();
    let payload = match trimmed.split_once(',') {
        Some((head, rest)) if head.starts_with("data:") && head.ends_with(";base64") => rest,
        _ => trimmed,
    };
    payload.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}
