//! Resize + normalise a decoded image into the classifier's input layout.
//!
//! The shorter edge is scaled to [`CANONICAL_SIZE`] with aspect ratio kept;
//! the longer edge is `floor(CANONICAL_SIZE * long / short)`. Resampling is
//! bilinear (`FilterType::Triangle`), which is deterministic for a given
//! input. Pixels are converted to RGB and scaled from `0..=255` to `[0, 1]`
//! in channel-first `(3, H, W)` order.

use image::imageops::{self, FilterType};
use image::DynamicImage;
use ndarray::Array3;

/// Target length of the shorter image edge.
pub const CANONICAL_SIZE: u32 = 512;

/// Channels in every preprocessed tensor (RGB).
pub const CHANNELS: usize = 3;

/// A single `(C, H, W)` sample, values in `[0, 1]`.
pub type NormalizedTensor = Array3<f32>;

/// Compute `(width, height)` after scaling the shorter edge to `short_edge`.
///
/// Both inputs must be non-zero.
pub fn target_dimensions(width: u32, height: u32, short_edge: u32) -> (u32, u32) {
    let scale = |long: u32, short: u32| -> u32 {
        let scaled = u64::from(short_edge) * u64::from(long) / u64::from(short);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    };
    if width <= height {
        (short_edge, scale(height, width))
    } else {
        (scale(width, height), short_edge)
    }
}

pub fn preprocess(image: &DynamicImage) -> NormalizedTensor {
    let (width, height) = target_dimensions(image.width(), image.height(), CANONICAL_SIZE);
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, width, height, FilterType::Triangle);

    let mut tensor = Array3::<f32>::zeros((CHANNELS, height as usize, width as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for (c, value) in pixel.0.iter().enumerate() {
            tensor[[c, y as usize, x as usize]] = f32::from(*value) / 255.0;
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
        }))
    }

    #[test]
    fn target_dimensions_follow_shorter_edge() {
        assert_eq!(target_dimensions(100, 100, 512), (512, 512));
        assert_eq!(target_dimensions(200, 100, 512), (1024, 512));
        assert_eq!(target_dimensions(100, 300, 512), (512, 1536));
        // floor(512 * 1000 / 768) = 666
        assert_eq!(target_dimensions(1000, 768, 512), (666, 512));
    }

    #[test]
    fn shorter_spatial_edge_is_canonical() {
        for (w, h) in [(1, 1), (3, 5), (640, 480), (480, 640), (1024, 1024), (999, 1000)] {
            let tensor = preprocess(&gradient(w, h));
            let (c, th, tw) = tensor.dim();
            assert_eq!(c, CHANNELS);
            assert_eq!(th.min(tw), CANONICAL_SIZE as usize, "input {w}x{h}");
            let (ew, eh) = target_dimensions(w, h, CANONICAL_SIZE);
            assert_eq!((tw, th), (ew as usize, eh as usize), "input {w}x{h}");
        }
    }

    #[test]
    fn values_lie_in_unit_interval() {
        let tensor = preprocess(&gradient(37, 23));
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn solid_colour_maps_exactly() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 6, Rgb([255, 0, 51])));
        let tensor = preprocess(&img);
        assert!(tensor.index_axis(ndarray::Axis(0), 0).iter().all(|v| *v == 1.0));
        assert!(tensor.index_axis(ndarray::Axis(0), 1).iter().all(|v| *v == 0.0));
        assert!(tensor.index_axis(ndarray::Axis(0), 2).iter().all(|v| (*v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn grayscale_and_alpha_become_three_channels() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(5, 5, Luma([10])));
        assert_eq!(preprocess(&gray).dim().0, 3);

        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 0])));
        assert_eq!(preprocess(&rgba).dim().0, 3);
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let img = gradient(33, 17);
        assert_eq!(preprocess(&img), preprocess(&img));
    }
}
