//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Decoded samples are
//! scaled to `[0, 1]` so the patch normalizer sees the same range regardless
//! of the source bit depth.

use crate::field::ScoreField;
use crate::image::OwnedImage;
use crate::util::{StereoCorrError, StereoCorrResult};
use std::path::Path;

fn io_err(err: image::ImageError) -> StereoCorrError {
    StereoCorrError::ImageIo {
        reason: err.to_string(),
    }
}

/// Converts a dynamic image to a single-channel `f32` image.
pub fn gray_f32_from_dynamic(img: &image::DynamicImage) -> StereoCorrResult<OwnedImage<f32>> {
    let gray = img.to_luma32f();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height, 1)
}

/// Converts a dynamic image to an interleaved RGB `f32` image.
pub fn rgb_f32_from_dynamic(img: &image::DynamicImage) -> StereoCorrResult<OwnedImage<f32>> {
    let rgb = img.to_rgb32f();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    OwnedImage::new(rgb.into_raw(), width, height, 3)
}

/// Loads an image from disk as single-channel `f32` in `[0, 1]`.
pub fn load_gray_f32<P: AsRef<Path>>(path: P) -> StereoCorrResult<OwnedImage<f32>> {
    let img = image::open(path).map_err(io_err)?;
    gray_f32_from_dynamic(&img)
}

/// Loads an image from disk as RGB `f32` in `[0, 1]`.
pub fn load_rgb_f32<P: AsRef<Path>>(path: P) -> StereoCorrResult<OwnedImage<f32>> {
    let img = image::open(path).map_err(io_err)?;
    rgb_f32_from_dynamic(&img)
}

/// Saves a score field as 8-bit grayscale, mapping `[-1, 1]` to `[0, 255]`.
pub fn save_score_map<P: AsRef<Path>>(scores: &ScoreField, path: P) -> StereoCorrResult<()> {
    if scores.cell_len() != 1 {
        return Err(StereoCorrError::InvalidCellLength {
            expected: 1,
            got: scores.cell_len(),
        });
    }
    let width = u32::try_from(scores.width()).map_err(|_| StereoCorrError::InvalidDimensions {
        width: scores.width(),
        height: scores.height(),
    })?;
    let height =
        u32::try_from(scores.height()).map_err(|_| StereoCorrError::InvalidDimensions {
            width: scores.width(),
            height: scores.height(),
        })?;
    let pixels = scores
        .data()
        .iter()
        .map(|&s| ((s.clamp(-1.0, 1.0) + 1.0) * 127.5).round() as u8)
        .collect();
    let buffer = image::GrayImage::from_raw(width, height, pixels)
        .ok_or(StereoCorrError::InvalidInput("score buffer does not match its shape"))?;
    buffer.save(path).map_err(io_err)
}
