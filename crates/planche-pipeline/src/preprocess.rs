//! Image decoding, grayscale conversion, blur, and binarization.
//!
//! The first pipeline stage: raw image bytes in, a two-level
//! (foreground/background) bitmap out. Grayscale conversion and the
//! Gaussian blur are delegated to the `image`/`imageproc` crates; the
//! binarization rule is local because its boundary behavior is part of
//! the extraction contract.

use image::{DynamicImage, GrayImage};

use crate::types::ExtractError;

/// Decode raw image bytes (PNG, JPEG, BMP, WebP -- whatever the `image`
/// crate can decode).
///
/// # Errors
///
/// Returns [`ExtractError::EmptyInput`] if `bytes` is empty.
/// Returns [`ExtractError::ImageDecode`] if the format is unrecognized
/// or the data is corrupt: the page dimensions cannot be determined,
/// so the whole run aborts.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Apply Gaussian blur to a grayscale page before binarization.
///
/// The radius is used as the Gaussian sigma. A radius of zero returns
/// the image unchanged, since the underlying `imageproc` function
/// panics on non-positive sigma.
#[must_use = "returns the blurred image"]
#[allow(clippy::cast_precision_loss)]
pub fn blur(gray: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return gray.clone();
    }
    imageproc::filter::gaussian_blur_f32(gray, radius as f32)
}

/// Binarize a grayscale image into a two-level bitmap.
///
/// A pixel becomes foreground (255) iff its intensity is **strictly
/// greater** than `threshold`; exact equality maps to background (0).
/// Downstream consumers rely on this boundary rule, so it is tested
/// explicitly.
#[must_use = "returns the binarized bitmap"]
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let intensity = gray.get_pixel(x, y).0[0];
        image::Luma([if intensity > threshold { 255 } else { 0 }])
    })
}
