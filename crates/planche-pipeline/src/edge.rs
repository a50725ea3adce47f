//! Sobel edge detection over the binarized page bitmap.
//!
//! Produces a binary edge map (255 = edge, 0 = background) marking the
//! boundaries between panel artwork and gutters. The gradient kernels
//! are written out by hand rather than borrowed from an image library:
//! the exact interior-only sweep and the fixed magnitude threshold are
//! part of the extraction contract, and the whole operator is ~30 lines.

use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::ExtractError;

/// Gradient magnitude above which a pixel is marked as an edge.
///
/// Deliberately not a tunable: the binarized input only contains 0/255
/// steps, whose gradient magnitudes dwarf this value, so in practice it
/// only suppresses the zero-gradient interior.
pub const MAGNITUDE_THRESHOLD: f64 = 50.0;

/// Selects which edge detection algorithm to use.
///
/// `Canny` is accepted wherever an [`EdgeMethod`] is parsed (existing
/// batch scripts pass it) but has no implementation and fails fast
/// instead of silently behaving like Sobel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeMethod {
    /// 3x3 Sobel gradient magnitude with a fixed threshold.
    #[default]
    Sobel,
    /// Not implemented; selecting it returns
    /// [`ExtractError::EdgeMethodUnsupported`].
    Canny,
}

impl fmt::Display for EdgeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sobel => f.write_str("sobel"),
            Self::Canny => f.write_str("canny"),
        }
    }
}

impl EdgeMethod {
    /// Compute the binary edge map for a binarized bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::EdgeMethodUnsupported`] for
    /// [`EdgeMethod::Canny`].
    pub fn detect(self, bitmap: &GrayImage) -> Result<GrayImage, ExtractError> {
        match self {
            Self::Sobel => Ok(sobel(bitmap)),
            Self::Canny => Err(ExtractError::EdgeMethodUnsupported(self)),
        }
    }
}

/// Sobel gradient-magnitude edge detection.
///
/// For every interior pixel, the horizontal and vertical gradients are
/// computed with the 3x3 kernels
///
/// ```text
/// Gx: [-1 0 1]    Gy: [-1 -2 -1]
///     [-2 0 2]        [ 0  0  0]
///     [-1 0 1]        [ 1  2  1]
/// ```
///
/// and the pixel is marked as an edge iff `sqrt(Gx^2 + Gy^2)` exceeds
/// [`MAGNITUDE_THRESHOLD`]. Border pixels are excluded and stay 0.
#[must_use = "returns the binary edge map"]
pub fn sobel(bitmap: &GrayImage) -> GrayImage {
    let (width, height) = bitmap.dimensions();
    let mut edges = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return edges;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let px = |ox: u32, oy: u32| i32::from(bitmap.get_pixel(ox, oy).0[0]);

            let gx = -px(x - 1, y - 1) + px(x + 1, y - 1) - 2 * px(x - 1, y)
                + 2 * px(x + 1, y)
                - px(x - 1, y + 1)
                + px(x + 1, y + 1);
            let gy = -px(x - 1, y - 1) - 2 * px(x, y - 1) - px(x + 1, y - 1)
                + px(x - 1, y + 1)
                + 2 * px(x, y + 1)
                + px(x + 1, y + 1);

            let magnitude = f64::from(gx * gx + gy * gy).sqrt();
            if magnitude > MAGNITUDE_THRESHOLD {
                edges.put_pixel(x, y, image::Luma([255]));
            }
        }
    }

    edges
}
