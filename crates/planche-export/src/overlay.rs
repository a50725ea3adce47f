//! PNG encoding and bounding-box overlay rendering.
//!
//! Everything here is pure: images in, PNG byte buffers out. The CLI
//! decides where (and whether) the results land on disk.

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use planche_pipeline::{BoundingBox, GrayImage, RgbaImage};

use crate::ExportError;

/// Overlay color for every traced contour (magenta).
pub const TRACED_COLOR: image::Rgba<u8> = image::Rgba([255, 0, 255, 255]);
/// Overlay color for contours surviving the size filter (green).
pub const FILTERED_COLOR: image::Rgba<u8> = image::Rgba([0, 200, 0, 255]);
/// Overlay color for the final ordered panels (orange).
pub const PANEL_COLOR: image::Rgba<u8> = image::Rgba([255, 165, 0, 255]);

/// Encode a grayscale stage image (binarized bitmap, edge map) as PNG.
///
/// # Errors
///
/// Returns [`ExportError::PngEncode`] if encoding fails.
pub fn gray_to_png(image: &GrayImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(bytes)
}

/// Encode an RGBA image as PNG.
///
/// # Errors
///
/// Returns [`ExportError::PngEncode`] if encoding fails.
pub fn rgba_to_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Draw hollow rectangles for each box over a copy of the page.
///
/// Strokes are two pixels wide (an outer and an inset rectangle) so
/// they stay visible on high-resolution scans.
#[must_use = "returns the annotated page"]
#[allow(clippy::cast_possible_wrap)]
pub fn draw_boxes(page: &RgbaImage, boxes: &[BoundingBox], color: image::Rgba<u8>) -> RgbaImage {
    let mut canvas = page.clone();
    for b in boxes {
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(b.x as i32, b.y as i32).of_size(b.width, b.height),
            color,
        );
        if b.width > 2 && b.height > 2 {
            draw_hollow_rect_mut(
                &mut canvas,
                Rect::at(b.x as i32 + 1, b.y as i32 + 1).of_size(b.width - 2, b.height - 2),
                color,
            );
        }
    }
    canvas
}

/// [`draw_boxes`] followed by PNG encoding.
///
/// # Errors
///
/// Returns [`ExportError::PngEncode`] if encoding fails.
pub fn boxes_to_png(
    page: &RgbaImage,
    boxes: &[BoundingBox],
    color: image::Rgba<u8>,
) -> Result<Vec<u8>, ExportError> {
    rgba_to_png(&draw_boxes(page, boxes, color))
}
