//! planche-export: pure debug-visualization serializers (sans-IO).
//!
//! Renders the pipeline's intermediate stage outputs (binarized bitmap,
//! edge map, bounding-box overlays) as PNG byte buffers. All
//! functions return bytes; filesystem interaction lives in the CLI.

pub mod overlay;

pub use overlay::{
    FILTERED_COLOR, PANEL_COLOR, TRACED_COLOR, boxes_to_png, draw_boxes, gray_to_png, rgba_to_png,
};

/// Errors that can occur while serializing debug output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] image::ImageError),
}
