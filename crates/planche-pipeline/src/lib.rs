//! planche-pipeline: pure comic-page panel extraction (sans-IO).
//!
//! Recovers the panel layout of a scanned comic page from pixel data
//! alone: no markup, irregular grids, panels spanning multiple rows,
//! variable gutters, noisy edges. The pipeline runs
//! grayscale -> blur -> binarize -> Sobel edges -> contour tracing ->
//! size filter -> overlap merge -> reading-order assignment.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. File reading, JSON writing,
//! and debug-image output live in the CLI; timestamps and wall-clock
//! measurements are injected by the caller.
//!
//! Batch processing is the caller's concern: each invocation is
//! independent and side-effect-free, so pages parallelize trivially at
//! the invocation boundary.

pub mod contour;
pub mod diagnostics;
pub mod edge;
pub mod filter;
pub mod merge;
pub mod order;
pub mod preprocess;
pub mod result;
pub mod types;

pub use contour::Contour;
pub use edge::EdgeMethod;
pub use result::{ExtractionMetadata, PanelExtractionResult};
pub use types::{
    BoundingBox, Dimensions, ExtractError, Extraction, ExtractorConfig, GrayImage, Panel, Point,
    RgbaImage, StagedExtraction,
};

/// Run the full extraction pipeline.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration,
/// and produces the ordered panel list plus source dimensions. The
/// intermediate rasters and contour lists are discarded as each stage
/// completes; use [`extract_staged`] when they are needed for debug
/// visualization.
///
/// If no contour survives filtering and merging (a splash page with no
/// internal gutters, or an over-aggressive configuration), the result
/// falls back to a single panel covering the whole page, so a valid
/// extraction always has at least one panel.
///
/// # Errors
///
/// Returns [`ExtractError::EmptyInput`] if `image_bytes` is empty,
/// [`ExtractError::ImageDecode`] if the image cannot be decoded, and
/// [`ExtractError::EdgeMethodUnsupported`] if the configured edge
/// method has no implementation.
pub fn extract(image_bytes: &[u8], config: &ExtractorConfig) -> Result<Extraction, ExtractError> {
    let decoded = preprocess::decode(image_bytes)?;
    let grayscale = decoded.to_luma8();
    let dimensions = Dimensions {
        width: grayscale.width(),
        height: grayscale.height(),
    };

    let blurred = preprocess::blur(&grayscale, config.blur_radius);
    let binarized = preprocess::binarize(&blurred, config.threshold);
    let edges = config.edge_method.detect(&binarized)?;

    let traced = contour::trace(&edges);
    let filtered = filter::filter_contours(traced, config, dimensions);
    let merged = merge::merge_overlapping(filtered);

    let (panels, _) = order_or_fallback(&merged, dimensions, config.row_tolerance);

    Ok(Extraction { dimensions, panels })
}

/// Run the full extraction pipeline, retaining every intermediate stage
/// output for debug visualization.
///
/// Semantics are identical to [`extract`], same stages and same fallback,
/// but the decoded page, binarized bitmap, edge map, and per-stage
/// contour lists are kept alongside the final panels.
///
/// # Errors
///
/// Same as [`extract`].
pub fn extract_staged(
    image_bytes: &[u8],
    config: &ExtractorConfig,
) -> Result<StagedExtraction, ExtractError> {
    let (staged, _) =
        diagnostics::extract_staged_with_diagnostics(image_bytes, config, &diagnostics::NullClock)?;
    Ok(staged)
}

/// Assign reading order to the surviving contours' boxes, falling back
/// to a single whole-page panel when nothing survived.
///
/// Returns the panels and whether the fallback fired.
pub(crate) fn order_or_fallback(
    merged: &[Contour],
    dimensions: Dimensions,
    tolerance: u32,
) -> (Vec<Panel>, bool) {
    let boxes: Vec<BoundingBox> = merged.iter().map(Contour::bounds).collect();
    if boxes.is_empty() {
        tracing::warn!(
            width = dimensions.width,
            height = dimensions.height,
            "no contours survived filtering; treating the whole page as one panel",
        );
        let page = BoundingBox::new(0, 0, dimensions.width, dimensions.height);
        return (order::assign_reading_order(vec![page], tolerance), true);
    }
    (order::assign_reading_order(boxes, tolerance), false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode an RGBA image as PNG bytes.
    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    /// A white page with filled black rectangles at the given
    /// `(x, y, width, height)` positions.
    fn page_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |px, py| {
            let inked = rects
                .iter()
                .any(|&(x, y, w, h)| px >= x && px < x + w && py >= y && py < y + h);
            if inked {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        encode_png(&img)
    }

    fn small_panel_config() -> ExtractorConfig {
        ExtractorConfig {
            min_panel_size: 50,
            ..ExtractorConfig::default()
        }
    }

    #[test]
    fn extract_empty_input() {
        let result = extract(&[], &ExtractorConfig::default());
        assert!(matches!(result, Err(ExtractError::EmptyInput)));
    }

    #[test]
    fn extract_corrupt_input() {
        let result = extract(&[0xFF, 0x00], &ExtractorConfig::default());
        assert!(matches!(result, Err(ExtractError::ImageDecode(_))));
    }

    #[test]
    fn canny_config_is_rejected() {
        let png = page_with_rects(100, 100, &[]);
        let config = ExtractorConfig {
            edge_method: EdgeMethod::Canny,
            ..ExtractorConfig::default()
        };
        let result = extract(&png, &config);
        assert!(matches!(
            result,
            Err(ExtractError::EdgeMethodUnsupported(EdgeMethod::Canny))
        ));
    }

    #[test]
    fn blank_page_falls_back_to_whole_page_panel() {
        let png = page_with_rects(300, 400, &[]);
        let extraction = extract(&png, &ExtractorConfig::default()).unwrap();
        assert_eq!(extraction.panels.len(), 1);
        let panel = extraction.panels[0];
        assert_eq!(panel.id, 0);
        assert_eq!(panel.bounds(), BoundingBox::new(0, 0, 300, 400));
    }

    #[test]
    fn two_panels_side_by_side_are_found_in_order() {
        let png = page_with_rects(400, 200, &[(20, 20, 150, 150), (220, 20, 150, 150)]);
        let extraction = extract(&png, &small_panel_config()).unwrap();
        assert_eq!(extraction.panels.len(), 2);
        assert!(extraction.panels[0].x < extraction.panels[1].x);
        assert_eq!(extraction.panels[0].id, 0);
        assert_eq!(extraction.panels[1].id, 1);
    }

    #[test]
    fn extract_staged_retains_intermediates() {
        let png = page_with_rects(400, 200, &[(20, 20, 150, 150), (220, 20, 150, 150)]);
        let staged = extract_staged(&png, &small_panel_config()).unwrap();
        assert_eq!(staged.dimensions.width, 400);
        assert_eq!(staged.binarized.dimensions(), (400, 200));
        assert_eq!(staged.edges.dimensions(), (400, 200));
        assert!(!staged.traced.is_empty());
        assert_eq!(staged.panels.len(), 2);
    }

    #[test]
    fn staged_and_plain_extraction_agree() {
        let png = page_with_rects(400, 200, &[(20, 20, 150, 150), (220, 20, 150, 150)]);
        let config = small_panel_config();
        let plain = extract(&png, &config).unwrap();
        let staged = extract_staged(&png, &config).unwrap().into_extraction();
        assert_eq!(plain, staged);
    }
}
