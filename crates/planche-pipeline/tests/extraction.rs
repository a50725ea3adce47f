//! End-to-end extraction tests on synthetic pages.
//!
//! Pages are generated in memory as PNGs: white background (gutter),
//! filled black rectangles (panel artwork). The assertions allow a few
//! pixels of slack on panel geometry since blur and edge detection
//! shift detected boundaries by a pixel or two.

#![allow(clippy::unwrap_used)]

use planche_pipeline::{
    BoundingBox, ExtractError, ExtractorConfig, Panel, RgbaImage, extract, extract_staged,
};

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

/// A white page with filled black rectangles at `(x, y, width, height)`.
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

/// Config sized for the small synthetic pages used here.
fn test_config() -> ExtractorConfig {
    ExtractorConfig {
        min_panel_size: 50,
        ..ExtractorConfig::default()
    }
}

/// Assert a panel's geometry matches the drawn rectangle within a few
/// pixels of edge-detection slack.
fn assert_panel_near(panel: Panel, x: u32, y: u32, width: u32, height: u32) {
    const SLACK: u32 = 4;
    assert!(
        panel.x.abs_diff(x) <= SLACK
            && panel.y.abs_diff(y) <= SLACK
            && panel.width.abs_diff(width) <= SLACK
            && panel.height.abs_diff(height) <= SLACK,
        "panel {panel:?} not within {SLACK}px of ({x}, {y}, {width}, {height})",
    );
}

#[test]
fn four_panel_grid_reads_across_then_down() {
    let png = page_with_rects(
        400,
        400,
        &[
            (20, 20, 100, 100),
            (220, 20, 100, 100),
            (20, 220, 100, 100),
            (220, 220, 100, 100),
        ],
    );
    let extraction = extract(&png, &test_config()).unwrap();
    assert_eq!(extraction.panels.len(), 4);

    assert_panel_near(extraction.panels[0], 20, 20, 100, 100);
    assert_panel_near(extraction.panels[1], 220, 20, 100, 100);
    assert_panel_near(extraction.panels[2], 20, 220, 100, 100);
    assert_panel_near(extraction.panels[3], 220, 220, 100, 100);
}

#[test]
fn tall_panel_beside_stacked_panels_orders_column_first() {
    // Tall left panel spanning the page, two stacked panels to its
    // right: the stacked pair must stay consecutive after the tall one.
    let png = page_with_rects(
        340,
        360,
        &[
            (20, 20, 100, 300),
            (170, 20, 100, 140),
            (170, 180, 100, 140),
        ],
    );
    let extraction = extract(&png, &test_config()).unwrap();
    assert_eq!(extraction.panels.len(), 3);

    assert_panel_near(extraction.panels[0], 20, 20, 100, 300);
    assert_panel_near(extraction.panels[1], 170, 20, 100, 140);
    assert_panel_near(extraction.panels[2], 170, 180, 100, 140);
}

#[test]
fn ids_are_contiguous_from_zero() {
    let png = page_with_rects(
        400,
        400,
        &[
            (20, 20, 100, 100),
            (220, 20, 100, 100),
            (20, 220, 100, 100),
            (220, 220, 100, 100),
        ],
    );
    let extraction = extract(&png, &test_config()).unwrap();
    for (i, panel) in extraction.panels.iter().enumerate() {
        assert_eq!(panel.id as usize, i);
    }
}

#[test]
fn panels_stay_within_image_bounds() {
    let png = page_with_rects(
        400,
        400,
        &[(20, 20, 150, 150), (220, 20, 150, 150), (20, 220, 350, 150)],
    );
    let extraction = extract(&png, &test_config()).unwrap();
    assert!(!extraction.panels.is_empty());
    for panel in &extraction.panels {
        assert!(panel.width > 0 && panel.height > 0);
        assert!(panel.x + panel.width <= extraction.dimensions.width);
        assert!(panel.y + panel.height <= extraction.dimensions.height);
    }
}

#[test]
fn extraction_is_idempotent() {
    let png = page_with_rects(
        400,
        400,
        &[
            (20, 20, 100, 100),
            (220, 20, 100, 100),
            (20, 220, 300, 150),
        ],
    );
    let config = test_config();
    let first = extract(&png, &config).unwrap();
    let second = extract(&png, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn splash_page_yields_single_full_page_panel() {
    let png = page_with_rects(320, 480, &[]);
    let extraction = extract(&png, &ExtractorConfig::default()).unwrap();
    assert_eq!(extraction.panels.len(), 1);
    assert_eq!(extraction.panels[0].id, 0);
    assert_eq!(
        extraction.panels[0].bounds(),
        BoundingBox::new(0, 0, 320, 480),
    );
}

#[test]
fn speckle_noise_is_rejected() {
    // One real panel plus a 10x10 artifact: only the panel survives the
    // 50px minimum size.
    let png = page_with_rects(400, 300, &[(20, 20, 200, 200), (300, 250, 10, 10)]);
    let extraction = extract(&png, &test_config()).unwrap();
    assert_eq!(extraction.panels.len(), 1);
    assert_panel_near(extraction.panels[0], 20, 20, 200, 200);
    for panel in &extraction.panels {
        assert!(panel.width >= 50 && panel.height >= 50);
    }
}

#[test]
fn final_panels_have_bounded_pairwise_overlap() {
    let png = page_with_rects(
        400,
        400,
        &[
            (20, 20, 160, 160),
            (200, 20, 160, 160),
            (20, 200, 340, 160),
        ],
    );
    let extraction = extract(&png, &test_config()).unwrap();
    for (i, a) in extraction.panels.iter().enumerate() {
        for b in &extraction.panels[i + 1..] {
            assert!(
                a.bounds().overlap_ratio(&b.bounds()) <= 0.2,
                "panels {a:?} and {b:?} overlap past the merge bound",
            );
        }
    }
}

#[test]
fn staged_contour_counts_shrink_monotonically() {
    let png = page_with_rects(
        400,
        400,
        &[(20, 20, 150, 150), (220, 20, 150, 150), (20, 220, 350, 150)],
    );
    let staged = extract_staged(&png, &test_config()).unwrap();
    assert!(staged.filtered.len() <= staged.traced.len());
    assert!(staged.merged.len() <= staged.filtered.len());
    assert_eq!(staged.panels.len(), staged.merged.len());
}

#[test]
fn unreadable_input_aborts_with_decode_error() {
    let result = extract(b"not an image", &ExtractorConfig::default());
    assert!(matches!(result, Err(ExtractError::ImageDecode(_))));
}
