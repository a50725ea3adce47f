//! Shared types for the planche panel extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::contour::Contour;
use crate::edge::EdgeMethod;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference the
/// original decoded page without depending on `image` directly.
pub use image::RgbaImage;

/// An integer pixel coordinate in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from the left edge).
    pub x: u32,
    /// Vertical position (pixels from the top edge).
    pub y: u32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in original image pixel space.
///
/// Invariant for boxes produced by the pipeline: `width > 0`,
/// `height > 0`, and the box lies entirely within the source image
/// (`x + width <= image width`, `y + height <= image height`). Boxes
/// derived from traced pixels satisfy this by construction; unions of
/// in-bounds boxes remain in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Create a new bounding box.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the right edge (`x + width`).
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom edge (`y + height`).
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Area in square pixels.
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Area of the intersection with `other`, zero when disjoint.
    #[must_use]
    pub fn intersection_area(&self, other: &Self) -> u64 {
        let left = self.x.max(other.x);
        let right = self.right().min(other.right());
        let top = self.y.max(other.y);
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return 0;
        }
        u64::from(right - left) * u64::from(bottom - top)
    }

    /// Intersection area as a fraction of the smaller of the two boxes.
    ///
    /// A fully nested box yields 1.0 regardless of how large the outer
    /// box is, which is what makes this the right measure for collapsing
    /// duplicate/nested detections.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn overlap_ratio(&self, other: &Self) -> f64 {
        let smaller = self.area().min(other.area());
        if smaller == 0 {
            return 0.0;
        }
        self.intersection_area(other) as f64 / smaller as f64
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

/// Source image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// One panel of a comic page in reading order.
///
/// `id` is the 0-based reading-order index; ids in a page's final panel
/// list are unique and contiguous (`0..N-1`). The geometry is inherited
/// unchanged from the surviving contour's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    /// Reading-order index, 0-based.
    pub id: u32,
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Panel {
    /// Create a panel from a reading-order id and a bounding box.
    #[must_use]
    pub const fn from_bounds(id: u32, bounds: BoundingBox) -> Self {
        Self {
            id,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        }
    }

    /// The panel's geometry as a [`BoundingBox`].
    #[must_use]
    pub const fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

/// Configuration for the panel extraction pipeline.
///
/// All parameters have defaults matching the shipped CLI surface. The
/// `DEFAULT_*` constants are the single source of truth; the CLI
/// references them for its flag defaults so the two cannot diverge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Gaussian blur radius in pixels, applied before binarization.
    /// Zero disables the blur.
    pub blur_radius: u32,

    /// Binarization threshold (0-255). Pixels with intensity strictly
    /// greater than this become foreground (255); everything else,
    /// including exact equality, becomes background (0).
    pub threshold: u8,

    /// Which edge detection method to use.
    pub edge_method: EdgeMethod,

    /// Minimum panel width and height in pixels. Contours smaller than
    /// this in either dimension are rejected as noise.
    pub min_panel_size: u32,

    /// Maximum panel width as a fraction of the image width. Contours
    /// wider than this are rejected as whole-page false detections
    /// (typically the page border itself).
    pub max_width_ratio: f64,

    /// Maximum panel height as a fraction of the image height.
    pub max_height_ratio: f64,

    /// Row/column alignment tolerance in pixels for reading-order
    /// grouping. Gutter widths vary with scan resolution, so this must
    /// stay configurable.
    pub row_tolerance: u32,
}

impl ExtractorConfig {
    /// Default Gaussian blur radius in pixels.
    pub const DEFAULT_BLUR_RADIUS: u32 = 2;
    /// Default binarization threshold.
    pub const DEFAULT_THRESHOLD: u8 = 127;
    /// Default minimum panel dimension in pixels.
    pub const DEFAULT_MIN_PANEL_SIZE: u32 = 300;
    /// Default maximum panel width as a fraction of image width.
    pub const DEFAULT_MAX_WIDTH_RATIO: f64 = 0.95;
    /// Default maximum panel height as a fraction of image height.
    pub const DEFAULT_MAX_HEIGHT_RATIO: f64 = 0.95;
    /// Default row/column alignment tolerance in pixels.
    pub const DEFAULT_ROW_TOLERANCE: u32 = 20;
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            blur_radius: Self::DEFAULT_BLUR_RADIUS,
            threshold: Self::DEFAULT_THRESHOLD,
            edge_method: EdgeMethod::default(),
            min_panel_size: Self::DEFAULT_MIN_PANEL_SIZE,
            max_width_ratio: Self::DEFAULT_MAX_WIDTH_RATIO,
            max_height_ratio: Self::DEFAULT_MAX_HEIGHT_RATIO,
            row_tolerance: Self::DEFAULT_ROW_TOLERANCE,
        }
    }
}

/// Final output of the extraction pipeline: the ordered panel list plus
/// the source image dimensions needed by downstream consumers (reader
/// zoom transforms, metadata bundles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
    /// Panels in reading order; `panels[i].id == i`.
    pub panels: Vec<Panel>,
}

/// Result of running the pipeline with all intermediate stage outputs
/// preserved, for debug visualization.
///
/// Does not implement serde: unlike [`Extraction`] this never crosses a
/// process boundary, and the raster intermediates would dominate any
/// serialized form.
#[derive(Debug, Clone)]
pub struct StagedExtraction {
    /// Original decoded RGBA page (overlay canvas for visualizations).
    pub original: RgbaImage,
    /// Grayscale conversion of the page.
    pub grayscale: GrayImage,
    /// Blurred + binarized bitmap (255 foreground / 0 background).
    pub binarized: GrayImage,
    /// Binary Sobel edge map.
    pub edges: GrayImage,
    /// Every contour the flood fill produced.
    pub traced: Vec<Contour>,
    /// Contours surviving the size filter.
    pub filtered: Vec<Contour>,
    /// Contours after overlap merging.
    pub merged: Vec<Contour>,
    /// Final panels in reading order (includes the whole-page fallback
    /// panel when nothing survived).
    pub panels: Vec<Panel>,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

impl StagedExtraction {
    /// Discard the intermediates, keeping only the final output.
    #[must_use]
    pub fn into_extraction(self) -> Extraction {
        Extraction {
            dimensions: self.dimensions,
            panels: self.panels,
        }
    }
}

/// Errors that can occur during panel extraction.
///
/// Only these abort a run; a page where no panels survive filtering is
/// not an error (the orchestrator falls back to a whole-page panel).
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The requested edge detection method is accepted by the interface
    /// but has no implementation.
    #[error("edge detection method `{0}` is not implemented")]
    EdgeMethodUnsupported(EdgeMethod),
}
