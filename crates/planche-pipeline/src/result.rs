//! The serialized extraction record consumed by downstream tooling.
//!
//! The JSON shape is a compatibility contract: the reader front-end and
//! the per-page metadata bundler both parse it, so field names
//! (camelCase) and nesting must not drift. Assembly is pure: the
//! caller injects the timestamp so the pipeline stays clock-free and
//! tests stay deterministic.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{Dimensions, Extraction, Panel};

/// Identifier of the extraction algorithm recorded in the output.
pub const ALGORITHM: &str = "contour";

/// Extraction provenance recorded alongside the panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    /// When the extraction ran, serialized as RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    pub extracted_at: OffsetDateTime,
    /// Which algorithm produced the panels (always [`ALGORITHM`]).
    pub algorithm: String,
}

/// The terminal artifact of a page extraction, serialized to the JSON
/// contract:
///
/// ```json
/// {
///   "imagePath": "pages/page2.png",
///   "dimensions": { "width": 800, "height": 1200 },
///   "panels": [ { "id": 0, "x": 10, "y": 10, "width": 380, "height": 580 } ],
///   "metadata": { "extractedAt": "2024-05-01T12:00:00Z", "algorithm": "contour" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelExtractionResult {
    /// The input path as given by the caller.
    pub image_path: String,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
    /// Panels in reading order; ids are exactly `0..N-1`.
    pub panels: Vec<Panel>,
    /// Extraction provenance.
    pub metadata: ExtractionMetadata,
}

impl PanelExtractionResult {
    /// Package an [`Extraction`] into the output record.
    #[must_use]
    pub fn assemble(
        image_path: impl Into<String>,
        extraction: Extraction,
        extracted_at: OffsetDateTime,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            dimensions: extraction.dimensions,
            panels: extraction.panels,
            metadata: ExtractionMetadata {
                extracted_at,
                algorithm: ALGORITHM.to_string(),
            },
        }
    }
}
