//! Size filtering of traced contours.
//!
//! Rejects contours outside plausible panel bounds: too small in either
//! dimension (speckle, lettering, screentone artifacts) or nearly as
//! large as the page itself (the page border traced as one box).

use crate::contour::Contour;
use crate::types::{Dimensions, ExtractorConfig};

/// Keep a contour iff both dimensions are at least
/// `config.min_panel_size` and at most the configured fraction of the
/// page (`max_width_ratio` / `max_height_ratio`).
#[must_use = "returns the surviving contours"]
pub fn filter_contours(
    contours: Vec<Contour>,
    config: &ExtractorConfig,
    dimensions: Dimensions,
) -> Vec<Contour> {
    let max_width = f64::from(dimensions.width) * config.max_width_ratio;
    let max_height = f64::from(dimensions.height) * config.max_height_ratio;

    contours
        .into_iter()
        .filter(|contour| {
            let bounds = contour.bounds();
            bounds.width >= config.min_panel_size
                && bounds.height >= config.min_panel_size
                && f64::from(bounds.width) <= max_width
                && f64::from(bounds.height) <= max_height
        })
        .collect()
}
