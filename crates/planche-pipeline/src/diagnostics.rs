//! Pipeline diagnostics: timing and counts for each extraction stage.
//!
//! Permanent instrumentation for parameter tuning: which stage dominates
//! a slow page, how many contours each stage discards, whether the
//! whole-page fallback fired. The staged entry point
//! [`extract_staged_with_diagnostics`] is the single implementation of
//! the staged pipeline; the un-timed wrappers in the crate root delegate
//! to it with [`NullClock`].
//!
//! Time is injected through the [`Clock`] trait so the crate itself
//! never touches a real clock -- callers pass an `Instant`-backed clock
//! (the CLI does) or a null clock when durations do not matter.
//!
//! Durations are serialized as fractional seconds (`f64`) since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{ExtractError, ExtractorConfig, GrayImage, StagedExtraction};
use crate::{contour, filter, merge, preprocess};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of wall-clock measurements for stage timing.
pub trait Clock {
    /// Opaque instant type produced by [`now`](Self::now).
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// A clock that measures nothing; every duration is zero.
///
/// Used by the un-timed pipeline entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClock;

impl Clock for NullClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::ZERO
    }
}

/// Diagnostics collected from a single extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionDiagnostics {
    /// Stage 1: image decoding + grayscale conversion.
    pub decode: StageDiagnostics,
    /// Stage 2: blur + binarization.
    pub preprocess: StageDiagnostics,
    /// Stage 3: Sobel edge detection.
    pub edge_detection: StageDiagnostics,
    /// Stage 4: flood-fill contour tracing.
    pub contour_tracing: StageDiagnostics,
    /// Stage 5: size filtering.
    pub filtering: StageDiagnostics,
    /// Stage 6: overlap merging.
    pub merging: StageDiagnostics,
    /// Stage 7: reading-order assignment (including the whole-page
    /// fallback when it fires).
    pub ordering: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: ExtractionSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
    },
    /// Blur + binarization metrics.
    Preprocess {
        /// Blur radius applied.
        blur_radius: u32,
        /// Binarization threshold applied.
        threshold: u8,
        /// Foreground pixels (value 255) in the binarized bitmap.
        foreground_pixel_count: u64,
    },
    /// Edge detection metrics.
    EdgeDetection {
        /// Edge pixels (value 255) in the output map.
        edge_pixel_count: u64,
        /// Total pixel count, for computing edge density.
        total_pixel_count: u64,
    },
    /// Contour tracing metrics.
    ContourTracing {
        /// Number of contours surviving the point-count cull.
        contour_count: usize,
        /// Total points across all contours.
        total_point_count: usize,
    },
    /// Size filtering metrics.
    Filtering {
        /// Contours before filtering.
        before: usize,
        /// Contours after filtering.
        after: usize,
    },
    /// Overlap merging metrics.
    Merging {
        /// Contours before merging.
        before: usize,
        /// Contours after merging.
        after: usize,
    },
    /// Reading-order metrics.
    Ordering {
        /// Panels in the final output.
        panel_count: usize,
        /// Whether the whole-page fallback produced the output.
        fallback_applied: bool,
    },
}

/// High-level summary counts for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Contours found by tracing.
    pub contour_count: usize,
    /// Panels in the final output.
    pub panel_count: usize,
    /// Whether the whole-page fallback produced the output.
    pub fallback_applied: bool,
}

impl ExtractionDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Extraction Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}",
            self.summary.image_width, self.summary.image_height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<20} {:>10} {:>9}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages: [(&str, &StageDiagnostics); 7] = [
            ("Decode", &self.decode),
            ("Preprocess", &self.preprocess),
            ("Edge Detection", &self.edge_detection),
            ("Contour Tracing", &self.contour_tracing),
            ("Filtering", &self.filtering),
            ("Merging", &self.merging),
            ("Ordering", &self.ordering),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<20} {ms:>8.3}ms {pct:>8.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Contours: {}  |  Panels: {}{}",
            self.summary.contour_count,
            self.summary.panel_count,
            if self.summary.fallback_applied {
                "  (whole-page fallback)"
            } else {
                ""
            },
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Preprocess {
            blur_radius,
            threshold,
            foreground_pixel_count,
        } => format!("radius={blur_radius} threshold={threshold} fg={foreground_pixel_count}"),
        StageMetrics::EdgeDetection {
            edge_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *edge_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!("edges={edge_pixel_count} ({density:.1}%)")
        }
        StageMetrics::ContourTracing {
            contour_count,
            total_point_count,
        } => format!("{contour_count} contours, {total_point_count} pts"),
        StageMetrics::Filtering { before, after } | StageMetrics::Merging { before, after } => {
            format!("{before} -> {after}")
        }
        StageMetrics::Ordering {
            panel_count,
            fallback_applied,
        } => {
            if *fallback_applied {
                format!("{panel_count} panels (fallback)")
            } else {
                format!("{panel_count} panels")
            }
        }
    }
}

/// Count pixels with value 255 in a grayscale image.
pub(crate) fn count_foreground(image: &GrayImage) -> u64 {
    image.pixels().map(|p| u64::from(p.0[0] == 255)).sum()
}

/// Run the staged pipeline, collecting per-stage diagnostics.
///
/// This is the single implementation of the staged pipeline;
/// [`extract_staged`](crate::extract_staged) delegates here with a
/// [`NullClock`].
///
/// # Errors
///
/// Returns [`ExtractError::EmptyInput`] / [`ExtractError::ImageDecode`]
/// when decoding fails, and [`ExtractError::EdgeMethodUnsupported`] for
/// an unimplemented edge method.
pub fn extract_staged_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &ExtractorConfig,
    clock: &C,
) -> Result<(StagedExtraction, ExtractionDiagnostics), ExtractError> {
    let run_start = clock.now();

    // Decode + grayscale.
    let start = clock.now();
    let decoded = preprocess::decode(image_bytes)?;
    let original = decoded.to_rgba8();
    let grayscale = decoded.to_luma8();
    let dimensions = crate::Dimensions {
        width: grayscale.width(),
        height: grayscale.height(),
    };
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: dimensions.width,
            height: dimensions.height,
        },
    };

    // Blur + binarize.
    let start = clock.now();
    let blurred = preprocess::blur(&grayscale, config.blur_radius);
    let binarized = preprocess::binarize(&blurred, config.threshold);
    let preprocess_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Preprocess {
            blur_radius: config.blur_radius,
            threshold: config.threshold,
            foreground_pixel_count: count_foreground(&binarized),
        },
    };

    // Edge detection.
    let start = clock.now();
    let edges = config.edge_method.detect(&binarized)?;
    let edge_detection = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::EdgeDetection {
            edge_pixel_count: count_foreground(&edges),
            total_pixel_count: u64::from(dimensions.width) * u64::from(dimensions.height),
        },
    };

    // Contour tracing.
    let start = clock.now();
    let traced = contour::trace(&edges);
    let contour_tracing = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::ContourTracing {
            contour_count: traced.len(),
            total_point_count: traced.iter().map(contour::Contour::len).sum(),
        },
    };

    // Size filtering.
    let start = clock.now();
    let filtered = filter::filter_contours(traced.clone(), config, dimensions);
    let filtering = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Filtering {
            before: traced.len(),
            after: filtered.len(),
        },
    };

    // Overlap merging.
    let start = clock.now();
    let merged = merge::merge_overlapping(filtered.clone());
    let merging = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Merging {
            before: filtered.len(),
            after: merged.len(),
        },
    };

    // Reading order (with whole-page fallback).
    let start = clock.now();
    let (panels, fallback_applied) =
        crate::order_or_fallback(&merged, dimensions, config.row_tolerance);
    let ordering = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Ordering {
            panel_count: panels.len(),
            fallback_applied,
        },
    };

    let summary = ExtractionSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        contour_count: traced.len(),
        panel_count: panels.len(),
        fallback_applied,
    };

    let staged = StagedExtraction {
        original,
        grayscale,
        binarized,
        edges,
        traced,
        filtered,
        merged,
        panels,
        dimensions,
    };

    let diagnostics = ExtractionDiagnostics {
        decode,
        preprocess: preprocess_diag,
        edge_detection,
        contour_tracing,
        filtering,
        merging,
        ordering,
        total_duration: clock.elapsed(&run_start),
        summary,
    };

    Ok((staged, diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        assert!((duration_ms(d) - 1234.0).abs() < 0.01);
    }

    #[test]
    fn count_foreground_counts_only_255() {
        let mut img = GrayImage::new(10, 10);
        img.put_pixel(0, 0, image::Luma([255]));
        img.put_pixel(1, 0, image::Luma([254]));
        img.put_pixel(2, 0, image::Luma([255]));
        assert_eq!(count_foreground(&img), 2);
    }

    #[test]
    fn null_clock_measures_zero() {
        let clock = NullClock;
        let instant = clock.now();
        assert_eq!(clock.elapsed(&instant), Duration::ZERO);
    }

    #[test]
    fn report_mentions_every_stage() {
        let stage = |metrics| StageDiagnostics {
            duration: Duration::from_millis(5),
            metrics,
        };
        let diag = ExtractionDiagnostics {
            decode: stage(StageMetrics::Decode {
                input_bytes: 1000,
                width: 100,
                height: 100,
            }),
            preprocess: stage(StageMetrics::Preprocess {
                blur_radius: 2,
                threshold: 127,
                foreground_pixel_count: 5000,
            }),
            edge_detection: stage(StageMetrics::EdgeDetection {
                edge_pixel_count: 500,
                total_pixel_count: 10000,
            }),
            contour_tracing: stage(StageMetrics::ContourTracing {
                contour_count: 10,
                total_point_count: 400,
            }),
            filtering: stage(StageMetrics::Filtering {
                before: 10,
                after: 4,
            }),
            merging: stage(StageMetrics::Merging {
                before: 4,
                after: 3,
            }),
            ordering: stage(StageMetrics::Ordering {
                panel_count: 3,
                fallback_applied: false,
            }),
            total_duration: Duration::from_millis(35),
            summary: ExtractionSummary {
                image_width: 100,
                image_height: 100,
                contour_count: 10,
                panel_count: 3,
                fallback_applied: false,
            },
        };

        let report = diag.report();
        for needle in [
            "Decode",
            "Preprocess",
            "Edge Detection",
            "Contour Tracing",
            "Filtering",
            "Merging",
            "Ordering",
        ] {
            assert!(report.contains(needle), "report missing {needle}");
        }
    }

    #[test]
    fn fallback_is_flagged_in_report() {
        let stage = |metrics| StageDiagnostics {
            duration: Duration::ZERO,
            metrics,
        };
        let diag = ExtractionDiagnostics {
            decode: stage(StageMetrics::Decode {
                input_bytes: 10,
                width: 50,
                height: 50,
            }),
            preprocess: stage(StageMetrics::Preprocess {
                blur_radius: 2,
                threshold: 127,
                foreground_pixel_count: 2500,
            }),
            edge_detection: stage(StageMetrics::EdgeDetection {
                edge_pixel_count: 0,
                total_pixel_count: 2500,
            }),
            contour_tracing: stage(StageMetrics::ContourTracing {
                contour_count: 0,
                total_point_count: 0,
            }),
            filtering: stage(StageMetrics::Filtering {
                before: 0,
                after: 0,
            }),
            merging: stage(StageMetrics::Merging {
                before: 0,
                after: 0,
            }),
            ordering: stage(StageMetrics::Ordering {
                panel_count: 1,
                fallback_applied: true,
            }),
            total_duration: Duration::ZERO,
            summary: ExtractionSummary {
                image_width: 50,
                image_height: 50,
                contour_count: 0,
                panel_count: 1,
                fallback_applied: true,
            },
        };
        assert!(diag.report().contains("whole-page fallback"));
    }

    #[test]
    fn stage_diagnostics_serde_round_trip() {
        let diag = StageDiagnostics {
            duration: Duration::from_millis(12),
            metrics: StageMetrics::Filtering {
                before: 8,
                after: 5,
            },
        };
        let json = serde_json::to_string(&diag).unwrap();
        let deserialized: StageDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.duration, Duration::from_millis(12));
        assert!(matches!(
            deserialized.metrics,
            StageMetrics::Filtering {
                before: 8,
                after: 5,
            },
        ));
    }
}
