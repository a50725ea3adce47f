//! planche: extract comic panel layout and reading order from a page.
//!
//! Reads a scanned page image, runs the extraction pipeline, and writes
//! the panel layout JSON consumed by the reader front-end and the
//! per-page metadata bundler.
//!
//! # Usage
//!
//! ```text
//! planche [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Status and warnings go to stderr; the JSON artifact goes to the
//! output file (never stdout), so batch scripts can chain pages and
//! rely on the exit code alone.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use planche_export::ExportError;
use planche_pipeline::diagnostics::{self, Clock};
use planche_pipeline::{
    BoundingBox, Contour, EdgeMethod, ExtractorConfig, Panel, PanelExtractionResult,
    StagedExtraction,
};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// Extract comic panel layout and reading order from a scanned page.
///
/// Panels are detected from pixel data alone and emitted in reading
/// order (left-to-right, top-to-bottom, tolerant of row-spanning
/// panels) as a JSON record.
#[derive(Parser)]
#[command(name = "planche", version)]
struct Cli {
    /// Path to the input page image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Output JSON path. Defaults to the input path with its extension
    /// replaced by `.json`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write intermediate visualization images alongside the output.
    #[arg(long)]
    debug: bool,

    /// Minimum panel width/height in pixels.
    #[arg(long, default_value_t = ExtractorConfig::DEFAULT_MIN_PANEL_SIZE)]
    min_panel_size: u32,

    /// Binarization threshold (0-255); intensities strictly above it
    /// become foreground.
    #[arg(long, default_value_t = ExtractorConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Edge detection method.
    #[arg(long, value_enum, default_value_t = EdgeMethodArg::Sobel)]
    edge_method: EdgeMethodArg,

    /// Gaussian blur radius in pixels (0 disables).
    #[arg(long, default_value_t = ExtractorConfig::DEFAULT_BLUR_RADIUS)]
    blur_radius: u32,

    /// Row/column alignment tolerance in pixels for reading order.
    #[arg(long, default_value_t = ExtractorConfig::DEFAULT_ROW_TOLERANCE)]
    row_tolerance: u32,

    /// Print per-stage timing diagnostics to stderr.
    #[arg(long)]
    timings: bool,
}

/// Edge detection method selection.
#[derive(Clone, Copy, ValueEnum)]
enum EdgeMethodArg {
    /// 3x3 Sobel gradient magnitude (the implemented method).
    Sobel,
    /// Accepted for compatibility; fails with an explicit error.
    Canny,
}

impl EdgeMethodArg {
    /// Map to the pipeline's [`EdgeMethod`].
    const fn into_pipeline(self) -> EdgeMethod {
        match self {
            Self::Sobel => EdgeMethod::Sobel,
            Self::Canny => EdgeMethod::Canny,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ExtractorConfig {
        blur_radius: cli.blur_radius,
        threshold: cli.threshold,
        edge_method: cli.edge_method.into_pipeline(),
        min_panel_size: cli.min_panel_size,
        row_tolerance: cli.row_tolerance,
        ..ExtractorConfig::default()
    };

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.image_path.with_extension("json"));

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    // The staged path keeps intermediates alive; only pay for it when
    // diagnostics or debug images were requested.
    let extraction = if cli.debug || cli.timings {
        match diagnostics::extract_staged_with_diagnostics(&image_bytes, &config, &StdClock) {
            Ok((staged, diag)) => {
                if cli.timings {
                    eprintln!("{}", diag.report());
                }
                if cli.debug {
                    write_debug_images(&staged, &output_path);
                }
                staged.into_extraction()
            }
            Err(e) => {
                eprintln!("Error extracting {}: {e}", cli.image_path.display());
                return ExitCode::FAILURE;
            }
        }
    } else {
        match planche_pipeline::extract(&image_bytes, &config) {
            Ok(extraction) => extraction,
            Err(e) => {
                eprintln!("Error extracting {}: {e}", cli.image_path.display());
                return ExitCode::FAILURE;
            }
        }
    };

    let panel_count = extraction.panels.len();
    let result = PanelExtractionResult::assemble(
        cli.image_path.display().to_string(),
        extraction,
        OffsetDateTime::now_utc(),
    );

    let mut json = match serde_json::to_string_pretty(&result) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing result: {e}");
            return ExitCode::FAILURE;
        }
    };
    json.push('\n');

    if let Err(e) = std::fs::write(&output_path, json) {
        eprintln!("Error writing {}: {e}", output_path.display());
        return ExitCode::FAILURE;
    }

    tracing::info!(
        panels = panel_count,
        output = %output_path.display(),
        "extraction complete",
    );
    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Write the five stage visualizations next to the JSON output.
///
/// Best-effort diagnostic output: an image that fails to encode or
/// write is logged and skipped, never fatal to the extraction.
fn write_debug_images(staged: &StagedExtraction, output_path: &Path) {
    fn bounds(contours: &[Contour]) -> Vec<BoundingBox> {
        contours.iter().map(Contour::bounds).collect()
    }
    let panel_bounds: Vec<BoundingBox> = staged.panels.iter().map(Panel::bounds).collect();

    let images: [(&str, Result<Vec<u8>, ExportError>); 5] = [
        ("binarized", planche_export::gray_to_png(&staged.binarized)),
        ("edges", planche_export::gray_to_png(&staged.edges)),
        (
            "contours",
            planche_export::boxes_to_png(
                &staged.original,
                &bounds(&staged.traced),
                planche_export::TRACED_COLOR,
            ),
        ),
        (
            "filtered",
            planche_export::boxes_to_png(
                &staged.original,
                &bounds(&staged.filtered),
                planche_export::FILTERED_COLOR,
            ),
        ),
        (
            "panels",
            planche_export::boxes_to_png(&staged.original, &panel_bounds, planche_export::PANEL_COLOR),
        ),
    ];

    for (suffix, encoded) in images {
        let path = debug_image_path(output_path, suffix);
        match encoded {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&path, bytes) {
                    tracing::warn!("failed to write debug image {}: {e}", path.display());
                } else {
                    tracing::debug!("wrote debug image {}", path.display());
                }
            }
            Err(e) => tracing::warn!("failed to encode {suffix} debug image: {e}"),
        }
    }
}

/// `page.json` + `edges` -> `page-edges.png`, alongside the output.
fn debug_image_path(output_path: &Path, suffix: &str) -> PathBuf {
    let mut name = output_path
        .file_stem()
        .unwrap_or_else(|| OsStr::new("page"))
        .to_os_string();
    name.push(format!("-{suffix}.png"));
    output_path.with_file_name(name)
}
