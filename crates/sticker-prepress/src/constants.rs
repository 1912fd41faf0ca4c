//! Shared constants for prepress export
//!
//! Mark sizes are fixed in points and never scale with bleed or product size.

pub use sticker_editor::constants::POINTS_PER_INCH;

// =============================================================================
// Printer's Marks
// =============================================================================

/// Line width for crop marks (points)
pub const CROP_MARK_WIDTH: f64 = 0.25;

/// Length of crop marks (points)
pub const CROP_MARK_LENGTH: f64 = 12.0;

/// Gap between the bleed edge and the start of a crop mark (points)
pub const CROP_MARK_GAP: f64 = 3.0;

/// Blank margin around the bleed box that holds the crop marks (points)
pub const CROP_MARK_MARGIN: f64 = 18.0;

/// Line width for the trim and safe-zone lines (points)
pub const GUIDE_LINE_WIDTH: f64 = 0.5;

/// Dash pattern of the safe-zone line (points)
pub const SAFE_ZONE_DASH: [f64; 2] = [4.0, 2.0];

/// Safe-zone line colour (RGB, 0..1)
pub const SAFE_ZONE_RGB: (f64, f64, f64) = (0.0, 0.4, 1.0);

/// Trim line colour (RGB, 0..1)
pub const TRIM_LINE_RGB: (f64, f64, f64) = (1.0, 0.0, 0.0);

// =============================================================================
// Text
// =============================================================================

/// Distance from the top of a text line to its baseline, relative to the
/// font size (Helvetica ascender)
pub const HELVETICA_ASCENT_RATIO: f64 = 0.718;

// =============================================================================
// Bezier Curve Constants
// =============================================================================

/// Control point factor for approximating circles with Bezier curves.
/// This magic number comes from: 4 * (sqrt(2) - 1) / 3 ≈ 0.552284749831
pub const BEZIER_CIRCLE_FACTOR: f64 = 0.552284749831;

// =============================================================================
// Document
// =============================================================================

/// PDF version written by the exporter
pub const PDF_VERSION: &str = "1.7";

/// Producer string in the document info dictionary
pub const PRODUCER: &str = concat!("sticker-prepress ", env!("CARGO_PKG_VERSION"));
