//! Shared constants for the design editor
//!
//! Every default the editor falls back to lives here so that a missing
//! product field or config value always resolves to a named number.

// =============================================================================
// Print Defaults
// =============================================================================

/// Default product width in inches
pub const DEFAULT_PRINT_WIDTH_IN: f64 = 3.0;

/// Default product height in inches
pub const DEFAULT_PRINT_HEIGHT_IN: f64 = 3.0;

/// Default print resolution
pub const DEFAULT_PRINT_DPI: u32 = 300;

/// Lowest accepted print resolution
pub const MIN_PRINT_DPI: u32 = 72;

/// Highest accepted print resolution
pub const MAX_PRINT_DPI: u32 = 1200;

/// Default bleed width in inches
pub const DEFAULT_BLEED_IN: f64 = 0.125;

/// Default safe-zone inset in inches
pub const DEFAULT_SAFE_ZONE_IN: f64 = 0.125;

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per inch in document space
pub const POINTS_PER_INCH: f64 = 72.0;

// =============================================================================
// Viewport
// =============================================================================

/// Space reserved around the canvas inside its container (pixels, total per axis)
pub const DEFAULT_VIEWPORT_PADDING_PX: f64 = 40.0;

/// Smallest fit scale a canvas may be shrunk to
pub const DEFAULT_MIN_FIT_SCALE: f64 = 0.05;

// =============================================================================
// Guides
// =============================================================================

/// Stroke colour of the trim/bleed guide
pub const BLEED_GUIDE_STROKE: &str = "#ff0000";

/// Stroke colour of the safe-zone guide
pub const SAFE_GUIDE_STROKE: &str = "#0066ff";

/// Guide stroke width in screen pixels
pub const GUIDE_STROKE_WIDTH: f64 = 1.0;

/// Dash pattern of the safe-zone guide in screen pixels
pub const SAFE_GUIDE_DASH: [f64; 2] = [5.0, 5.0];

/// Opacity of the custom die-cut outline overlay
pub const SHAPE_OUTLINE_OPACITY: f64 = 0.3;

// =============================================================================
// History & Autosave
// =============================================================================

/// Maximum number of undo entries kept per session
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Debounce delay before an autosave fires (milliseconds)
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 15_000;

// =============================================================================
// Uploads
// =============================================================================

/// Upload size ceiling (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// MIME types accepted for user images and die-cut shapes
pub const ALLOWED_UPLOAD_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "application/pdf",
];

/// Default canvas background
pub const DEFAULT_BACKGROUND: &str = "#ffffff";
