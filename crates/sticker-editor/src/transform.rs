//! Coordinate transforms between print, screen, and document space
//!
//! - print space: inches × DPI, full-resolution device pixels
//! - screen space: print pixels × fit scale, the on-screen canvas
//! - document space: 72 points per inch, the output PDF
//!
//! Every function here is pure. Screen pixels are always derived as
//! `inches × dpi × fit_scale` so guides, content, and export never disagree.

use crate::constants::{DEFAULT_MIN_FIT_SCALE, DEFAULT_VIEWPORT_PADDING_PX, POINTS_PER_INCH};
use crate::print_spec::PrintSpecification;
use serde::{Deserialize, Serialize};

/// How the print area is fitted into the on-screen container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportFit {
    pub fit_scale: f64,
    pub display_width_px: f64,
    pub display_height_px: f64,
}

impl ViewportFit {
    /// Fit the print area into a container using the default padding and
    /// minimum scale.
    pub fn compute(spec: &PrintSpecification, container_w: f64, container_h: f64) -> Self {
        Self::compute_with(
            spec,
            container_w,
            container_h,
            DEFAULT_VIEWPORT_PADDING_PX,
            DEFAULT_MIN_FIT_SCALE,
        )
    }

    /// Fit the print area into a container.
    ///
    /// The scale never exceeds 1 (the canvas is never larger than the print
    /// resolution) and never drops below `min_scale`, so a tiny or collapsed
    /// container cannot produce a zero-sized canvas.
    pub fn compute_with(
        spec: &PrintSpecification,
        container_w: f64,
        container_h: f64,
        padding_px: f64,
        min_scale: f64,
    ) -> Self {
        let scale_x = (container_w - padding_px) / spec.print_width_px();
        let scale_y = (container_h - padding_px) / spec.print_height_px();
        let mut fit = scale_x.min(scale_y).min(1.0);
        if !fit.is_finite() {
            fit = min_scale;
        }
        Self::with_scale_clamped(spec, fit, min_scale)
    }

    /// Explicit zoom level, clamped to the default minimum scale
    pub fn with_scale(spec: &PrintSpecification, fit_scale: f64) -> Self {
        Self::with_scale_clamped(spec, fit_scale, DEFAULT_MIN_FIT_SCALE)
    }

    fn with_scale_clamped(spec: &PrintSpecification, fit_scale: f64, min_scale: f64) -> Self {
        let fit_scale = if fit_scale.is_finite() {
            fit_scale.max(min_scale)
        } else {
            min_scale
        };
        Self {
            fit_scale,
            display_width_px: to_screen_px(spec.print_width_in, spec, fit_scale),
            display_height_px: to_screen_px(spec.print_height_in, spec, fit_scale),
        }
    }

    /// Screen pixels per physical inch at this fit
    pub fn px_per_inch(&self, spec: &PrintSpecification) -> f64 {
        spec.print_dpi as f64 * self.fit_scale
    }
}

/// Convert a physical length to screen pixels
pub fn to_screen_px(inches: f64, spec: &PrintSpecification, fit_scale: f64) -> f64 {
    inches * spec.print_dpi as f64 * fit_scale
}

/// Convert a screen-space coordinate to document points.
///
/// `display_px` is the display width the coordinate was measured against; it
/// is used to undo the fit scale before converting print pixels to points.
/// A zero or non-finite width reads the coordinate as print pixels.
pub fn to_document_points(px: f64, spec: &PrintSpecification, display_px: f64) -> f64 {
    DocumentScale::for_canvas(spec, Some(display_px)).apply(px)
}

/// Single screen-pixel to document-point factor for one recorded canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentScale {
    pub points_per_px: f64,
}

impl DocumentScale {
    /// Factor for a canvas recorded at `display_width_px`. A missing or
    /// degenerate width means the coordinates are full-resolution print pixels.
    pub fn for_canvas(spec: &PrintSpecification, display_width_px: Option<f64>) -> Self {
        let fit_scale = display_width_px
            .filter(|w| w.is_finite() && *w > 0.0)
            .map(|w| w / spec.print_width_px())
            .unwrap_or(1.0);
        let screen_px_per_inch = spec.print_dpi as f64 * fit_scale;
        Self {
            points_per_px: POINTS_PER_INCH / screen_px_per_inch,
        }
    }

    pub fn apply(&self, px: f64) -> f64 {
        px * self.points_per_px
    }
}
