//! Printer's marks for exported pages
//!
//! Content stream operations for the crop marks, the dashed safe-zone line
//! and the solid trim line. All geometry comes from the page layout, so the
//! marks line up with the trim box by construction.

use crate::color::num;
use crate::constants::{GUIDE_LINE_WIDTH, SAFE_ZONE_RGB, TRIM_LINE_RGB};
use crate::options::ExportOptions;
use crate::types::{PageLayout, PdfRect};

/// Generate every enabled mark as PDF content stream operations
pub fn generate_marks(layout: &PageLayout, options: &ExportOptions) -> String {
    let mut ops = String::new();

    // Save graphics state
    ops.push_str("q\n");

    if options.draw_safe_zone {
        ops.push_str(&generate_safe_zone(&layout.safe_box, &options.safe_zone_dash));
    }

    if options.draw_trim_line {
        ops.push_str(&generate_trim_line(&layout.trim_box));
    }

    ops.push_str(&generate_crop_marks(layout, options));

    // Restore graphics state
    ops.push_str("Q\n");

    ops
}

/// Dashed rectangle inset from the trim edge by the safe-zone width
fn generate_safe_zone(safe: &PdfRect, dash: &[f64]) -> String {
    let (r, g, b) = SAFE_ZONE_RGB;
    let pattern: Vec<String> = dash.iter().map(|d| num(*d)).collect();
    let mut ops = String::new();
    ops.push_str(&format!("{} {} {} RG\n", num(r), num(g), num(b)));
    ops.push_str(&format!("{} w\n", num(GUIDE_LINE_WIDTH)));
    ops.push_str(&format!("[{}] 0 d\n", pattern.join(" ")));
    ops.push_str(&rect_stroke(safe));
    // Reset to solid line
    ops.push_str("[] 0 d\n");
    ops
}

/// Solid rectangle on the trim boundary
fn generate_trim_line(trim: &PdfRect) -> String {
    let (r, g, b) = TRIM_LINE_RGB;
    let mut ops = String::new();
    ops.push_str(&format!("{} {} {} RG\n", num(r), num(g), num(b)));
    ops.push_str(&format!("{} w\n", num(GUIDE_LINE_WIDTH)));
    ops.push_str("[] 0 d\n");
    ops.push_str(&rect_stroke(trim));
    ops
}

fn rect_stroke(rect: &PdfRect) -> String {
    format!(
        "{} {} {} {} re S\n",
        num(rect.x),
        num(rect.y),
        num(rect.width),
        num(rect.height)
    )
}

/// Crop marks: at each corner, one horizontal and one vertical segment lying
/// on the extension of the trim lines, starting `gap` outside the bleed edge.
fn generate_crop_marks(layout: &PageLayout, options: &ExportOptions) -> String {
    let mut ops = String::new();

    // Registration black, solid
    ops.push_str("0 0 0 RG\n");
    ops.push_str(&format!("{} w\n", num(options.crop_mark_width_pt)));
    ops.push_str("[] 0 d\n");

    for segment in crop_mark_segments(layout, options) {
        ops.push_str(&format!(
            "{} {} m {} {} l S\n",
            num(segment.0),
            num(segment.1),
            num(segment.2),
            num(segment.3)
        ));
    }

    ops
}

/// The eight crop mark segments as `(x1, y1, x2, y2)`, in the order
/// top-left, top-right, bottom-left, bottom-right (horizontal first).
pub fn crop_mark_segments(layout: &PageLayout, options: &ExportOptions) -> Vec<(f64, f64, f64, f64)> {
    let trim = &layout.trim_box;
    let bleed = &layout.bleed_box;
    let gap = options.crop_mark_gap_pt;
    let length = options.crop_mark_length_pt;

    let left_start = bleed.x - gap;
    let right_start = bleed.right() + gap;
    let bottom_start = bleed.y - gap;
    let top_start = bleed.top() + gap;

    vec![
        // Top-left
        (left_start, trim.top(), left_start - length, trim.top()),
        (trim.x, top_start, trim.x, top_start + length),
        // Top-right
        (right_start, trim.top(), right_start + length, trim.top()),
        (trim.right(), top_start, trim.right(), top_start + length),
        // Bottom-left
        (left_start, trim.y, left_start - length, trim.y),
        (trim.x, bottom_start, trim.x, bottom_start - length),
        // Bottom-right
        (right_start, trim.y, right_start + length, trim.y),
        (trim.right(), bottom_start, trim.right(), bottom_start - length),
    ]
}
