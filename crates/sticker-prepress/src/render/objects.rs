//! Scene objects as PDF drawing operators
//!
//! Each object is drawn in its own graphics state whose origin is the
//! object's top-left corner, so rotation and opacity never leak between
//! objects. Screen pixels become points through one `DocumentScale`.

use super::resources::PageResources;
use crate::color::{Rgba, num, parse_color};
use crate::constants::{BEZIER_CIRCLE_FACTOR, HELVETICA_ASCENT_RATIO};
use crate::types::PdfRect;
use sticker_editor::{DocumentScale, ObjectKind, SceneObject, Style, TEXT_LINE_HEIGHT};

/// Where and at what scale scene content lands on the page
#[derive(Debug, Clone, Copy)]
pub struct DrawContext {
    pub scale: DocumentScale,
    /// Trim box; screen (0, 0) maps to its top-left corner
    pub trim: PdfRect,
}

/// Draw objects bottom to top. Images are left to the flattened raster path.
pub fn draw_objects(
    objects: &[SceneObject],
    ctx: &DrawContext,
    resources: &mut PageResources,
) -> String {
    objects
        .iter()
        .filter_map(|object| draw_object(object, ctx, resources))
        .collect()
}

fn draw_object(object: &SceneObject, ctx: &DrawContext, resources: &mut PageResources) -> Option<String> {
    let s = &ctx.scale;
    let body = match &object.kind {
        ObjectKind::Rect { width, height } => {
            let w = s.apply(width * object.scale_x);
            let h = s.apply(height * object.scale_y);
            let path = format!("0 {} {} {} re\n", num(-h), num(w), num(h));
            paint(&path, object, s)
        }
        ObjectKind::Ellipse { radius } => {
            let rx = s.apply(radius * object.scale_x);
            let ry = s.apply(radius * object.scale_y);
            paint(&ellipse_path(rx, -ry, rx, ry), object, s)
        }
        ObjectKind::Text {
            text, font_size, ..
        } => draw_text(text, *font_size, object, s, resources),
        ObjectKind::Image { src, .. } => {
            log::debug!(
                "Skipping image object ({}); only a flattened raster is embedded",
                src.as_deref().unwrap_or("no src")
            );
            return None;
        }
    };

    let mut ops = String::from("q\n");
    let x = ctx.trim.x + s.apply(object.left);
    let y = ctx.trim.top() - s.apply(object.top);
    ops.push_str(&format!("1 0 0 1 {} {} cm\n", num(x), num(y)));

    // Screen angles are clockwise with y down; in PDF space that is a
    // negative rotation.
    if object.angle != 0.0 {
        let rad = -object.angle.to_radians();
        let (sin, cos) = rad.sin_cos();
        ops.push_str(&format!(
            "{} {} {} {} 0 0 cm\n",
            num(cos),
            num(sin),
            num(-sin),
            num(cos)
        ));
    }

    let opacity = object.style.opacity.unwrap_or(1.0).clamp(0.0, 1.0);
    let alpha = opacity * fill_color(&object.style).map_or(1.0, |c| c.a);
    if alpha < 1.0 {
        let state = resources.alpha_state(alpha);
        ops.push_str(&format!("/{} gs\n", state));
    }

    ops.push_str(&body);
    ops.push_str("Q\n");
    Some(ops)
}

/// Fill colour of an object. An absent fill is black; an unreadable one is
/// logged and treated as black too.
fn fill_color(style: &Style) -> Option<Rgba> {
    match style.fill.as_deref() {
        None => Some(Rgba::BLACK),
        Some("") => None,
        Some(fill) => match parse_color(fill) {
            Some(color) if color.is_invisible() => None,
            Some(color) => Some(color),
            None => {
                log::debug!("Unrecognised fill colour `{}`, using black", fill);
                Some(Rgba::BLACK)
            }
        },
    }
}

fn stroke_color(style: &Style) -> Option<Rgba> {
    let stroke = parse_color(style.stroke.as_deref()?)?;
    let width = style.stroke_width.unwrap_or(1.0);
    (!stroke.is_invisible() && width > 0.0).then_some(stroke)
}

fn paint(path: &str, object: &SceneObject, s: &DocumentScale) -> String {
    let fill = fill_color(&object.style);
    let stroke = stroke_color(&object.style);
    let mut ops = String::new();

    if let Some(color) = fill {
        ops.push_str(&color.fill_op());
    }
    if let Some(color) = stroke {
        let object_scale = (object.scale_x + object.scale_y) / 2.0;
        let width = s.apply(object.style.stroke_width.unwrap_or(1.0) * object_scale);
        ops.push_str(&color.stroke_op());
        ops.push_str(&format!("{} w\n", num(width)));
        if let Some(dash) = object.style.stroke_dash_array.as_ref().filter(|d| !d.is_empty()) {
            let pattern: Vec<String> = dash.iter().map(|d| num(s.apply(*d))).collect();
            ops.push_str(&format!("[{}] 0 d\n", pattern.join(" ")));
        }
    }

    ops.push_str(path);
    let op = match (fill.is_some(), stroke.is_some()) {
        (true, true) => "B",
        (true, false) => "f",
        (false, true) => "S",
        (false, false) => "n",
    };
    ops.push_str(op);
    ops.push('\n');
    ops
}

/// Closed ellipse from four Bezier arcs
pub fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> String {
    let kx = rx * BEZIER_CIRCLE_FACTOR;
    let ky = ry * BEZIER_CIRCLE_FACTOR;
    let mut ops = String::new();
    ops.push_str(&format!("{} {} m\n", num(cx + rx), num(cy)));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        num(cx + rx),
        num(cy + ky),
        num(cx + kx),
        num(cy + ry),
        num(cx),
        num(cy + ry)
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        num(cx - kx),
        num(cy + ry),
        num(cx - rx),
        num(cy + ky),
        num(cx - rx),
        num(cy)
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        num(cx - rx),
        num(cy - ky),
        num(cx - kx),
        num(cy - ry),
        num(cx),
        num(cy - ry)
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        num(cx + kx),
        num(cy - ry),
        num(cx + rx),
        num(cy - ky),
        num(cx + rx),
        num(cy)
    ));
    ops.push_str("h\n");
    ops
}

fn draw_text(
    text: &str,
    font_size: f64,
    object: &SceneObject,
    s: &DocumentScale,
    resources: &mut PageResources,
) -> String {
    resources.uses_font = true;
    let size = s.apply(font_size * object.scale_y);
    let mut ops = String::new();

    if let Some(color) = fill_color(&object.style) {
        ops.push_str(&color.fill_op());
    }
    ops.push_str("BT\n");
    ops.push_str(&format!("/{} {} Tf\n", PageResources::FONT_NAME, num(size)));
    if object.scale_y != 0.0 && (object.scale_x - object.scale_y).abs() > f64::EPSILON {
        ops.push_str(&format!("{} Tz\n", num(object.scale_x / object.scale_y * 100.0)));
    }
    for (i, line) in text.split('\n').enumerate() {
        let baseline = -(size * HELVETICA_ASCENT_RATIO + i as f64 * size * TEXT_LINE_HEIGHT);
        ops.push_str(&format!(
            "1 0 0 1 0 {} Tm ({}) Tj\n",
            num(baseline),
            escape_text(line)
        ));
    }
    ops.push_str("ET\n");
    ops
}

/// Escape a string for a PDF literal. Characters outside printable ASCII
/// have no glyph in the standard font encoding and become `?`.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\r' => {}
            ' '..='~' => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use sticker_editor::PrintSpecification;

    fn ctx() -> DrawContext {
        let spec = PrintSpecification::default();
        DrawContext {
            // 450px display for a 3in, 300dpi product: 0.48 pt per px
            scale: DocumentScale::for_canvas(&spec, Some(450.0)),
            trim: PdfRect::new(27.0, 27.0, 216.0, 216.0),
        }
    }

    #[test]
    fn rect_is_remapped_to_points() {
        let mut resources = PageResources::default();
        let rect = SceneObject::rect(50.0, 100.0, 100.0, 50.0).with_fill("#ff0000");
        let ops = draw_objects(&[rect], &ctx(), &mut resources);

        // left 50px -> 24pt, top 100px -> 48pt below the trim top (243)
        assert!(ops.contains("1 0 0 1 51 195 cm"));
        assert!(ops.contains("0 -24 48 24 re"));
        assert!(ops.contains("1 0 0 rg"));
        assert!(ops.trim_end().ends_with("Q"));
        assert!(!resources.uses_font);
    }

    #[test]
    fn stroke_only_shapes_are_not_filled() {
        let mut resources = PageResources::default();
        let circle = SceneObject::ellipse(0.0, 0.0, 25.0)
            .with_fill("transparent")
            .with_stroke("#000", 2.0)
            .with_dash(vec![10.0, 5.0]);
        let ops = draw_objects(&[circle], &ctx(), &mut resources);
        assert!(ops.contains("0.96 w"));
        assert!(ops.contains("[4.8 2.4] 0 d"));
        assert!(ops.contains("\nS\n"));
        assert_eq!(ops.matches(" c\n").count(), 4);
    }

    #[test]
    fn text_lines_use_line_height() {
        let mut resources = PageResources::default();
        let text = SceneObject::text(0.0, 0.0, "Hello\n(World)", 50.0);
        let ops = draw_objects(&[text], &ctx(), &mut resources);
        assert!(resources.uses_font);
        assert!(ops.contains("/F1 24 Tf"));
        assert!(ops.contains("(Hello) Tj"));
        assert!(ops.contains("(\\(World\\)) Tj"));
        // second baseline one line height lower
        let second = -(24.0 * HELVETICA_ASCENT_RATIO + 24.0 * TEXT_LINE_HEIGHT);
        assert!(ops.contains(&format!("1 0 0 1 0 {} Tm", num(second))));
    }

    #[test]
    fn images_and_opacity() {
        let mut resources = PageResources::default();
        let image = SceneObject::image(0.0, 0.0, 10.0, 10.0, "https://cdn.example/x.png");
        assert!(draw_objects(&[image], &ctx(), &mut resources).is_empty());

        let mut faded = SceneObject::rect(0.0, 0.0, 10.0, 10.0);
        faded.style.opacity = Some(0.5);
        let ops = draw_objects(&[faded], &ctx(), &mut resources);
        assert!(ops.contains("/GS0 gs"));
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_text("a\\b"), "a\\\\b");
        assert_eq!(escape_text("café"), "caf?");
    }
}
