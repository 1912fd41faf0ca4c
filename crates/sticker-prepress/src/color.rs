//! CSS-style colour strings to PDF device RGB

/// An RGB colour with components in 0..1 and an alpha in 0..1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::opaque(1.0, 1.0, 1.0);

    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    fn from_bytes(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn is_invisible(&self) -> bool {
        self.a <= 0.0
    }

    /// `r g b rg` fill operator
    pub fn fill_op(&self) -> String {
        format!("{} {} {} rg\n", num(self.r), num(self.g), num(self.b))
    }

    /// `r g b RG` stroke operator
    pub fn stroke_op(&self) -> String {
        format!("{} {} {} RG\n", num(self.r), num(self.g), num(self.b))
    }
}

/// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` and a handful of
/// named colours. `None` for anything unrecognised; `transparent` and
/// `none` parse to a fully transparent colour.
pub fn parse_color(input: &str) -> Option<Rgba> {
    let s = input.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    named(&s)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Rgba::from_bytes(
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
            1.0,
        )),
        6 => Some(Rgba::from_bytes(pair(0)?, pair(2)?, pair(4)?, 1.0)),
        8 => Some(Rgba::from_bytes(
            pair(0)?,
            pair(2)?,
            pair(4)?,
            pair(6)? as f64 / 255.0,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        let value = match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 2.55,
            None => p.parse::<f64>().ok()?,
        };
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f64>().ok()?,
        None => 1.0,
    };
    Some(Rgba::from_bytes(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named(name: &str) -> Option<Rgba> {
    let (r, g, b) = match name {
        "transparent" | "none" => {
            return Some(Rgba {
                a: 0.0,
                ..Rgba::BLACK
            });
        }
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "pink" => (255, 192, 203),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        "brown" => (165, 42, 42),
        "gold" => (255, 215, 0),
        _ => return None,
    };
    Some(Rgba::from_bytes(r, g, b, 1.0))
}

/// Compact decimal for content streams
pub(crate) fn num(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    let text = format!("{:.4}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" || text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}
