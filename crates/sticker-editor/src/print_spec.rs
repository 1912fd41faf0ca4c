//! Print specification resolution
//!
//! Turns a loosely-typed product record into the immutable physical
//! specification every other component measures against. Resolution never
//! fails: it runs on every editor open, so each bad field falls back to its
//! named default instead.

use crate::constants::*;
use crate::types::{EditorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Product fields relevant to printing, as stored by the catalog.
///
/// Values are kept as raw JSON because catalog records carry numbers,
/// numeric strings, or nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default, alias = "print_width")]
    pub print_width: Option<Value>,
    #[serde(default, alias = "print_height")]
    pub print_height: Option<Value>,
    #[serde(default, alias = "print_dpi", alias = "dpi")]
    pub print_dpi: Option<Value>,
    #[serde(default, alias = "bleed_size", alias = "bleed")]
    pub bleed_size: Option<Value>,
    #[serde(default, alias = "safe_zone")]
    pub safe_zone: Option<Value>,
}

/// Physical print geometry of one product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintSpecification {
    pub print_width_in: f64,
    pub print_height_in: f64,
    pub print_dpi: u32,
    pub bleed_in: f64,
    pub safe_zone_in: f64,
}

impl Default for PrintSpecification {
    fn default() -> Self {
        Self {
            print_width_in: DEFAULT_PRINT_WIDTH_IN,
            print_height_in: DEFAULT_PRINT_HEIGHT_IN,
            print_dpi: DEFAULT_PRINT_DPI,
            bleed_in: DEFAULT_BLEED_IN,
            safe_zone_in: DEFAULT_SAFE_ZONE_IN,
        }
    }
}

impl PrintSpecification {
    /// Build a specification, rejecting anything that breaks the invariants.
    pub fn new(
        print_width_in: f64,
        print_height_in: f64,
        print_dpi: u32,
        bleed_in: f64,
        safe_zone_in: f64,
    ) -> Result<Self> {
        if !(print_width_in.is_finite() && print_width_in > 0.0) {
            return Err(EditorError::InvalidSpec(format!(
                "width must be positive, got {print_width_in}"
            )));
        }
        if !(print_height_in.is_finite() && print_height_in > 0.0) {
            return Err(EditorError::InvalidSpec(format!(
                "height must be positive, got {print_height_in}"
            )));
        }
        if !(MIN_PRINT_DPI..=MAX_PRINT_DPI).contains(&print_dpi) {
            return Err(EditorError::InvalidSpec(format!(
                "DPI must be between {MIN_PRINT_DPI} and {MAX_PRINT_DPI}, got {print_dpi}"
            )));
        }
        let limit = half_min_dimension(print_width_in, print_height_in);
        for (label, value) in [("bleed", bleed_in), ("safe zone", safe_zone_in)] {
            if !(value.is_finite() && value >= 0.0 && value < limit) {
                return Err(EditorError::InvalidSpec(format!(
                    "{label} must be in [0, {limit}), got {value}"
                )));
            }
        }
        Ok(Self {
            print_width_in,
            print_height_in,
            print_dpi,
            bleed_in,
            safe_zone_in,
        })
    }

    /// Resolve a product record, substituting defaults for bad fields.
    pub fn resolve(product: &ProductRecord) -> Self {
        let print_width_in = positive_or_default(
            product.print_width.as_ref(),
            "printWidth",
            DEFAULT_PRINT_WIDTH_IN,
        );
        let print_height_in = positive_or_default(
            product.print_height.as_ref(),
            "printHeight",
            DEFAULT_PRINT_HEIGHT_IN,
        );

        let print_dpi = match number(product.print_dpi.as_ref()) {
            Some(dpi) if dpi >= MIN_PRINT_DPI as f64 && dpi <= MAX_PRINT_DPI as f64 => {
                dpi.round() as u32
            }
            other => {
                if product.print_dpi.is_some() {
                    log::warn!(
                        "printDpi {:?} out of range, using default {}",
                        other,
                        DEFAULT_PRINT_DPI
                    );
                }
                DEFAULT_PRINT_DPI
            }
        };

        let limit = half_min_dimension(print_width_in, print_height_in);
        let bleed_in = margin_or_default(
            product.bleed_size.as_ref(),
            "bleedSize",
            DEFAULT_BLEED_IN,
            limit,
        );
        let safe_zone_in = margin_or_default(
            product.safe_zone.as_ref(),
            "safeZone",
            DEFAULT_SAFE_ZONE_IN,
            limit,
        );

        Self {
            print_width_in,
            print_height_in,
            print_dpi,
            bleed_in,
            safe_zone_in,
        }
    }

    /// Resolve from a JSON product document. A document that cannot be parsed
    /// at all resolves to the defaults.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<ProductRecord>(json) {
            Ok(product) => Self::resolve(&product),
            Err(e) => {
                log::warn!("Unreadable product record ({e}), using default print specification");
                Self::default()
            }
        }
    }

    /// Full-resolution width in device pixels
    pub fn print_width_px(&self) -> f64 {
        self.print_width_in * self.print_dpi as f64
    }

    /// Full-resolution height in device pixels
    pub fn print_height_px(&self) -> f64 {
        self.print_height_in * self.print_dpi as f64
    }

    /// Trim width in document points
    pub fn trim_width_pt(&self) -> f64 {
        self.print_width_in * POINTS_PER_INCH
    }

    /// Trim height in document points
    pub fn trim_height_pt(&self) -> f64 {
        self.print_height_in * POINTS_PER_INCH
    }

    /// Trim plus bleed on both sides, in points
    pub fn bleed_width_pt(&self) -> f64 {
        (self.print_width_in + 2.0 * self.bleed_in) * POINTS_PER_INCH
    }

    /// Trim plus bleed on both sides, in points
    pub fn bleed_height_pt(&self) -> f64 {
        (self.print_height_in + 2.0 * self.bleed_in) * POINTS_PER_INCH
    }
}

fn half_min_dimension(width_in: f64, height_in: f64) -> f64 {
    width_in.min(height_in) / 2.0
}

/// Read a number or numeric string
fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("in").trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn positive_or_default(value: Option<&Value>, field: &str, default: f64) -> f64 {
    match number(value) {
        Some(v) if v > 0.0 => v,
        _ => {
            if value.is_some() {
                log::warn!("{field} {value:?} is not a positive number, using default {default}");
            }
            default
        }
    }
}

fn margin_or_default(value: Option<&Value>, field: &str, default: f64, limit: f64) -> f64 {
    if let Some(v) = number(value) {
        if v >= 0.0 && v < limit {
            return v;
        }
        log::warn!("{field} {v} outside [0, {limit}), using default");
    } else if value.is_some() {
        log::warn!("{field} {value:?} is not a number, using default");
    }

    if default < limit { default } else { 0.0 }
}
