use crate::constants::*;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Prepress output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    // Crop marks
    pub crop_mark_length_pt: f64,
    pub crop_mark_gap_pt: f64,
    pub crop_mark_margin_pt: f64,
    pub crop_mark_width_pt: f64,

    // Reference lines
    pub draw_safe_zone: bool,
    pub draw_trim_line: bool,
    pub safe_zone_dash: Vec<f64>,

    // Document info
    pub title: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            crop_mark_length_pt: CROP_MARK_LENGTH,
            crop_mark_gap_pt: CROP_MARK_GAP,
            crop_mark_margin_pt: CROP_MARK_MARGIN,
            crop_mark_width_pt: CROP_MARK_WIDTH,
            draw_safe_zone: true,
            draw_trim_line: true,
            safe_zone_dash: SAFE_ZONE_DASH.to_vec(),
            title: None,
        }
    }
}

impl ExportOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| PrepressError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PrepressError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("crop mark length", self.crop_mark_length_pt),
            ("crop mark gap", self.crop_mark_gap_pt),
            ("crop mark margin", self.crop_mark_margin_pt),
            ("crop mark width", self.crop_mark_width_pt),
        ];
        for (label, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(PrepressError::Config(format!(
                    "{label} must be a non-negative number, got {value}"
                )));
            }
        }

        // The marks have to fit in the blank margin around the bleed box
        let needed = self.crop_mark_gap_pt + self.crop_mark_length_pt;
        if self.crop_mark_margin_pt < needed {
            return Err(PrepressError::Config(format!(
                "Crop mark margin ({}pt) is smaller than gap + length ({}pt)",
                self.crop_mark_margin_pt, needed
            )));
        }

        if self.draw_safe_zone
            && (self.safe_zone_dash.is_empty()
                || self.safe_zone_dash.iter().any(|d| !d.is_finite() || *d <= 0.0))
        {
            return Err(PrepressError::Config(
                "Safe zone dash pattern must be one or more positive lengths".to_string(),
            ));
        }

        Ok(())
    }
}
