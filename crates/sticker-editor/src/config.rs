use crate::constants::*;
use crate::types::{EditorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Editor session tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Debounce delay between the last mutation and the autosave
    pub autosave_delay_ms: u64,

    /// Maximum number of undo entries kept
    pub history_limit: usize,

    // Viewport fitting
    pub viewport_padding_px: f64,
    pub min_fit_scale: f64,

    // Uploads
    pub max_upload_bytes: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            viewport_padding_px: DEFAULT_VIEWPORT_PADDING_PX,
            min_fit_scale: DEFAULT_MIN_FIT_SCALE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl EditorConfig {
    /// Load config from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| EditorError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EditorError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(EditorError::Config(
                "History limit must be at least 1".to_string(),
            ));
        }
        if !self.viewport_padding_px.is_finite() || self.viewport_padding_px < 0.0 {
            return Err(EditorError::Config(format!(
                "Viewport padding must be a non-negative number, got {}",
                self.viewport_padding_px
            )));
        }
        if !(self.min_fit_scale > 0.0 && self.min_fit_scale <= 1.0) {
            return Err(EditorError::Config(format!(
                "Minimum fit scale must be in (0, 1], got {}",
                self.min_fit_scale
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(EditorError::Config(
                "Upload limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.autosave_delay(), Duration::from_secs(15));
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn rejects_bad_values() {
        let config = EditorConfig {
            min_fit_scale: 0.0,
            ..EditorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EditorConfig {
            history_limit: 0,
            ..EditorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"autosaveDelayMs": 500}"#).unwrap();
        assert_eq!(config.autosave_delay_ms, 500);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[tokio::test]
    async fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        let config = EditorConfig {
            autosave_delay_ms: 2_000,
            ..EditorConfig::default()
        };
        config.save(&path).await.unwrap();
        assert_eq!(EditorConfig::load(&path).await.unwrap(), config);
    }
}
