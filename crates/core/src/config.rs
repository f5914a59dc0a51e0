use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Maps one OCR pass's 0–1 recognition progress into a slice of a file's work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassWeight {
    pub offset: f32,
    pub span: f32,
}

impl PassWeight {
    pub const fn new(offset: f32, span: f32) -> Self {
        Self { offset, span }
    }

    /// File-local fraction for a recognition progress value. Out-of-range and
    /// NaN inputs are clamped.
    pub fn apply(self, progress: f32) -> f32 {
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.offset + p * self.span
    }
}

/// Tunables for one scan run. Every field has a default, so a TOML file only
/// needs the keys it wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Language hint handed to the OCR engine.
    pub language: String,
    /// Images wider than this are scaled down before OCR.
    pub max_width: u32,
    /// Share of the image height, measured from the bottom, read in the primary pass.
    pub primary_bottom_ratio: f32,
    pub min_crop_height: u32,
    pub contrast: f32,
    pub bias: f32,
    /// Enhanced luma above this becomes pure white.
    pub white_cutoff: f32,
    /// Enhanced luma below this becomes pure black.
    pub black_cutoff: f32,
    pub primary_progress: PassWeight,
    pub fallback_progress: PassWeight,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            language: "eng+tha".to_string(),
            max_width: 960,
            primary_bottom_ratio: 0.52,
            min_crop_height: 140,
            contrast: 1.75,
            bias: 8.0,
            white_cutoff: 170.0,
            black_cutoff: 75.0,
            primary_progress: PassWeight::new(0.04, 0.78),
            fallback_progress: PassWeight::new(0.84, 0.14),
        }
    }
}

impl ScanConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid("language must not be empty".into()));
        }
        if self.max_width == 0 {
            return Err(ConfigError::Invalid("max_width must be positive".into()));
        }
        if !(self.primary_bottom_ratio > 0.0 && self.primary_bottom_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "primary_bottom_ratio must be in (0, 1], got {}",
                self.primary_bottom_ratio
            )));
        }
        if self.black_cutoff > self.white_cutoff {
            return Err(ConfigError::Invalid(format!(
                "black_cutoff ({}) exceeds white_cutoff ({})",
                self.black_cutoff, self.white_cutoff
            )));
        }
        let weights = [
            ("primary_progress", self.primary_progress),
            ("fallback_progress", self.fallback_progress),
        ];
        for (name, w) in weights {
            let end = w.offset + w.span;
            if w.offset < 0.0 || w.span < 0.0 || end > 1.0 + f32::EPSILON {
                return Err(ConfigError::Invalid(format!(
                    "{name} must stay within 0..1, got offset {} span {}",
                    w.offset, w.span
                )));
            }
        }
        Ok(())
    }
}
