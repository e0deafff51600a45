use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_NAME;
use crate::error::ConfigError;
use crate::stroke::Argb;

/// Where the file backend keeps its drawings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("drawings"),
        }
    }
}

/// Drawing tool settings: palette, stroke width range and capture behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to the defaults below
pub struct SessionConfig {
    pub palette: Vec<Argb>,
    pub default_color_index: usize,
    /// Inclusive `(min, max)` range for the stroke width slider.
    pub stroke_width_range: (f32, f32),
    pub default_stroke_width: f32,
    /// Record drag ticks that did not move the pointer.
    pub keep_degenerate_segments: bool,
    pub default_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            palette: vec![
                Argb::BLACK,
                Argb(0xFF68_5FFF),
                Argb(0xFFFF_D886),
                Argb(0xFFFF_5185),
            ],
            default_color_index: 0,
            stroke_width_range: (5.0, 50.0),
            default_stroke_width: 10.0,
            keep_degenerate_segments: true,
            default_name: DEFAULT_NAME.to_owned(),
        }
    }
}

impl SessionConfig {
    /// Read a JSON config file and check it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette is empty".to_owned()));
        }
        if self.default_color_index >= self.palette.len() {
            return Err(ConfigError::Invalid(format!(
                "default color index {} is outside a palette of {}",
                self.default_color_index,
                self.palette.len()
            )));
        }

        let (min, max) = self.stroke_width_range;
        if !(min > 0.0 && min <= max) {
            return Err(ConfigError::Invalid(format!(
                "stroke width range {min}..={max} is not a positive range"
            )));
        }
        if !(min..=max).contains(&self.default_stroke_width) {
            return Err(ConfigError::Invalid(format!(
                "default stroke width {} is outside {min}..={max}",
                self.default_stroke_width
            )));
        }
        if self.default_name.is_empty() {
            return Err(ConfigError::Invalid("default name is empty".to_owned()));
        }
        Ok(())
    }

    pub fn clamp_stroke_width(&self, width: f32) -> f32 {
        let (min, max) = self.stroke_width_range;
        if width.is_nan() {
            return self.default_stroke_width;
        }
        width.clamp(min, max)
    }
}
