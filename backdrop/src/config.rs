//! Session configuration.
//!
//! Stored as YAML or JSON, picked from the file extension.

use std::path::Path;

use anyhow::Context;
use common::file_format;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::ProcessingParams;
use crate::pixel::Rgb8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructorConfig {
    /// Working resolution relative to the input frames, in `(0, 1]`.
    /// Masks are computed at the working resolution, pixels are copied at
    /// full resolution.
    pub scale_factor: f32,
    /// Color of output pixels no reference has filled yet.
    pub sentinel_color: Rgb8,
    /// Initial pipeline parameters offered to the user.
    pub params: ProcessingParams,
}

impl Default for ReconstructorConfig {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            sentinel_color: Rgb8::RED,
            params: ProcessingParams::default(),
        }
    }
}

impl ReconstructorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.scale_factor > 0.0 && self.scale_factor <= 1.0) {
            return Err(Error::InvalidScaleFactor(self.scale_factor));
        }
        self.params.validate()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: Self = file_format::load_from_file(path)?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        file_format::save_to_file(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("backdrop_config_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_default_is_valid() {
        let config = ReconstructorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sentinel_color, Rgb8::RED);
    }

    #[test]
    fn test_validate_rejects_scale_factor() {
        for scale_factor in [0.0, -0.5, 1.5, f32::NAN] {
            let config = ReconstructorConfig {
                scale_factor,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "scale_factor={scale_factor}");
        }
    }

    #[test]
    fn test_validate_rejects_threshold() {
        let config = ReconstructorConfig {
            params: ProcessingParams::new(1, 256, 1, 1),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(Error::ThresholdOutOfRange(256)));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ReconstructorConfig =
            serde_json::from_str(r#"{ "scale_factor": 0.5, "params": { "threshold": 30 } }"#)
                .unwrap();
        assert_eq!(config.scale_factor, 0.5);
        assert_eq!(config.sentinel_color, Rgb8::RED);
        assert_eq!(config.params.threshold, 30);
        assert_eq!(config.params.blur_radius, 3);
    }

    #[test]
    fn test_negative_radius_is_rejected() {
        let result: std::result::Result<ReconstructorConfig, _> =
            serde_json::from_str(r#"{ "params": { "blur_radius": -1 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_yaml() {
        let path = temp_path("config.yaml");
        let config = ReconstructorConfig {
            scale_factor: 0.25,
            sentinel_color: Rgb8::new(9, 8, 7),
            params: ProcessingParams::new(2, 15, 3, 0),
        };
        config.save(&path).unwrap();
        let loaded = ReconstructorConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = temp_path("invalid.json");
        std::fs::write(&path, r#"{ "scale_factor": 2.0 }"#).unwrap();
        let err = ReconstructorConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("Invalid configuration"));
    }
}
