//! Viewer configuration.

use crate::calibration::{Calibration, LengthFormat, UnitError};
use crate::viewport::{PixelProjection, StaticImageLayer, Viewport};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Calibration(#[from] UnitError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one blueprint viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// URL of the blueprint raster.
    pub image_url: String,
    /// Raster extent in pixels.
    pub extent: Rect,
    pub initial_zoom: f64,
    pub max_zoom: f64,
    pub calibration: Calibration,
    pub length_format: LengthFormat,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let image = StaticImageLayer::default();
        Self {
            image_url: image.url,
            extent: image.extent,
            initial_zoom: 2.0,
            max_zoom: 8.0,
            calibration: Calibration::default(),
            length_format: LengthFormat::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check calibration and view settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        if self.extent.is_zero_area() {
            return Err(ConfigError::Invalid("image extent is empty".to_string()));
        }
        if !(0.0..=self.max_zoom).contains(&self.initial_zoom) {
            return Err(ConfigError::Invalid(format!(
                "initial zoom {} outside 0..={}",
                self.initial_zoom, self.max_zoom
            )));
        }
        Ok(())
    }

    /// Raster layer described by this configuration.
    pub fn image_layer(&self) -> StaticImageLayer {
        StaticImageLayer {
            url: self.image_url.clone(),
            extent: self.extent,
        }
    }

    /// Viewport over the configured extent.
    pub fn viewport(&self, size: Size) -> Viewport {
        let mut viewport = Viewport::new(PixelProjection::new(self.extent), size);
        viewport.zoom = self.initial_zoom;
        viewport.max_zoom = self.max_zoom;
        viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::ScaleRatio;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.image_url, "/blueprint.png");
        assert_eq!(config.extent, Rect::new(0.0, 0.0, 2339.0, 3308.0));
        assert!((config.calibration.dpi - 200.0).abs() < f64::EPSILON);
        assert_eq!(config.calibration.scale, ScaleRatio::new(1, 100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = ViewerConfig::from_json(r#"{"calibration": {"dpi": 300.0}}"#).unwrap();
        assert!((config.calibration.dpi - 300.0).abs() < f64::EPSILON);
        assert_eq!(config.calibration.scale, ScaleRatio::new(1, 100));
        assert_eq!(config.length_format, LengthFormat::default());
    }

    #[test]
    fn test_rejects_bad_calibration() {
        let result = ViewerConfig::from_json(r#"{"calibration": {"dpi": 0.0}}"#);
        assert!(matches!(result, Err(ConfigError::Calibration(_))));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(ViewerConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_viewport_from_config() {
        let config = ViewerConfig {
            initial_zoom: 3.0,
            ..ViewerConfig::default()
        };
        let view = config.viewport(Size::new(800.0, 600.0));
        assert!((view.zoom - 3.0).abs() < f64::EPSILON);
        assert_eq!(view.center, config.extent.center());
    }

    #[test]
    fn test_image_layer_follows_config() {
        let config = ViewerConfig::from_json(r#"{"image_url": "/floor2.png"}"#).unwrap();
        let image = config.image_layer();
        assert_eq!(image.url, "/floor2.png");
        assert_eq!(image.extent, config.extent);
    }
}
