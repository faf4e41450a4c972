//! Pixel to real-world length conversion.
//!
//! A blueprint raster is scanned at a known resolution and drawn at a known
//! scale. A length measured in image pixels is converted to millimetres on
//! paper, then to metres, then multiplied by the drawing scale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Metres per millimetre.
const METRES_PER_MM: f64 = 0.001;

/// Resolution the blueprint raster was exported at.
pub const DEFAULT_DPI: f64 = 200.0;

/// Conversion errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("Invalid length: {0} (expected a finite, non-negative pixel length)")]
    InvalidInput(f64),
    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),
}

/// Drawing scale as `numerator : denominator`, e.g. 1:100 means one unit on
/// paper is one hundred units in reality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRatio {
    pub numerator: u32,
    pub denominator: u32,
}

impl ScaleRatio {
    /// Create a new scale ratio.
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self { numerator, denominator }
    }

    /// Real-world units per paper unit.
    pub fn factor(&self) -> f64 {
        f64::from(self.denominator) / f64::from(self.numerator)
    }
}

impl Default for ScaleRatio {
    fn default() -> Self {
        Self::new(1, 100)
    }
}

/// Fixed calibration of the blueprint raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Image resolution in dots per inch.
    pub dpi: f64,
    /// Drawing scale.
    pub scale: ScaleRatio,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            scale: ScaleRatio::default(),
        }
    }
}

impl Calibration {
    /// Create a calibration from a resolution and a scale.
    pub fn new(dpi: f64, scale: ScaleRatio) -> Self {
        Self { dpi, scale }
    }

    /// Check that the constants describe a usable conversion.
    pub fn validate(&self) -> Result<(), UnitError> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(UnitError::InvalidCalibration(format!(
                "dpi must be positive, got {}",
                self.dpi
            )));
        }
        if self.scale.numerator == 0 || self.scale.denominator == 0 {
            return Err(UnitError::InvalidCalibration(format!(
                "scale {}:{} has a zero term",
                self.scale.numerator, self.scale.denominator
            )));
        }
        Ok(())
    }

    /// Multiplier applied to a pixel length (0.0127 for 200 dpi at 1:100).
    pub fn metres_per_pixel(&self) -> f64 {
        (MM_PER_INCH / self.dpi) * METRES_PER_MM * self.scale.factor()
    }

    /// Convert a path length in image pixels to a real-world length.
    ///
    /// No rounding is applied; see [`LengthFormat`] for display.
    pub fn convert(&self, length_px: f64) -> Result<f64, UnitError> {
        if !length_px.is_finite() || length_px < 0.0 {
            return Err(UnitError::InvalidInput(length_px));
        }
        let length = length_px * self.metres_per_pixel();
        // -0.0 would render as "-0.00"
        Ok(if length == 0.0 { 0.0 } else { length })
    }
}

/// Convert with the default calibration (200 dpi, 1:100).
pub fn convert(length_px: f64) -> Result<f64, UnitError> {
    Calibration::default().convert(length_px)
}

/// How a converted length is rendered into a tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthFormat {
    /// Digits after the decimal point.
    pub decimals: usize,
    /// Appended after the number, including any separator.
    pub suffix: String,
}

impl Default for LengthFormat {
    fn default() -> Self {
        Self {
            decimals: 2,
            suffix: " m".to_string(),
        }
    }
}

impl LengthFormat {
    /// Format a real-world length for display.
    pub fn format(&self, length: f64) -> String {
        format!("{:.*}{}", self.decimals, length, self.suffix)
    }
}
