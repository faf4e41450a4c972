//! Finished measurements, kept as the vector layer over the blueprint.

use crate::geometry::SketchGeometry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a measurement.
pub type MeasurementId = Uuid;

/// A finished line and its measured length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    pub geometry: SketchGeometry,
    /// Path length in image pixels.
    pub length_px: f64,
    /// Converted real-world length.
    pub length: f64,
    /// Text shown on the finalized tooltip.
    pub label: String,
}

impl Measurement {
    pub fn new(geometry: SketchGeometry, length_px: f64, length: f64, label: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry,
            length_px,
            length,
            label,
        }
    }
}

/// Collection of finished measurements in drawing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementLayer {
    measurements: Vec<Measurement>,
}

impl MeasurementLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished measurement.
    pub fn add(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id == id)
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Sum of all converted lengths.
    pub fn total_length(&self) -> f64 {
        self.measurements.iter().map(|m| m.length).sum()
    }

    /// Serialize the layer to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a layer from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn sample(length_px: f64) -> Measurement {
        let geometry = SketchGeometry::LineString(vec![Point::ZERO, Point::new(length_px, 0.0)]);
        let length = length_px * 0.0127;
        Measurement::new(geometry, length_px, length, format!("{:.2} m", length))
    }

    #[test]
    fn test_add_and_total() {
        let mut layer = MeasurementLayer::new();
        layer.add(sample(100.0));
        layer.add(sample(1000.0));

        assert_eq!(layer.len(), 2);
        assert!((layer.total_length() - 13.97).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_by_id() {
        let mut layer = MeasurementLayer::new();
        let m = sample(100.0);
        let id = m.id;
        layer.add(m);

        assert_eq!(layer.get(id).map(|m| m.label.as_str()), Some("1.27 m"));
        assert!(layer.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_json_export() {
        let mut layer = MeasurementLayer::new();
        layer.add(sample(100.0));

        let json = layer.to_json().unwrap();
        let restored = MeasurementLayer::from_json(&json).unwrap();
        assert_eq!(restored.measurements(), layer.measurements());
    }
}
