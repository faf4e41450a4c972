//! Headless replay of recorded drawing sessions.
//!
//! A script is the sequence of notifications the mapping host would deliver
//! (pointer moves, draw start, geometry changes, draw end, pointer leaving the
//! viewport). Replaying it drives the real controller against in-memory hosts.

use kurbo::Point;
use planmeter_core::{
    ConfigError, DrawSessionController, ListenerRegistry, MeasurementLayer, MemoryOverlayHost,
    SessionError, SketchGeometry, ViewerConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Event {index} failed: {source}")]
    Session {
        index: usize,
        #[source]
        source: SessionError,
    },
}

/// One host notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        dragging: bool,
    },
    DrawStart {
        x: f64,
        y: f64,
    },
    GeometryChange {
        points: Vec<[f64; 2]>,
    },
    DrawEnd,
    MouseOut,
}

/// A recorded sequence of notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub config: ViewerConfig,
    pub events: Vec<ReplayEvent>,
}

impl ReplayScript {
    /// Parse a script and validate its configuration.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let script: Self = serde_json::from_str(json)?;
        script.config.validate()?;
        Ok(script)
    }

    /// Read a script from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        log::info!("Loading replay script {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// A single 100 px line drawn left to right.
    pub fn demo() -> Self {
        Self {
            config: ViewerConfig::default(),
            events: vec![
                ReplayEvent::PointerMove { x: 0.0, y: 0.0, dragging: false },
                ReplayEvent::DrawStart { x: 0.0, y: 0.0 },
                ReplayEvent::PointerMove { x: 50.0, y: 0.0, dragging: false },
                ReplayEvent::GeometryChange { points: vec![[0.0, 0.0], [50.0, 0.0]] },
                ReplayEvent::GeometryChange { points: vec![[0.0, 0.0], [100.0, 0.0]] },
                ReplayEvent::DrawEnd,
                ReplayEvent::MouseOut,
            ],
        }
    }
}

fn to_geometry(points: &[[f64; 2]]) -> SketchGeometry {
    SketchGeometry::LineString(points.iter().map(|[x, y]| Point::new(*x, *y)).collect())
}

/// Replay a script and return the finished measurements.
pub fn replay(script: &ReplayScript) -> Result<MeasurementLayer, ReplayError> {
    let config = &script.config;
    let mut controller = DrawSessionController::new(
        ListenerRegistry::new(),
        MemoryOverlayHost::new(),
        config.calibration,
        config.length_format.clone(),
    )
    .map_err(|source| ReplayError::Session { index: 0, source })?;

    for (index, event) in script.events.iter().enumerate() {
        log::debug!("Replaying event {}: {:?}", index, event);
        let result = match event {
            ReplayEvent::PointerMove { x, y, dragging } => {
                controller.pointer_move(Point::new(*x, *y), *dragging)
            }
            ReplayEvent::DrawStart { x, y } => controller.start(Point::new(*x, *y)),
            ReplayEvent::GeometryChange { points } => {
                controller.geometry_changed(to_geometry(points))
            }
            ReplayEvent::DrawEnd => controller.finish().map(|m| {
                log::info!("Measured {:.2} px as {}", m.length_px, m.label);
            }),
            ReplayEvent::MouseOut => controller.mouse_leave(),
        };
        result.map_err(|source| ReplayError::Session { index, source })?;

        if let Some(tooltip) = controller.tooltips().measurement() {
            log::trace!("Live measurement: {:?}", tooltip.text());
        }
    }

    let layer = controller.layer().clone();
    log::info!(
        "Replayed {} events: {} measurements, {:.2} total",
        script.events.len(),
        layer.len(),
        layer.total_length()
    );
    controller
        .dispose()
        .map_err(|source| ReplayError::Session { index: script.events.len(), source })?;
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_measures_hundred_pixels() {
        let layer = replay(&ReplayScript::demo()).unwrap();
        assert_eq!(layer.len(), 1);
        let m = &layer.measurements()[0];
        assert!((m.length - 1.27).abs() < 1e-9);
        assert_eq!(m.label, "1.27 m");
    }

    #[test]
    fn test_parse_script() {
        let json = r#"{
            "config": {"length_format": {"decimals": 1, "suffix": ""}},
            "events": [
                {"event": "draw_start", "x": 0.0, "y": 0.0},
                {"event": "geometry_change", "points": [[0.0, 0.0], [0.0, 1000.0]]},
                {"event": "draw_end"}
            ]
        }"#;
        let script = ReplayScript::from_json(json).unwrap();
        assert_eq!(script.events.len(), 3);

        let layer = replay(&script).unwrap();
        assert_eq!(layer.measurements()[0].label, "12.7");
    }

    #[test]
    fn test_multiple_sessions() {
        let script = ReplayScript {
            config: ViewerConfig::default(),
            events: vec![
                ReplayEvent::DrawStart { x: 0.0, y: 0.0 },
                ReplayEvent::GeometryChange { points: vec![[0.0, 0.0], [100.0, 0.0]] },
                ReplayEvent::DrawEnd,
                ReplayEvent::DrawStart { x: 0.0, y: 0.0 },
                ReplayEvent::DrawEnd,
            ],
        };
        let layer = replay(&script).unwrap();
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.measurements()[1].length, 0.0);
    }

    #[test]
    fn test_contract_violation_reports_index() {
        let script = ReplayScript {
            config: ViewerConfig::default(),
            events: vec![ReplayEvent::MouseOut, ReplayEvent::DrawEnd],
        };
        let err = replay(&script).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Session { index: 1, source: SessionError::PreconditionViolation(_) }
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let json = r#"{"config": {"calibration": {"dpi": -5.0}}, "events": []}"#;
        assert!(matches!(ReplayScript::from_json(json), Err(ReplayError::Config(_))));
    }
}
