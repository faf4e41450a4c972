//! Sketch geometry produced by the host's drawing interaction.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Hint shown while no sketch is in progress.
pub const START_HINT: &str = "Click to start drawing";

/// Kind of geometry being sketched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    LineString,
    Polygon,
}

/// Continuation hints, keyed by geometry kind.
const CONTINUE_HINTS: [(GeometryKind, &str); 2] = [
    (GeometryKind::LineString, "Click to continue drawing the line"),
    (GeometryKind::Polygon, "Click to continue drawing the polygon"),
];

/// Hint shown while a sketch of the given kind is in progress.
pub fn continue_hint(kind: GeometryKind) -> &'static str {
    CONTINUE_HINTS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, hint)| *hint)
        .unwrap_or(START_HINT)
}

/// In-progress or finished sketch geometry, in view coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum SketchGeometry {
    /// Open polyline.
    LineString(Vec<Point>),
    /// Closed ring; the closing segment is implicit.
    Polygon(Vec<Point>),
}

impl SketchGeometry {
    /// Create a line starting at a single vertex.
    pub fn line(first: Point) -> Self {
        Self::LineString(vec![first])
    }

    /// Get the geometry kind.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::LineString(_) => GeometryKind::LineString,
            Self::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// Get the vertices.
    pub fn points(&self) -> &[Point] {
        match self {
            Self::LineString(points) | Self::Polygon(points) => points,
        }
    }

    /// Last vertex, where the live measurement is anchored.
    pub fn last_coordinate(&self) -> Option<Point> {
        self.points().last().copied()
    }

    /// Total path length in view units (perimeter for polygons).
    pub fn length(&self) -> f64 {
        let points = self.points();
        let open = points
            .windows(2)
            .fold(0.0, |acc, w| acc + w[0].distance(w[1]));
        match self {
            Self::LineString(_) => open,
            Self::Polygon(_) => match (points.first(), points.last()) {
                (Some(first), Some(last)) if points.len() > 2 => open + last.distance(*first),
                _ => open,
            },
        }
    }

    /// Append a vertex.
    pub fn push(&mut self, point: Point) {
        match self {
            Self::LineString(points) | Self::Polygon(points) => points.push(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_length() {
        let line = SketchGeometry::LineString(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 10.0),
        ]);
        assert!((line.length() - 11.0).abs() < 1e-10);
    }

    #[test]
    fn test_single_point_has_zero_length() {
        let line = SketchGeometry::line(Point::new(5.0, 5.0));
        assert_eq!(line.length(), 0.0);
        assert!(line.length().is_sign_positive());
        assert_eq!(line.last_coordinate(), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_polygon_perimeter_closes_ring() {
        let square = SketchGeometry::Polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        assert!((square.length() - 40.0).abs() < 1e-10);
    }

    #[test]
    fn test_hint_table() {
        assert_eq!(continue_hint(GeometryKind::LineString), "Click to continue drawing the line");
        assert_eq!(continue_hint(GeometryKind::Polygon), "Click to continue drawing the polygon");
    }

    #[test]
    fn test_push_extends() {
        let mut line = SketchGeometry::line(Point::ZERO);
        line.push(Point::new(100.0, 0.0));
        assert_eq!(line.points().len(), 2);
        assert_eq!(line.kind(), GeometryKind::LineString);
        assert!((line.length() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_serde_shape() {
        let line = SketchGeometry::LineString(vec![Point::new(1.0, 2.0)]);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["type"], "LineString");
        let back: SketchGeometry = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }
}
