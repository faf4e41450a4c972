//! Viewport over the blueprint raster: pixel projection, pan and zoom.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Width and height of the blueprint raster in pixels.
pub const BLUEPRINT_EXTENT: Rect = Rect::new(0.0, 0.0, 2339.0, 3308.0);

/// Tile size used to derive the zoom-0 resolution.
const TILE_SIZE: f64 = 256.0;

/// Ratio between resolutions of consecutive zoom levels.
const ZOOM_FACTOR: f64 = 2.0;

/// Projection that maps image pixels straight to view coordinates.
///
/// One view unit is one image pixel at every point (no geographic
/// distortion), and the y axis points up so the raster origin is its
/// bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelProjection {
    pub extent: Rect,
}

impl Default for PixelProjection {
    fn default() -> Self {
        Self { extent: BLUEPRINT_EXTENT }
    }
}

impl PixelProjection {
    /// Create a projection over the given extent.
    pub fn new(extent: Rect) -> Self {
        Self { extent }
    }

    /// Resolution at zoom 0, where the whole extent fits one tile.
    pub fn max_resolution(&self) -> f64 {
        self.extent.width().max(self.extent.height()) / TILE_SIZE
    }
}

/// Static raster drawn under the measurement overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticImageLayer {
    pub url: String,
    pub extent: Rect,
}

impl Default for StaticImageLayer {
    fn default() -> Self {
        Self {
            url: "/blueprint.png".to_string(),
            extent: BLUEPRINT_EXTENT,
        }
    }
}

/// Viewport manages the view transform for the blueprint.
///
/// It handles panning and zooming, converting between screen pixels
/// (origin top-left, y down) and view coordinates (image pixels, y up).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub projection: PixelProjection,
    /// View coordinate shown at the centre of the screen.
    pub center: Point,
    /// Current zoom level.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Screen size in CSS pixels.
    pub size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(PixelProjection::default(), Size::new(1280.0, 800.0))
    }
}

impl Viewport {
    /// Create a viewport centred on the projection extent at zoom 2.
    pub fn new(projection: PixelProjection, size: Size) -> Self {
        Self {
            projection,
            center: projection.extent.center(),
            zoom: 2.0,
            min_zoom: 0.0,
            max_zoom: 8.0,
            size,
        }
    }

    /// View units per screen pixel at the current zoom.
    pub fn resolution(&self) -> f64 {
        self.projection.max_resolution() / ZOOM_FACTOR.powf(self.zoom)
    }

    /// Convert a view coordinate to a screen pixel.
    pub fn coordinate_to_pixel(&self, coordinate: Point) -> Point {
        let res = self.resolution();
        Point::new(
            (coordinate.x - self.center.x) / res + self.size.width / 2.0,
            (self.center.y - coordinate.y) / res + self.size.height / 2.0,
        )
    }

    /// Convert a screen pixel to a view coordinate.
    pub fn pixel_to_coordinate(&self, pixel: Point) -> Point {
        let res = self.resolution();
        Point::new(
            self.center.x + (pixel.x - self.size.width / 2.0) * res,
            self.center.y - (pixel.y - self.size.height / 2.0) * res,
        )
    }

    /// Pan by a delta in screen pixels (content follows the pointer).
    pub fn pan(&mut self, delta: Vec2) {
        let res = self.resolution();
        self.center.x -= delta.x * res;
        self.center.y += delta.y * res;
    }

    /// Zoom by `delta` levels, keeping the coordinate under `pixel` fixed.
    pub fn zoom_at(&mut self, pixel: Point, delta: f64) {
        let new_zoom = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.pixel_to_coordinate(pixel);
        self.zoom = new_zoom;

        let drifted = self.pixel_to_coordinate(pixel);
        self.center.x += anchor.x - drifted.x;
        self.center.y += anchor.y - drifted.y;
    }

    /// Resize the screen area.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Centre on the extent at the largest zoom that shows all of it.
    pub fn fit_extent(&mut self) {
        let extent = self.projection.extent;
        self.center = extent.center();
        if extent.is_zero_area() || self.size.is_zero_area() {
            return;
        }

        let needed = (extent.width() / self.size.width).max(extent.height() / self.size.height);
        let zoom = (self.projection.max_resolution() / needed).log2();
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let view = Viewport::default();
        assert_eq!(view.center, Point::new(1169.5, 1654.0));
        assert!((view.zoom - 2.0).abs() < f64::EPSILON);
        assert!((view.max_zoom - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolution() {
        let view = Viewport::default();
        let expected = 3308.0 / 256.0 / 4.0;
        assert!((view.resolution() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_center_maps_to_screen_center() {
        let view = Viewport::default();
        let pixel = view.coordinate_to_pixel(view.center);
        assert!((pixel.x - 640.0).abs() < 1e-10);
        assert!((pixel.y - 400.0).abs() < 1e-10);
    }

    #[test]
    fn test_y_axis_points_up() {
        let view = Viewport::default();
        let above = Point::new(view.center.x, view.center.y + 100.0);
        assert!(view.coordinate_to_pixel(above).y < 400.0);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut view = Viewport::default();
        view.zoom = 3.3;
        view.center = Point::new(400.0, 900.0);

        let original = Point::new(123.0, 456.0);
        let back = view.pixel_to_coordinate(view.coordinate_to_pixel(original));
        assert!((back.x - original.x).abs() < 1e-9);
        assert!((back.y - original.y).abs() < 1e-9);
    }

    #[test]
    fn test_pan_moves_content_with_pointer() {
        let mut view = Viewport::default();
        let coordinate = Point::new(1000.0, 1500.0);
        let before = view.coordinate_to_pixel(coordinate);
        view.pan(Vec2::new(30.0, -20.0));
        let after = view.coordinate_to_pixel(coordinate);
        assert!((after.x - before.x - 30.0).abs() < 1e-9);
        assert!((after.y - before.y + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_keeps_anchor() {
        let mut view = Viewport::default();
        let pixel = Point::new(200.0, 150.0);
        let anchor = view.pixel_to_coordinate(pixel);
        view.zoom_at(pixel, 1.5);
        let after = view.pixel_to_coordinate(pixel);
        assert!((after.x - anchor.x).abs() < 1e-9);
        assert!((after.y - anchor.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut view = Viewport::default();
        view.zoom_at(Point::ZERO, -100.0);
        assert!((view.zoom - view.min_zoom).abs() < f64::EPSILON);

        view.zoom_at(Point::ZERO, 100.0);
        assert!((view.zoom - view.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_extent_shows_everything() {
        let mut view = Viewport::default();
        view.zoom = 6.0;
        view.fit_extent();

        let extent = view.projection.extent;
        let top_left = view.coordinate_to_pixel(Point::new(extent.x0, extent.y1));
        let bottom_right = view.coordinate_to_pixel(Point::new(extent.x1, extent.y0));
        assert!(top_left.x >= -1e-9 && top_left.y >= -1e-9);
        assert!(bottom_right.x <= 1280.0 + 1e-9 && bottom_right.y <= 800.0 + 1e-9);
    }
}
