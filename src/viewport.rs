//! Viewport transform: pan/zoom mapping between screen and world space.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 5.0;
/// Zoom ratio applied per wheel tick.
pub const WHEEL_ZOOM_STEP: f64 = 1.05;
/// Below this zoom the grid and smart guides are not worth drawing.
pub const GRID_VISIBILITY_CUTOFF: f64 = 0.5;

/// Viewport manages the view transform for the canvas.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and world coordinates. Session
/// scoped; never persisted as board data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset (pan), in screen pixels.
    pub pan: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Create a new viewport with default pan and zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Affine transform converting world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Inverse transform for input handling (screen to world).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the viewport by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom the viewport, keeping the given screen point fixed.
    ///
    /// The world point under `screen_point` before the zoom is the same
    /// world point under it afterwards.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Adjust pan so world_point stays at screen_point.
        let new_screen = self.world_to_screen(world_point);
        self.pan += Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
    }

    /// Apply a wheel tick at the given screen anchor.
    ///
    /// Scroll-down (negative y delta) zooms out by [`WHEEL_ZOOM_STEP`],
    /// scroll-up zooms in by the inverse ratio.
    pub fn wheel_zoom(&mut self, screen_anchor: Point, delta_y: f64) {
        if delta_y == 0.0 {
            return;
        }
        let factor = if delta_y < 0.0 {
            1.0 / WHEEL_ZOOM_STEP
        } else {
            WHEEL_ZOOM_STEP
        };
        self.zoom_at(screen_anchor, factor);
    }

    /// Whether the background grid and guides should be rendered at the
    /// current zoom. A legibility cutoff, not a correctness one.
    pub fn shows_grid(&self) -> bool {
        self.zoom >= GRID_VISIBILITY_CUTOFF
    }

    /// Reset to default pan and zoom.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Fit the viewport to show the given world bounds.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport_size: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (viewport_size.width - padding * 2.0).max(1.0),
            (viewport_size.height - padding * 2.0).max(1.0),
        );
        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(MIN_ZOOM, MAX_ZOOM);

        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport_size.width / 2.0, viewport_size.height / 2.0);
        self.pan = Vec2::new(
            viewport_center.x - bounds_center.x * self.zoom,
            viewport_center.y - bounds_center.y * self.zoom,
        );
    }
}
