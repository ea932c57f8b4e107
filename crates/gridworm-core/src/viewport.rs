//! Viewport module for zoom/pan transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom factor applied per wheel notch when zooming in.
pub const WHEEL_ZOOM_IN: f64 = 1.1;
/// Zoom factor applied per wheel notch when zooming out.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Viewport manages the view transform shared by the item layer, the
/// annotation overlay and the background grid.
///
/// Screen points are relative to the canvas element's top-left corner. The
/// pan offset is expressed in canvas units, so
/// `screen = (canvas + pan) * zoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom level (1.0 = 100%)
    pub zoom: f64,
    /// Current pan offset in canvas units
    pub pan: Vec2,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            min_zoom: 0.1,
            max_zoom: 5.0,
        }
    }
}

impl Viewport {
    /// Create a new viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with a custom zoom range.
    pub fn with_zoom_range(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering (canvas to screen).
    pub fn transform(&self) -> Affine {
        Affine::scale(self.zoom) * Affine::translate(self.pan)
    }

    /// Get the inverse transform for input handling (screen to canvas).
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(-self.pan) * Affine::scale(1.0 / self.zoom)
    }

    /// Convert a screen point to canvas coordinates.
    ///
    /// Every pointer consumer goes through this conversion.
    pub fn to_canvas_space(&self, screen_point: Point) -> Point {
        Point::new(
            screen_point.x / self.zoom - self.pan.x,
            screen_point.y / self.zoom - self.pan.y,
        )
    }

    /// Convert a canvas point to screen coordinates.
    pub fn to_screen_space(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan_by_screen_delta(&mut self, delta: Vec2) {
        self.pan += delta / self.zoom;
    }

    /// Set the zoom level, clamped to range. Returns whether it changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = new_zoom;
        true
    }

    /// Step the zoom level by `step` (toolbar buttons).
    pub fn zoom_by_step(&mut self, step: f64) -> bool {
        self.set_zoom(self.zoom + step)
    }

    /// Zoom by a factor, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        // Canvas point under the cursor before zoom
        let anchor = self.to_canvas_space(screen_point);
        if !self.set_zoom(self.zoom * factor) {
            return false;
        }
        self.pan = Vec2::new(
            screen_point.x / self.zoom - anchor.x,
            screen_point.y / self.zoom - anchor.y,
        );
        true
    }

    /// Apply one wheel notch at the cursor. Negative `delta_y` zooms in.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64) -> bool {
        let factor = if delta_y < 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
        self.zoom_at(screen_point, factor)
    }

    /// Reset to 100% zoom and no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
        self.pan = Vec2::ZERO;
    }
}
