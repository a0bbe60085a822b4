//! Camera and coordinate transformation for the design surface.
//!
//! Handles conversion between screen coordinates (logical pixels, origin
//! top-left) and world coordinates (maze field units, same axis directions).
//! `(x, y)` is the world point currently under the screen origin; `scale` is
//! pixels per world unit.

use mazekit_core::constants::{MAX_ZOOM, MIN_ZOOM};
use mazekit_core::geometry::{Bounds, Point};

/// The pan/zoom state supplied to tools for world <-> screen conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World x under the screen origin.
    pub x: f64,
    /// World y under the screen origin.
    pub y: f64,
    /// Pixels per world unit.
    pub scale: f64,
}

impl Camera {
    /// Creates a camera at the world origin with 1:1 scale.
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }

    /// Converts a world point to screen pixels.
    pub fn world_to_screen(&self, p: &Point) -> Point {
        Point::new((p.x - self.x) * self.scale, (p.y - self.y) * self.scale)
    }

    /// Converts a screen pixel position to world coordinates.
    pub fn screen_to_world(&self, p: &Point) -> Point {
        Point::new(p.x / self.scale + self.x, p.y / self.scale + self.y)
    }

    /// Converts a screen-space length to world units at the current scale.
    pub fn screen_len_to_world(&self, len: f64) -> f64 {
        len / self.scale
    }

    /// Sets the zoom level, constrained to the supported range.
    pub fn set_scale(&mut self, scale: f64) {
        if scale >= MIN_ZOOM && scale <= MAX_ZOOM {
            self.scale = scale;
        }
    }

    /// Zooms in by a 1.2 step.
    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * 1.2);
    }

    /// Zooms out by a 1.2 step.
    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / 1.2);
    }

    /// Zooms to a new scale while keeping the given world point fixed at its
    /// current screen position.
    pub fn zoom_to_point(&mut self, world: &Point, new_scale: f64) {
        if new_scale < MIN_ZOOM || new_scale > MAX_ZOOM {
            return;
        }
        let screen = self.world_to_screen(world);
        self.scale = new_scale;
        self.x = world.x - screen.x / self.scale;
        self.y = world.y - screen.y / self.scale;
    }

    /// Pans by a screen-space delta.
    pub fn pan_by(&mut self, dx_px: f64, dy_px: f64) {
        self.x -= dx_px / self.scale;
        self.y -= dy_px / self.scale;
    }

    /// Centers the camera on a world point for the given viewport size.
    pub fn center_on(&mut self, world: &Point, view_width: f64, view_height: f64) {
        self.x = world.x - view_width / (2.0 * self.scale);
        self.y = world.y - view_height / (2.0 * self.scale);
    }

    /// Fits the given world bounds into the viewport with per-edge padding
    /// (fraction of the viewport). Degenerate bounds are ignored.
    pub fn fit_to_bounds(&mut self, bounds: &Bounds, view_width: f64, view_height: f64, padding: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let padding_factor = 1.0 - (padding * 2.0);
        let scale_x = (view_width * padding_factor) / bounds.width();
        let scale_y = (view_height * padding_factor) / bounds.height();
        self.scale = scale_x.min(scale_y).clamp(MIN_ZOOM, MAX_ZOOM);
        self.center_on(&bounds.center(), view_width, view_height);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
