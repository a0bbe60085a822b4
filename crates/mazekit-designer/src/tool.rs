//! The host-facing tool contract.
//!
//! The host UI owns the window, the painting surface, and the event loop; a
//! tool receives pointer events already converted to world coordinates and
//! draws its transient affordances (selection box, handles, marquee, snap
//! markers) through the [`OverlayContext`] abstraction. Splitting the drawing
//! ops behind a trait keeps the engine free of any rendering dependency and
//! testable without a window.

use mazekit_core::geometry::{Bounds, Point};

use crate::document::DocumentStore;
use crate::viewport::Camera;

/// Modifier-key state sampled per pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Axis constraint while moving, uniform scaling, 15-degree rotation
    /// steps, and multi-select on click.
    pub shift: bool,
    /// Toggles grid snapping for the duration of the event.
    pub ctrl: bool,
    /// Duplicate-on-move.
    pub alt: bool,
}

/// One pointer event in world coordinates.
///
/// `time_ms` is the host event timestamp, used only for double-click
/// detection; any monotonic millisecond clock works.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub world: Point,
    pub modifiers: Modifiers,
    pub time_ms: u64,
}

impl PointerEvent {
    /// Creates a pointer event with no modifiers at time zero.
    pub fn at(world: Point) -> Self {
        Self {
            world,
            modifiers: Modifiers::default(),
            time_ms: 0,
        }
    }

    /// Returns a copy with the given modifier state.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Returns a copy with the given timestamp.
    pub fn with_time(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }
}

/// Marker styles for small overlay glyphs (handles, vertices, snap target).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    ScaleHandle,
    Vertex,
    VertexSelected,
    SnapTarget,
}

/// Drawing operations the host implements to paint tool overlays.
///
/// All coordinates are in world units; the host applies the camera transform
/// when rasterizing.
pub trait OverlayContext {
    /// Draws a line segment.
    fn line(&mut self, a: Point, b: Point);

    /// Draws an unfilled rectangle (selection box, marquee).
    fn rect(&mut self, bounds: Bounds);

    /// Draws an unfilled circle (rotation handle).
    fn circle(&mut self, center: Point, radius: f64);

    /// Draws a small glyph centered on a point.
    fn marker(&mut self, at: Point, style: MarkerStyle);
}

/// An interactive canvas tool driven by pointer events.
///
/// All methods are synchronous; a gesture lasts from pointer-down to
/// pointer-up or pointer-leave, whichever comes first.
pub trait Tool {
    fn on_pointer_down(&mut self, doc: &mut dyn DocumentStore, event: &PointerEvent);

    fn on_pointer_move(&mut self, doc: &mut dyn DocumentStore, event: &PointerEvent);

    fn on_pointer_up(&mut self, doc: &mut dyn DocumentStore, event: &PointerEvent);

    /// The pointer left the canvas: abort any in-flight gesture. Transient
    /// state is discarded; mutations already applied are kept.
    fn on_pointer_leave(&mut self, doc: &mut dyn DocumentStore);

    /// Draws the tool's transient affordances.
    fn render_overlay(&self, doc: &dyn DocumentStore, ctx: &mut dyn OverlayContext, camera: &Camera);
}
