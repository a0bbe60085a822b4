//! Transform engine: move, copy, scale, and rotate the selection.
//!
//! Every frame of a gesture recomputes the new geometry from the
//! gesture-start point snapshot plus the total drag delta, never by
//! composing frame-to-frame deltas. Incremental composition accumulates
//! floating-point error and breaks the undo baseline; the snapshot map is
//! allocated at gesture start and dropped at gesture end.

use std::collections::HashMap;

use mazekit_core::constants::{ROTATION_SNAP_DEGREES, SCALE_FACTOR_FLOOR};
use mazekit_core::error::{DesignError, Result};
use mazekit_core::geometry::{Bounds, Point};
use tracing::debug;

use crate::document::DocumentStore;
use crate::hit_test::{combined_bounds, Handle};
use crate::model::ElementSpec;
use crate::tool::Modifiers;

/// Gesture-start geometry of one element.
#[derive(Debug, Clone)]
struct ElementSnapshot {
    points: Vec<Point>,
    holes: Vec<Vec<Point>>,
}

/// Transient state of one transform gesture, created on pointer-down over a
/// handle and destroyed on pointer-up or leave.
#[derive(Debug)]
pub struct TransformGesture {
    handle: Handle,
    start_pos: Point,
    start_bounds: Bounds,
    start: HashMap<u64, ElementSnapshot>,
    copied: bool,
}

impl TransformGesture {
    /// Starts a transform gesture on the current selection.
    ///
    /// Captures exactly one undo snapshot before any mutation. Fails when the
    /// selection is empty, or when a scale handle is grabbed on zero-area
    /// bounds.
    pub fn begin(doc: &mut dyn DocumentStore, handle: Handle, start_pos: Point) -> Result<Self> {
        let selection = doc.selection().clone();
        if selection.is_empty() {
            return Err(DesignError::EmptySelection);
        }

        let selected = doc
            .elements()
            .iter()
            .filter(|e| selection.contains(&e.id));
        let start_bounds = combined_bounds(selected).ok_or(DesignError::EmptySelection)?;
        if handle.is_scale() && start_bounds.is_degenerate() {
            return Err(DesignError::DegenerateBounds);
        }

        let start: HashMap<u64, ElementSnapshot> = doc
            .elements()
            .iter()
            .filter(|e| selection.contains(&e.id))
            .map(|e| {
                (
                    e.id,
                    ElementSnapshot {
                        points: e.points.clone(),
                        holes: e.holes.clone(),
                    },
                )
            })
            .collect();

        doc.push_undo_snapshot();
        debug!(?handle, elements = start.len(), "transform gesture started");

        Ok(Self {
            handle,
            start_pos,
            start_bounds,
            start,
            copied: false,
        })
    }

    /// The handle this gesture is dragging.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// The combined selection bounds at gesture start.
    pub fn start_bounds(&self) -> Bounds {
        self.start_bounds
    }

    /// Whether the duplicate step of a copy-move has already run.
    pub fn copied(&self) -> bool {
        self.copied
    }

    /// Applies the gesture for the current cursor position. `grid` is the
    /// grid spacing when grid snapping is active for this event.
    ///
    /// A frame updates all snapshotted elements or none: if any of them has
    /// vanished from the store since the last event, the whole frame is
    /// rejected before the first mutation.
    pub fn update(
        &mut self,
        doc: &mut dyn DocumentStore,
        cursor: Point,
        modifiers: Modifiers,
        grid: Option<f64>,
    ) -> Result<()> {
        if let Some(id) = self
            .start
            .keys()
            .copied()
            .find(|id| doc.get(*id).is_none())
        {
            return Err(DesignError::UnknownElement { id });
        }
        match self.handle {
            Handle::Move => {
                if modifiers.alt && !self.copied {
                    self.duplicate_selection(doc)?;
                }
                self.apply_move(doc, cursor, modifiers.shift, grid)
            }
            Handle::Rotate => self.apply_rotate(doc, cursor, modifiers.shift),
            _ => self.apply_scale(doc, cursor, modifiers.shift),
        }
    }

    /// Clones every selected element exactly once, reselects the clones, and
    /// retargets the gesture snapshot at them. The originals are restored to
    /// their gesture-start geometry and stay put.
    fn duplicate_selection(&mut self, doc: &mut dyn DocumentStore) -> Result<()> {
        let ids: Vec<u64> = self.start.keys().copied().collect();
        let mut clone_ids = Vec::with_capacity(ids.len());
        let mut new_start = HashMap::with_capacity(ids.len());

        for id in ids {
            let snapshot = &self.start[&id];
            // Original reverts to where the gesture found it.
            doc.update_element_geometry(id, snapshot.points.clone(), None)?;
            doc.update_element_holes(id, snapshot.holes.clone())?;

            let original = doc.get(id).ok_or(DesignError::UnknownElement { id })?;
            let clone_id = doc.add_element(ElementSpec::from(original));
            clone_ids.push(clone_id);
            new_start.insert(clone_id, snapshot.clone());
        }

        doc.set_selection(&clone_ids);
        self.start = new_start;
        self.copied = true;
        debug!(clones = clone_ids.len(), "copy-move duplicated selection");
        Ok(())
    }

    fn apply_move(
        &self,
        doc: &mut dyn DocumentStore,
        cursor: Point,
        axis_constrain: bool,
        grid: Option<f64>,
    ) -> Result<()> {
        // Grid snap rounds the destination before the delta is taken.
        let destination = match grid {
            Some(g) => Point::new((cursor.x / g).round() * g, (cursor.y / g).round() * g),
            None => cursor,
        };
        let mut dx = destination.x - self.start_pos.x;
        let mut dy = destination.y - self.start_pos.y;
        if axis_constrain {
            if dx.abs() >= dy.abs() {
                dy = 0.0;
            } else {
                dx = 0.0;
            }
        }

        for (&id, snapshot) in &self.start {
            let points = snapshot
                .points
                .iter()
                .map(|p| Point::new(p.x + dx, p.y + dy))
                .collect();
            doc.update_element_geometry(id, points, None)?;
            if !snapshot.holes.is_empty() {
                let holes = snapshot
                    .holes
                    .iter()
                    .map(|ring| ring.iter().map(|p| Point::new(p.x + dx, p.y + dy)).collect())
                    .collect();
                doc.update_element_holes(id, holes)?;
            }
        }
        Ok(())
    }

    fn apply_scale(&self, doc: &mut dyn DocumentStore, cursor: Point, uniform: bool) -> Result<()> {
        let width = self.start_bounds.width();
        let height = self.start_bounds.height();
        if width.abs() < 1e-9 || height.abs() < 1e-9 {
            return Ok(());
        }

        let dx = cursor.x - self.start_pos.x;
        let dy = cursor.y - self.start_pos.y;

        // Dragging the min-side handles shrinks the box for a positive delta.
        let signed_dx = match self.handle {
            Handle::Nw | Handle::Sw | Handle::W => -dx,
            _ => dx,
        };
        let signed_dy = match self.handle {
            Handle::Nw | Handle::Ne | Handle::N => -dy,
            _ => dy,
        };

        let mut fx = if self.handle.scales_x() {
            (width + signed_dx) / width
        } else {
            1.0
        };
        let mut fy = if self.handle.scales_y() {
            (height + signed_dy) / height
        } else {
            1.0
        };

        if uniform {
            if self.handle.scales_x() && self.handle.scales_y() {
                let avg = (fx.abs() + fy.abs()) / 2.0;
                fx = avg.copysign(fx);
                fy = avg.copysign(fy);
            } else if self.handle.scales_x() {
                fy = fx.abs();
            } else {
                fx = fy.abs();
            }
        }

        // Signed floor: magnitude clamps at the floor but the sign survives,
        // so mirroring through zero stays possible.
        if fx.abs() < SCALE_FACTOR_FLOOR {
            fx = SCALE_FACTOR_FLOOR.copysign(fx);
        }
        if fy.abs() < SCALE_FACTOR_FLOOR {
            fy = SCALE_FACTOR_FLOOR.copysign(fy);
        }

        let anchor = self.handle.anchor(&self.start_bounds);
        let map = |p: &Point| {
            Point::new(
                anchor.x + (p.x - anchor.x) * fx,
                anchor.y + (p.y - anchor.y) * fy,
            )
        };

        for (&id, snapshot) in &self.start {
            let points = snapshot.points.iter().map(map).collect();
            doc.update_element_geometry(id, points, None)?;
            if !snapshot.holes.is_empty() {
                let holes = snapshot
                    .holes
                    .iter()
                    .map(|ring| ring.iter().map(map).collect())
                    .collect();
                doc.update_element_holes(id, holes)?;
            }
        }
        Ok(())
    }

    fn apply_rotate(&self, doc: &mut dyn DocumentStore, cursor: Point, snap_angle: bool) -> Result<()> {
        let center = self.start_bounds.center();
        let start_angle = (self.start_pos.y - center.y).atan2(self.start_pos.x - center.x);
        let cursor_angle = (cursor.y - center.y).atan2(cursor.x - center.x);
        let mut delta = cursor_angle - start_angle;

        if snap_angle {
            let step = ROTATION_SNAP_DEGREES.to_radians();
            delta = (delta / step).round() * step;
        }

        let (sin, cos) = delta.sin_cos();
        let map = |p: &Point| {
            let rx = p.x - center.x;
            let ry = p.y - center.y;
            Point::new(center.x + rx * cos - ry * sin, center.y + rx * sin + ry * cos)
        };

        for (&id, snapshot) in &self.start {
            let points = snapshot.points.iter().map(map).collect();
            // Baking the rotation into the points resets the residual field.
            doc.update_element_geometry(id, points, Some(0.0))?;
            if !snapshot.holes.is_empty() {
                let holes = snapshot
                    .holes
                    .iter()
                    .map(|ring| ring.iter().map(map).collect())
                    .collect();
                doc.update_element_holes(id, holes)?;
            }
        }
        Ok(())
    }
}
