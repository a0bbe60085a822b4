//! The selection tool: click/marquee selection, handle-driven transforms,
//! vertex editing, and snap feedback.
//!
//! This is the default tool of the maze surface. A single state machine owns
//! the gesture lifecycle: pointer-down decides between grabbing a handle,
//! selecting an element, starting a marquee, or entering a vertex drag;
//! pointer-move feeds the active gesture; pointer-up commits it and arms the
//! constraint revalidation debounce. Pointer-leave aborts the gesture without
//! rolling back mutations already applied (undo covers the rollback).

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use mazekit_core::constants::{
    DOUBLE_CLICK_DISTANCE_PX, DOUBLE_CLICK_WINDOW_MS, HANDLE_SIZE_PX, HIT_TOLERANCE_PX,
    REVALIDATE_DEBOUNCE_MS, ROTATION_HANDLE_OFFSET_PX,
};
use mazekit_core::geometry::{Bounds, Point};
use tracing::debug;

use crate::document::DocumentStore;
use crate::hit_test::{
    combined_bounds, find_vertex_at_position, hit_test_element, hit_test_handles, hit_test_scene,
    Handle,
};
use crate::revalidate::{run_validation, ConstraintThresholds, ConstraintValidator, Debounce, Violation};
use crate::snap::{SnapEngine, SnapKinds, SnapResult};
use crate::tool::{MarkerStyle, Modifiers, OverlayContext, PointerEvent, Tool};
use crate::transform::TransformGesture;
use crate::viewport::Camera;

/// What the tool is currently doing, pointer-down to pointer-up.
#[derive(Debug)]
enum ToolState {
    Idle,
    /// Rubber-band selection from an empty-space press.
    Marquee {
        start: Point,
        current: Point,
        additive: bool,
    },
    /// A handle drag routed through the transform engine.
    Transform(TransformGesture),
    /// Dragging the selected vertices of the vertex-edit target.
    VertexDrag {
        id: u64,
        start_cursor: Point,
        start_points: Vec<Point>,
    },
}

/// The interactive selection/transform tool.
pub struct SelectTool {
    state: ToolState,
    camera_scale: f64,
    snap: SnapEngine,
    snap_kinds: SnapKinds,
    grid_enabled: bool,
    last_click: Option<(u64, Point)>,
    last_snap: Option<SnapResult>,
    debounce: Debounce,
    thresholds: ConstraintThresholds,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            state: ToolState::Idle,
            camera_scale: 1.0,
            snap: SnapEngine::new(),
            snap_kinds: SnapKinds::all(),
            grid_enabled: true,
            last_click: None,
            last_snap: None,
            debounce: Debounce::new(Duration::from_millis(REVALIDATE_DEBOUNCE_MS)),
            thresholds: ConstraintThresholds::default(),
        }
    }

    /// Keeps hit tolerances and the snap radius honest after a zoom change.
    pub fn set_camera_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.camera_scale = scale;
            self.snap.set_camera_scale(scale);
        }
    }

    /// Configures the grid spacing; `None` removes the grid entirely.
    pub fn set_grid(&mut self, grid: Option<f64>) {
        self.snap.set_grid(grid);
    }

    /// Enables or disables grid snapping (Ctrl inverts this per event).
    pub fn set_grid_enabled(&mut self, enabled: bool) {
        self.grid_enabled = enabled;
    }

    /// Restricts which anchor kinds snap queries consider.
    pub fn set_snap_kinds(&mut self, kinds: SnapKinds) {
        self.snap_kinds = kinds;
    }

    /// Sets the thresholds sent with revalidation requests.
    pub fn set_thresholds(&mut self, thresholds: ConstraintThresholds) {
        self.thresholds = thresholds;
    }

    /// The snap resolved by the most recent pointer-move, for host status UI.
    pub fn active_snap(&self) -> Option<SnapResult> {
        self.last_snap
    }

    /// True when no gesture is in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, ToolState::Idle)
    }

    /// True while a transform gesture is running.
    pub fn is_transforming(&self) -> bool {
        matches!(self.state, ToolState::Transform(_))
    }

    /// True when revalidation is armed but has not fired yet.
    pub fn revalidation_pending(&self) -> bool {
        self.debounce.pending()
    }

    /// Per-frame poll: fires the debounced constraint revalidation when due.
    /// The transport result goes to `on_report`; failures are logged and do
    /// not block editing.
    pub fn tick(
        &mut self,
        doc: &dyn DocumentStore,
        now: Instant,
        validator: &mut dyn ConstraintValidator,
        on_report: &mut dyn FnMut(Vec<Violation>),
    ) {
        if self.debounce.fire_if_elapsed(now) {
            run_validation(validator, doc.elements(), self.thresholds, on_report);
        }
    }

    /// Grid spacing in effect for one event: the configured grid with the
    /// enabled flag, inverted while Ctrl is held.
    fn effective_grid(&self, modifiers: &Modifiers) -> Option<f64> {
        let enabled = self.grid_enabled != modifiers.ctrl;
        if enabled {
            self.snap.grid()
        } else {
            None
        }
    }

    fn hit_tolerance(&self) -> f64 {
        HIT_TOLERANCE_PX / self.camera_scale
    }

    /// Half-extent of a square scale handle, in world units.
    fn handle_half_size(&self) -> f64 {
        HANDLE_SIZE_PX / (2.0 * self.camera_scale)
    }

    fn rotation_offset(&self) -> f64 {
        ROTATION_HANDLE_OFFSET_PX / self.camera_scale
    }

    fn is_double_click(&self, event: &PointerEvent) -> bool {
        match self.last_click {
            Some((t, pos)) => {
                event.time_ms.saturating_sub(t) <= DOUBLE_CLICK_WINDOW_MS
                    && pos.distance_to(&event.world)
                        <= DOUBLE_CLICK_DISTANCE_PX / self.camera_scale
            }
            None => false,
        }
    }

    fn selection_bounds(&self, doc: &dyn DocumentStore) -> Option<Bounds> {
        let selection = doc.selection();
        if selection.is_empty() {
            return None;
        }
        combined_bounds(doc.elements().iter().filter(|e| selection.contains(&e.id)))
    }

    fn toggle_selection(doc: &mut dyn DocumentStore, id: u64) {
        let mut ids: Vec<u64> = doc.selection().iter().copied().collect();
        if let Some(pos) = ids.iter().position(|&i| i == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        doc.set_selection(&ids);
    }

    fn begin_transform(&mut self, doc: &mut dyn DocumentStore, handle: Handle, at: Point) {
        match TransformGesture::begin(doc, handle, at) {
            Ok(gesture) => self.state = ToolState::Transform(gesture),
            Err(error) => {
                debug!(%error, "transform gesture refused");
                self.state = ToolState::Idle;
            }
        }
    }

    /// Pointer-down while a vertex-edit session is open. Returns `true` when
    /// the event was consumed by the session.
    fn vertex_session_pointer_down(
        &mut self,
        doc: &mut dyn DocumentStore,
        event: &PointerEvent,
    ) -> bool {
        let Some(target_id) = doc.vertex_edit_target() else {
            return false;
        };
        let Some(target) = doc.get(target_id) else {
            return false;
        };
        let p = event.world;
        let tolerance = self.hit_tolerance();

        if let Some(index) = find_vertex_at_position(&p, target, tolerance) {
            if event.modifiers.shift {
                doc.toggle_vertex(index);
            } else if !doc.selected_vertex_indices().contains(&index) {
                doc.set_selected_vertices(&[index]);
            }
            if !doc.selected_vertex_indices().is_empty() {
                let start_points = doc
                    .get(target_id)
                    .map(|e| e.points.clone())
                    .unwrap_or_default();
                doc.push_undo_snapshot();
                self.state = ToolState::VertexDrag {
                    id: target_id,
                    start_cursor: p,
                    start_points,
                };
            }
            return true;
        }

        if hit_test_element(&p, target, tolerance) {
            // Body click inside the session: just drop the vertex selection.
            doc.set_selected_vertices(&[]);
            return true;
        }

        // Clicked away from the target: the session ends and the press falls
        // through to normal selection handling.
        let _ = doc.enter_vertex_edit(None);
        false
    }

    /// Resolves the cursor for a drag: snap anchors first, then the grid as
    /// a forced-rounding fallback. Returns the cursor to feed the gesture and
    /// the grid spacing it should round the destination to.
    fn snapped_cursor(
        &mut self,
        doc: &dyn DocumentStore,
        cursor: Point,
        modifiers: &Modifiers,
        exclude: &BTreeSet<u64>,
    ) -> (Point, Option<f64>) {
        let grid = self.effective_grid(modifiers);
        let mut kinds = self.snap_kinds;
        kinds.grid = kinds.grid && grid.is_some();

        self.snap.prepare(doc.elements(), exclude, doc.revision());
        match self.snap.find_snap(&cursor, &kinds) {
            Some(snap) => {
                self.last_snap = Some(snap);
                (snap.point, None)
            }
            None => {
                self.last_snap = None;
                (cursor, grid)
            }
        }
    }
}

impl Tool for SelectTool {
    fn on_pointer_down(&mut self, doc: &mut dyn DocumentStore, event: &PointerEvent) {
        let p = event.world;
        let double = self.is_double_click(event);
        // A consumed double-click resets the chain so a triple-click does not
        // count as another double.
        self.last_click = if double {
            None
        } else {
            Some((event.time_ms, p))
        };

        if self.vertex_session_pointer_down(doc, event) {
            return;
        }

        if double {
            if let Some(id) = hit_test_scene(&p, doc.elements(), self.hit_tolerance()) {
                doc.set_selection(&[id]);
                let _ = doc.enter_vertex_edit(Some(id));
                // The vertex nearest the click starts out selected.
                if let Some(index) = doc
                    .get(id)
                    .and_then(|e| find_vertex_at_position(&p, e, f64::INFINITY))
                {
                    doc.set_selected_vertices(&[index]);
                }
                self.state = ToolState::Idle;
                debug!(id, "vertex edit session opened");
                return;
            }
        }

        // Transform handles of the current selection take priority over the
        // scene: the rotation handle and corner handles extend past element
        // geometry.
        if let Some(bounds) = self.selection_bounds(doc) {
            let handle = hit_test_handles(
                &p,
                &bounds,
                self.handle_half_size(),
                self.rotation_offset(),
            );
            match handle {
                Some(Handle::Move) => {
                    // The move region covers the whole box; a press on an
                    // unselected element inside it retargets the selection.
                    let hit = hit_test_scene(&p, doc.elements(), self.hit_tolerance());
                    if event.modifiers.shift {
                        if let Some(id) = hit {
                            Self::toggle_selection(doc, id);
                        }
                        return;
                    }
                    if let Some(id) = hit {
                        if !doc.selection().contains(&id) {
                            doc.set_selection(&[id]);
                        }
                    }
                    self.begin_transform(doc, Handle::Move, p);
                    return;
                }
                Some(handle) => {
                    self.begin_transform(doc, handle, p);
                    return;
                }
                None => {}
            }
        }

        match hit_test_scene(&p, doc.elements(), self.hit_tolerance()) {
            Some(id) => {
                if event.modifiers.shift {
                    Self::toggle_selection(doc, id);
                } else {
                    doc.set_selection(&[id]);
                    self.begin_transform(doc, Handle::Move, p);
                }
            }
            None => {
                if !event.modifiers.shift {
                    doc.set_selection(&[]);
                }
                self.state = ToolState::Marquee {
                    start: p,
                    current: p,
                    additive: event.modifiers.shift,
                };
            }
        }
    }

    fn on_pointer_move(&mut self, doc: &mut dyn DocumentStore, event: &PointerEvent) {
        let p = event.world;
        match std::mem::replace(&mut self.state, ToolState::Idle) {
            ToolState::Idle => {
                self.last_snap = None;
            }
            ToolState::Marquee {
                start, additive, ..
            } => {
                self.state = ToolState::Marquee {
                    start,
                    current: p,
                    additive,
                };
            }
            ToolState::Transform(mut gesture) => {
                // Snap feedback applies to move drags only; scale and rotate
                // follow the raw cursor.
                let (cursor, grid) = if gesture.handle() == Handle::Move {
                    let exclude = doc.selection().clone();
                    self.snapped_cursor(doc, p, &event.modifiers, &exclude)
                } else {
                    self.last_snap = None;
                    (p, None)
                };
                match gesture.update(doc, cursor, event.modifiers, grid) {
                    Ok(()) => self.state = ToolState::Transform(gesture),
                    Err(error) => {
                        debug!(%error, "transform update failed; gesture dropped");
                    }
                }
            }
            ToolState::VertexDrag {
                id,
                start_cursor,
                start_points,
            } => {
                let exclude: BTreeSet<u64> = [id].into_iter().collect();
                let (cursor, grid) = self.snapped_cursor(doc, p, &event.modifiers, &exclude);
                let destination = match grid {
                    Some(g) => Point::new((cursor.x / g).round() * g, (cursor.y / g).round() * g),
                    None => cursor,
                };
                let dx = destination.x - start_cursor.x;
                let dy = destination.y - start_cursor.y;

                // Recompute from the drag-start points so the frame stream
                // stays lossless, same rule as the transform engine.
                let indices = doc.selected_vertex_indices().clone();
                let points: Vec<Point> = start_points
                    .iter()
                    .enumerate()
                    .map(|(i, q)| {
                        if indices.contains(&i) {
                            Point::new(q.x + dx, q.y + dy)
                        } else {
                            *q
                        }
                    })
                    .collect();
                match doc.update_element_geometry(id, points, None) {
                    Ok(()) => {
                        self.state = ToolState::VertexDrag {
                            id,
                            start_cursor,
                            start_points,
                        };
                    }
                    Err(error) => {
                        debug!(%error, "vertex drag target vanished; gesture dropped");
                    }
                }
            }
        }
    }

    fn on_pointer_up(&mut self, doc: &mut dyn DocumentStore, _event: &PointerEvent) {
        let finished = std::mem::replace(&mut self.state, ToolState::Idle);
        self.last_snap = None;
        match finished {
            ToolState::Marquee {
                start,
                current,
                additive,
            } => {
                // A stationary press was just a click; selection handling
                // already ran on pointer-down.
                if start.distance_to(&current) <= self.hit_tolerance() {
                    return;
                }
                let rect = Bounds::new(
                    start.x.min(current.x),
                    start.y.min(current.y),
                    start.x.max(current.x),
                    start.y.max(current.y),
                );
                let mut ids: Vec<u64> = if additive {
                    doc.selection().iter().copied().collect()
                } else {
                    Vec::new()
                };
                for element in doc.elements() {
                    if element.bounds().intersects(&rect) && !ids.contains(&element.id) {
                        ids.push(element.id);
                    }
                }
                debug!(count = ids.len(), "marquee selection");
                doc.set_selection(&ids);
            }
            ToolState::Transform(_) | ToolState::VertexDrag { .. } => {
                self.debounce.arm();
            }
            ToolState::Idle => {}
        }
    }

    fn on_pointer_leave(&mut self, _doc: &mut dyn DocumentStore) {
        // Abort: transient state goes away, applied mutations stay. Undo
        // still lands on the pre-gesture baseline.
        let aborted = matches!(
            self.state,
            ToolState::Transform(_) | ToolState::VertexDrag { .. }
        );
        self.state = ToolState::Idle;
        self.last_snap = None;
        if aborted {
            debug!("gesture aborted by pointer leave");
            self.debounce.arm();
        }
    }

    fn render_overlay(&self, doc: &dyn DocumentStore, ctx: &mut dyn OverlayContext, camera: &Camera) {
        let rotation_offset = ROTATION_HANDLE_OFFSET_PX / camera.scale;

        if let Some(target_id) = doc.vertex_edit_target() {
            if let Some(target) = doc.get(target_id) {
                let selected = doc.selected_vertex_indices();
                for (a, b) in target.edges() {
                    ctx.line(a, b);
                }
                for (i, p) in target.points.iter().enumerate() {
                    let style = if selected.contains(&i) {
                        MarkerStyle::VertexSelected
                    } else {
                        MarkerStyle::Vertex
                    };
                    ctx.marker(*p, style);
                }
            }
        } else if let Some(bounds) = self.selection_bounds(doc) {
            ctx.rect(bounds);
            for handle in Handle::CORNERS.iter().chain(Handle::EDGES.iter()) {
                ctx.marker(handle.position(&bounds, rotation_offset), MarkerStyle::ScaleHandle);
            }
            let top_center = Handle::N.position(&bounds, rotation_offset);
            let rotate = Handle::Rotate.position(&bounds, rotation_offset);
            ctx.line(top_center, rotate);
            ctx.circle(rotate, HANDLE_SIZE_PX / (2.0 * camera.scale));
        }

        if let ToolState::Marquee { start, current, .. } = &self.state {
            ctx.rect(Bounds::new(
                start.x.min(current.x),
                start.y.min(current.y),
                start.x.max(current.x),
                start.y.max(current.y),
            ));
        }

        if let Some(snap) = &self.last_snap {
            ctx.marker(snap.point, MarkerStyle::SnapTarget);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::model::ElementSpec;
    use crate::revalidate::RevalidationRequest;

    fn scene() -> (Document, u64, u64) {
        let mut doc = Document::new();
        let a = doc.add_element(ElementSpec::rectangle(0.0, 0.0, 10.0, 10.0, 0.0));
        let b = doc.add_element(ElementSpec::rectangle(30.0, 0.0, 10.0, 10.0, 0.0));
        (doc, a, b)
    }

    fn press(tool: &mut SelectTool, doc: &mut Document, at: Point) {
        tool.on_pointer_down(doc, &PointerEvent::at(at));
    }

    fn release(tool: &mut SelectTool, doc: &mut Document, at: Point) {
        tool.on_pointer_up(doc, &PointerEvent::at(at));
    }

    fn click(tool: &mut SelectTool, doc: &mut Document, at: Point) {
        press(tool, doc, at);
        release(tool, doc, at);
    }

    #[test]
    fn click_selects_element_click_empty_clears() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();

        click(&mut tool, &mut doc, Point::new(5.0, 5.0));
        assert!(doc.selection().contains(&a));

        click(&mut tool, &mut doc, Point::new(100.0, 100.0));
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn shift_click_toggles_membership() {
        let (mut doc, a, b) = scene();
        let mut tool = SelectTool::new();
        let shift = Modifiers { shift: true, ..Default::default() };

        click(&mut tool, &mut doc, Point::new(5.0, 5.0));
        tool.on_pointer_down(&mut doc, &PointerEvent::at(Point::new(35.0, 5.0)).with_modifiers(shift));
        tool.on_pointer_up(&mut doc, &PointerEvent::at(Point::new(35.0, 5.0)).with_modifiers(shift));
        assert!(doc.selection().contains(&a) && doc.selection().contains(&b));

        tool.on_pointer_down(&mut doc, &PointerEvent::at(Point::new(5.0, 5.0)).with_modifiers(shift));
        tool.on_pointer_up(&mut doc, &PointerEvent::at(Point::new(5.0, 5.0)).with_modifiers(shift));
        assert!(!doc.selection().contains(&a));
        assert!(doc.selection().contains(&b));
    }

    #[test]
    fn body_drag_moves_selection() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();
        tool.set_grid(None);

        press(&mut tool, &mut doc, Point::new(5.0, 5.0));
        assert!(tool.is_transforming());
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(12.0, 5.0)));
        release(&mut tool, &mut doc, Point::new(12.0, 5.0));

        assert_eq!(doc.get(a).unwrap().points[0], Point::new(7.0, 0.0));
        assert!(tool.is_idle());
    }

    #[test]
    fn corner_handle_drag_scales() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();
        doc.set_selection(&[a]);

        press(&mut tool, &mut doc, Point::new(10.0, 10.0)); // Se corner
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(20.0, 20.0)));
        release(&mut tool, &mut doc, Point::new(20.0, 20.0));

        let el = doc.get(a).unwrap();
        assert_eq!(el.points[0], Point::new(0.0, 0.0));
        assert_eq!(el.points[2], Point::new(20.0, 20.0));
    }

    #[test]
    fn marquee_selects_intersecting_elements() {
        let (mut doc, a, b) = scene();
        let mut tool = SelectTool::new();

        // Sweep from empty space across the right edge of `a` only.
        press(&mut tool, &mut doc, Point::new(-5.0, -5.0));
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(8.0, 15.0)));
        release(&mut tool, &mut doc, Point::new(8.0, 15.0));
        assert!(doc.selection().contains(&a));
        assert!(!doc.selection().contains(&b));

        // Sweep touching both: partial overlap is enough.
        press(&mut tool, &mut doc, Point::new(-5.0, -5.0));
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(32.0, 15.0)));
        release(&mut tool, &mut doc, Point::new(32.0, 15.0));
        assert_eq!(doc.selection().len(), 2);
    }

    #[test]
    fn move_snaps_cursor_to_neighbor_endpoint() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();
        tool.set_grid(None);

        // Drag `a` by its center; cursor ends near the (30,0) corner of `b`.
        press(&mut tool, &mut doc, Point::new(5.0, 5.0));
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(29.6, 0.3)));
        let snap = tool.active_snap().expect("endpoint in range");
        assert_eq!(snap.point, Point::new(30.0, 0.0));
        release(&mut tool, &mut doc, Point::new(29.6, 0.3));

        // Total delta is the snapped cursor minus the press point.
        assert_eq!(doc.get(a).unwrap().points[0], Point::new(25.0, -5.0));
    }

    #[test]
    fn ctrl_inverts_grid_snapping() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();
        tool.set_grid(Some(10.0));
        let mut kinds = SnapKinds::none();
        kinds.grid = true;
        tool.set_snap_kinds(kinds);

        press(&mut tool, &mut doc, Point::new(5.0, 5.0));
        let ctrl = Modifiers { ctrl: true, ..Default::default() };
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(17.3, 5.2)).with_modifiers(ctrl));
        release(&mut tool, &mut doc, Point::new(17.3, 5.2));

        // Grid suppressed: the raw delta lands unrounded.
        let p = doc.get(a).unwrap().points[0];
        assert!((p.x - 12.3).abs() < 1e-9 && (p.y - 0.2).abs() < 1e-9);
    }

    #[test]
    fn double_click_enters_vertex_edit_and_click_away_exits() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();

        click(&mut tool, &mut doc, Point::new(5.0, 5.0));
        tool.on_pointer_down(&mut doc, &PointerEvent::at(Point::new(5.0, 4.0)).with_time(200));
        tool.on_pointer_up(&mut doc, &PointerEvent::at(Point::new(5.0, 4.0)).with_time(200));
        assert_eq!(doc.vertex_edit_target(), Some(a));
        // Nearest corner of the square starts out selected.
        assert!(doc.selected_vertex_indices().contains(&0));

        // Away from the target: session ends, empty space clears selection.
        click(&mut tool, &mut doc, Point::new(100.0, 100.0));
        assert_eq!(doc.vertex_edit_target(), None);
    }

    #[test]
    fn slow_second_click_is_not_a_double() {
        let (mut doc, _, _) = scene();
        let mut tool = SelectTool::new();

        click(&mut tool, &mut doc, Point::new(5.0, 5.0));
        tool.on_pointer_down(&mut doc, &PointerEvent::at(Point::new(5.0, 5.0)).with_time(900));
        tool.on_pointer_up(&mut doc, &PointerEvent::at(Point::new(5.0, 5.0)).with_time(900));
        assert_eq!(doc.vertex_edit_target(), None);
    }

    #[test]
    fn vertex_drag_moves_only_selected_vertices() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();
        tool.set_grid(None);
        doc.set_selection(&[a]);
        doc.enter_vertex_edit(Some(a)).unwrap();

        // Grab the (0,0) corner and drag it.
        press(&mut tool, &mut doc, Point::new(0.0, 0.0));
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(-4.0, -3.0)));
        release(&mut tool, &mut doc, Point::new(-4.0, -3.0));

        let el = doc.get(a).unwrap();
        assert_eq!(el.points[0], Point::new(-4.0, -3.0));
        assert_eq!(el.points[1], Point::new(10.0, 0.0), "unselected vertex untouched");
    }

    #[test]
    fn vertex_drag_pushes_one_undo_snapshot() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();
        tool.set_grid(None);
        doc.enter_vertex_edit(Some(a)).unwrap();

        press(&mut tool, &mut doc, Point::new(0.0, 0.0));
        for i in 1..10 {
            tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(-(i as f64), 0.0)));
        }
        release(&mut tool, &mut doc, Point::new(-9.0, 0.0));

        assert_eq!(doc.undo_depth(), 1);
        assert!(doc.undo());
        assert_eq!(doc.get(a).unwrap().points[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn leave_aborts_but_keeps_applied_mutations() {
        let (mut doc, a, _) = scene();
        let mut tool = SelectTool::new();
        tool.set_grid(None);

        press(&mut tool, &mut doc, Point::new(5.0, 5.0));
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(11.0, 5.0)));
        tool.on_pointer_leave(&mut doc);

        assert!(tool.is_idle());
        assert_eq!(doc.get(a).unwrap().points[0], Point::new(6.0, 0.0), "mutation kept");
        assert!(doc.undo());
        assert_eq!(doc.get(a).unwrap().points[0], Point::new(0.0, 0.0), "undo rolls back");
    }

    struct RecordingValidator {
        calls: usize,
    }
    impl ConstraintValidator for RecordingValidator {
        fn validate(&mut self, _: &RevalidationRequest<'_>) -> anyhow::Result<Vec<Violation>> {
            self.calls += 1;
            Ok(vec![Violation {
                element_id: None,
                message: "path narrower than minimum".into(),
            }])
        }
    }

    #[test]
    fn revalidation_fires_once_after_debounce() {
        let (mut doc, _, _) = scene();
        let mut tool = SelectTool::new();
        tool.set_grid(None);
        let mut validator = RecordingValidator { calls: 0 };
        let mut reports = Vec::new();

        press(&mut tool, &mut doc, Point::new(5.0, 5.0));
        tool.on_pointer_move(&mut doc, &PointerEvent::at(Point::new(12.0, 5.0)));
        release(&mut tool, &mut doc, Point::new(12.0, 5.0));
        assert!(tool.revalidation_pending());

        let soon = Instant::now() + Duration::from_millis(10);
        tool.tick(&doc, soon, &mut validator, &mut |v| reports.push(v));
        assert_eq!(validator.calls, 0, "still inside the debounce window");

        let later = Instant::now() + Duration::from_millis(400);
        tool.tick(&doc, later, &mut validator, &mut |v| reports.push(v));
        tool.tick(&doc, later, &mut validator, &mut |v| reports.push(v));
        assert_eq!(validator.calls, 1);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0][0].message, "path narrower than minimum");
    }

    #[derive(Default)]
    struct RecordingOverlay {
        lines: usize,
        rects: usize,
        circles: usize,
        markers: Vec<MarkerStyle>,
    }
    impl OverlayContext for RecordingOverlay {
        fn line(&mut self, _: Point, _: Point) {
            self.lines += 1;
        }
        fn rect(&mut self, _: Bounds) {
            self.rects += 1;
        }
        fn circle(&mut self, _: Point, _: f64) {
            self.circles += 1;
        }
        fn marker(&mut self, _: Point, style: MarkerStyle) {
            self.markers.push(style);
        }
    }

    #[test]
    fn overlay_draws_selection_box_and_handles() {
        let (mut doc, a, _) = scene();
        let tool = SelectTool::new();
        doc.set_selection(&[a]);

        let mut overlay = RecordingOverlay::default();
        tool.render_overlay(&doc, &mut overlay, &Camera::default());

        assert_eq!(overlay.rects, 1, "selection box");
        let scale_handles = overlay
            .markers
            .iter()
            .filter(|m| **m == MarkerStyle::ScaleHandle)
            .count();
        assert_eq!(scale_handles, 8);
        assert_eq!(overlay.circles, 1, "rotation handle ring");
        assert_eq!(overlay.lines, 1, "stem to the rotation handle");
    }

    #[test]
    fn overlay_draws_vertices_in_edit_session() {
        let (mut doc, a, _) = scene();
        let tool = SelectTool::new();
        doc.enter_vertex_edit(Some(a)).unwrap();
        doc.set_selected_vertices(&[2]);

        let mut overlay = RecordingOverlay::default();
        tool.render_overlay(&doc, &mut overlay, &Camera::default());

        let plain = overlay.markers.iter().filter(|m| **m == MarkerStyle::Vertex).count();
        let selected = overlay
            .markers
            .iter()
            .filter(|m| **m == MarkerStyle::VertexSelected)
            .count();
        assert_eq!(plain, 3);
        assert_eq!(selected, 1);
    }
}
