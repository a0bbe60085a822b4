//! Document store: the canonical element list, selection, and undo history.
//!
//! The interaction engine consumes the [`DocumentStore`] trait and never owns
//! elements itself. [`Document`] is the in-memory reference implementation
//! backing the tests; a host application may substitute its own store.
//!
//! Undo snapshots are whole-state: the engine captures exactly one snapshot
//! at gesture start, then streams per-frame geometry updates through the
//! no-history path, so undo lands back on the pre-gesture baseline.

use std::collections::BTreeSet;

use mazekit_core::error::{DesignError, Result};
use mazekit_core::geometry::Point;
use tracing::debug;

use crate::model::{DesignElement, ElementSpec};

/// Maximum number of undo snapshots retained.
const UNDO_STACK_LIMIT: usize = 50;

/// The document/undo store surface consumed by the interaction engine.
///
/// Elements are kept in draw order; the last element is topmost. Mutating
/// calls other than [`DocumentStore::push_undo_snapshot`] never create undo
/// entries on their own.
pub trait DocumentStore {
    /// All elements in draw order (last is topmost).
    fn elements(&self) -> &[DesignElement];

    /// Looks up an element by id.
    fn get(&self, id: u64) -> Option<&DesignElement>;

    /// The current selection. Order-irrelevant.
    fn selection(&self) -> &BTreeSet<u64>;

    /// Replaces the selection. Unknown ids are dropped silently.
    fn set_selection(&mut self, ids: &[u64]);

    /// Replaces an element's geometry without creating an undo entry.
    /// `rotation` of `Some` also overwrites the residual rotation field.
    fn update_element_geometry(
        &mut self,
        id: u64,
        points: Vec<Point>,
        rotation: Option<f64>,
    ) -> Result<()>;

    /// Replaces an element's hole rings without creating an undo entry.
    /// Transforms that bake an affine map into the outline push the same map
    /// through the holes with this call.
    fn update_element_holes(&mut self, id: u64, holes: Vec<Vec<Point>>) -> Result<()>;

    /// Inserts a new element on top of the draw order, returning its id.
    fn add_element(&mut self, spec: ElementSpec) -> u64;

    /// Removes an element. Also drops it from the selection and ends any
    /// vertex-edit session scoped to it.
    fn remove_element(&mut self, id: u64) -> Result<()>;

    /// Captures one undo snapshot of the current state.
    fn push_undo_snapshot(&mut self);

    /// Monotonic counter bumped by every geometry mutation. Used by caches
    /// (snap engine) to detect staleness.
    fn revision(&self) -> u64;

    /// Enters a vertex-edit session on the given element, or exits the
    /// current one when `None`.
    fn enter_vertex_edit(&mut self, id: Option<u64>) -> Result<()>;

    /// The element under vertex edit, if a session is active.
    fn vertex_edit_target(&self) -> Option<u64>;

    /// Selected point indices of the vertex-edit target.
    fn selected_vertex_indices(&self) -> &BTreeSet<usize>;

    /// Replaces the selected vertex set.
    fn set_selected_vertices(&mut self, indices: &[usize]);

    /// Toggles one vertex in or out of the vertex selection.
    fn toggle_vertex(&mut self, index: usize);

    /// Moves every selected vertex of the session target by a delta.
    fn move_selected_vertices(&mut self, dx: f64, dy: f64) -> Result<()>;

    /// Deletes the selected vertices, refusing deletions that would leave an
    /// open element under 2 points or a closed one under 3. All-or-nothing.
    fn delete_selected_vertices(&mut self) -> Result<()>;
}

/// One retained undo/redo state.
#[derive(Debug, Clone)]
struct Snapshot {
    elements: Vec<DesignElement>,
    selection: BTreeSet<u64>,
}

/// In-memory document store with bounded undo/redo.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<DesignElement>,
    selection: BTreeSet<u64>,
    next_id: u64,
    revision: u64,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    vertex_target: Option<u64>,
    vertex_selection: BTreeSet<usize>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            elements: self.elements.clone(),
            selection: self.selection.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.elements = snapshot.elements;
        self.selection = snapshot.selection;
        self.revision += 1;
        // A restored state may no longer contain the session target.
        if let Some(id) = self.vertex_target {
            if !self.elements.iter().any(|e| e.id == id) {
                self.vertex_target = None;
                self.vertex_selection.clear();
            }
        }
    }

    /// Restores the most recent undo snapshot. Returns `false` when the
    /// history is empty.
    pub fn undo(&mut self) -> bool {
        if let Some(snapshot) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(snapshot);
            true
        } else {
            false
        }
    }

    /// Re-applies the most recently undone state.
    pub fn redo(&mut self) -> bool {
        if let Some(snapshot) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(snapshot);
            true
        } else {
            false
        }
    }

    /// True when an undo snapshot is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// True when a redo state is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo snapshots currently retained.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut DesignElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }
}

impl DocumentStore for Document {
    fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    fn get(&self, id: u64) -> Option<&DesignElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn selection(&self) -> &BTreeSet<u64> {
        &self.selection
    }

    fn set_selection(&mut self, ids: &[u64]) {
        self.selection = ids
            .iter()
            .copied()
            .filter(|id| self.elements.iter().any(|e| e.id == *id))
            .collect();
    }

    fn update_element_geometry(
        &mut self,
        id: u64,
        points: Vec<Point>,
        rotation: Option<f64>,
    ) -> Result<()> {
        let element = self
            .get_mut(id)
            .ok_or(DesignError::UnknownElement { id })?;
        element.points = points;
        if let Some(rotation) = rotation {
            element.rotation = rotation;
        }
        self.revision += 1;
        Ok(())
    }

    fn update_element_holes(&mut self, id: u64, holes: Vec<Vec<Point>>) -> Result<()> {
        let element = self
            .get_mut(id)
            .ok_or(DesignError::UnknownElement { id })?;
        element.holes = holes;
        self.revision += 1;
        Ok(())
    }

    fn add_element(&mut self, spec: ElementSpec) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.elements.push(DesignElement {
            id,
            kind: spec.kind,
            points: spec.points,
            closed: spec.closed,
            width: spec.width,
            rotation: spec.rotation,
            holes: spec.holes,
        });
        self.revision += 1;
        id
    }

    fn remove_element(&mut self, id: u64) -> Result<()> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(DesignError::UnknownElement { id })?;
        self.elements.remove(index);
        self.selection.remove(&id);
        if self.vertex_target == Some(id) {
            self.vertex_target = None;
            self.vertex_selection.clear();
        }
        self.revision += 1;
        Ok(())
    }

    fn push_undo_snapshot(&mut self) {
        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();
        if self.undo_stack.len() > UNDO_STACK_LIMIT {
            self.undo_stack.remove(0);
        }
        debug!(depth = self.undo_stack.len(), "undo snapshot captured");
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn enter_vertex_edit(&mut self, id: Option<u64>) -> Result<()> {
        match id {
            Some(id) => {
                if self.get(id).is_none() {
                    return Err(DesignError::UnknownElement { id });
                }
                self.vertex_target = Some(id);
                self.vertex_selection.clear();
            }
            None => {
                self.vertex_target = None;
                self.vertex_selection.clear();
            }
        }
        Ok(())
    }

    fn vertex_edit_target(&self) -> Option<u64> {
        self.vertex_target
    }

    fn selected_vertex_indices(&self) -> &BTreeSet<usize> {
        &self.vertex_selection
    }

    fn set_selected_vertices(&mut self, indices: &[usize]) {
        let limit = self
            .vertex_target
            .and_then(|id| self.get(id))
            .map(|e| e.points.len())
            .unwrap_or(0);
        self.vertex_selection = indices.iter().copied().filter(|i| *i < limit).collect();
    }

    fn toggle_vertex(&mut self, index: usize) {
        if !self.vertex_selection.remove(&index) {
            self.vertex_selection.insert(index);
        }
    }

    fn move_selected_vertices(&mut self, dx: f64, dy: f64) -> Result<()> {
        let id = self.vertex_target.ok_or(DesignError::NoVertexSession)?;
        let indices = self.vertex_selection.clone();
        let element = self
            .get_mut(id)
            .ok_or(DesignError::UnknownElement { id })?;
        for &i in &indices {
            if let Some(p) = element.points.get_mut(i) {
                p.x += dx;
                p.y += dy;
            }
        }
        self.revision += 1;
        Ok(())
    }

    fn delete_selected_vertices(&mut self) -> Result<()> {
        let id = self.vertex_target.ok_or(DesignError::NoVertexSession)?;
        let indices = self.vertex_selection.clone();
        if indices.is_empty() {
            return Ok(());
        }
        let element = self
            .get_mut(id)
            .ok_or(DesignError::UnknownElement { id })?;

        let remaining = element.points.len().saturating_sub(indices.len());
        let floor = if element.closed { 3 } else { 2 };
        if remaining < floor {
            return Err(DesignError::TooFewPoints {
                id,
                requested: indices.len(),
                remaining,
            });
        }

        let mut index = 0;
        element.points.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
        self.vertex_selection.clear();
        self.revision += 1;
        Ok(())
    }
}
