//! Design element model.
//!
//! Every element on the maze surface is an ordered 2D point sequence with a
//! kind tag, an open/closed flag, a carve width, and a residual rotation not
//! yet baked into the points. Closed elements implicitly connect the last
//! point back to the first. Optional hole rings cut interior regions out of
//! closed shapes.

use mazekit_core::geometry::{bounding_box, Bounds, Point};
use serde::{Deserialize, Serialize};

/// The kind of a design element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Path,
    Line,
    Rectangle,
    Circle,
    Arc,
    Text,
    ClipArt,
}

/// A user-placed geometric entity not yet committed to the maze.
///
/// Owned by the document store; engines never create or destroy elements
/// except through explicit store calls. `points.len() >= 2` is required for
/// meaningful hit-testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignElement {
    /// Stable, unique id assigned by the document store.
    pub id: u64,
    pub kind: ElementKind,
    /// Ordered outline points in world coordinates.
    pub points: Vec<Point>,
    /// Closed elements implicitly connect the last point to the first.
    pub closed: bool,
    /// Carve width of the element's stroke, in world units.
    pub width: f64,
    /// Residual rotation in degrees not yet baked into `points`.
    pub rotation: f64,
    /// Interior hole rings of closed shapes.
    #[serde(default)]
    pub holes: Vec<Vec<Point>>,
}

/// Specification for inserting a new element; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub kind: ElementKind,
    pub points: Vec<Point>,
    pub closed: bool,
    pub width: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub holes: Vec<Vec<Point>>,
}

impl From<&DesignElement> for ElementSpec {
    /// Clones an existing element's geometry into a spec, for duplication.
    fn from(element: &DesignElement) -> Self {
        Self {
            kind: element.kind,
            points: element.points.clone(),
            closed: element.closed,
            width: element.width,
            rotation: element.rotation,
            holes: element.holes.clone(),
        }
    }
}

impl ElementSpec {
    /// Spec for an open polyline.
    pub fn path(points: Vec<Point>, width: f64) -> Self {
        Self {
            kind: ElementKind::Path,
            points,
            closed: false,
            width,
            rotation: 0.0,
            holes: Vec::new(),
        }
    }

    /// Spec for a closed polygon outline.
    pub fn polygon(points: Vec<Point>, width: f64) -> Self {
        Self {
            kind: ElementKind::Path,
            points,
            closed: true,
            width,
            rotation: 0.0,
            holes: Vec::new(),
        }
    }

    /// Spec for an axis-aligned rectangle outline.
    pub fn rectangle(x: f64, y: f64, w: f64, h: f64, width: f64) -> Self {
        Self {
            kind: ElementKind::Rectangle,
            points: vec![
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ],
            closed: true,
            width,
            rotation: 0.0,
            holes: Vec::new(),
        }
    }

    /// Spec for a two-point line.
    pub fn line(start: Point, end: Point, width: f64) -> Self {
        Self {
            kind: ElementKind::Line,
            points: vec![start, end],
            closed: false,
            width,
            rotation: 0.0,
            holes: Vec::new(),
        }
    }
}

impl DesignElement {
    /// Axis-aligned bounding box of the outline points.
    pub fn bounds(&self) -> Bounds {
        bounding_box(&self.points)
    }

    /// Iterates the element's edges, including the implicit closing edge of
    /// closed elements.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        let closing = if self.closed && n >= 3 { 1 } else { 0 };
        (0..n.saturating_sub(1) + closing).map(move |i| {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            (a, b)
        })
    }

    /// Translates all points (and holes) by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
        for ring in &mut self.holes {
            for p in ring {
                p.x += dx;
                p.y += dy;
            }
        }
    }

    /// Scales all points (and holes) about a fixed anchor.
    pub fn scale(&mut self, sx: f64, sy: f64, anchor: Point) {
        for p in &mut self.points {
            p.x = anchor.x + (p.x - anchor.x) * sx;
            p.y = anchor.y + (p.y - anchor.y) * sy;
        }
        for ring in &mut self.holes {
            for p in ring {
                p.x = anchor.x + (p.x - anchor.x) * sx;
                p.y = anchor.y + (p.y - anchor.y) * sy;
            }
        }
    }

    /// Rotates all points (and holes) about a center, in radians. Baking a
    /// rotation into the points is the caller's cue to reset the residual
    /// `rotation` field.
    pub fn rotate(&mut self, angle: f64, center: Point) {
        let (sin, cos) = angle.sin_cos();
        let rotate_point = |p: &mut Point| {
            let dx = p.x - center.x;
            let dy = p.y - center.y;
            p.x = center.x + dx * cos - dy * sin;
            p.y = center.y + dx * sin + dy * cos;
        };
        for p in &mut self.points {
            rotate_point(p);
        }
        for ring in &mut self.holes {
            for p in ring {
                rotate_point(p);
            }
        }
    }
}
