//! Snap engine: resolves a cursor position to the best nearby anchor.
//!
//! Anchors are discoverable points the cursor can be pulled toward: element
//! vertices (endpoints), edge midpoints, segment intersections, and grid
//! crossings. The engine caches the anchor list and only rebuilds it when the
//! grid size, camera scale, excluded-element set, or document revision has
//! changed since the previous call.

use std::collections::BTreeSet;

use mazekit_core::constants::SNAP_RADIUS_PX;
use mazekit_core::geometry::{segment_intersection, Point};
use smallvec::SmallVec;

use crate::model::DesignElement;

/// The kind of anchor a snap resolved to, in tie-break priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    Endpoint,
    Intersection,
    Midpoint,
    Grid,
}

impl SnapKind {
    /// Lower ranks win when two anchors are exactly equidistant.
    fn priority(&self) -> u8 {
        match self {
            SnapKind::Endpoint => 0,
            SnapKind::Intersection => 1,
            SnapKind::Midpoint => 2,
            SnapKind::Grid => 3,
        }
    }
}

/// Which anchor kinds a snap query may consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapKinds {
    pub endpoint: bool,
    pub midpoint: bool,
    pub grid: bool,
    pub intersection: bool,
}

impl SnapKinds {
    /// Every anchor kind enabled.
    pub fn all() -> Self {
        Self {
            endpoint: true,
            midpoint: true,
            grid: true,
            intersection: true,
        }
    }

    /// Every anchor kind disabled.
    pub fn none() -> Self {
        Self {
            endpoint: false,
            midpoint: false,
            grid: false,
            intersection: false,
        }
    }

    fn allows(&self, kind: SnapKind) -> bool {
        match kind {
            SnapKind::Endpoint => self.endpoint,
            SnapKind::Midpoint => self.midpoint,
            SnapKind::Grid => self.grid,
            SnapKind::Intersection => self.intersection,
        }
    }
}

/// A resolved snap: the anchor point, its kind, and the element it came from
/// (`None` for grid anchors).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    pub point: Point,
    pub kind: SnapKind,
    pub source: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    point: Point,
    kind: SnapKind,
    source: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    grid_bits: Option<u64>,
    scale_bits: u64,
    revision: u64,
    exclude: BTreeSet<u64>,
}

/// Resolves cursor positions to the closest nearby anchor.
#[derive(Debug, Default)]
pub struct SnapEngine {
    grid_size: Option<f64>,
    camera_scale: f64,
    anchors: Vec<Anchor>,
    cache_key: Option<CacheKey>,
}

impl SnapEngine {
    /// Creates a snap engine with no grid and 1:1 camera scale.
    pub fn new() -> Self {
        Self {
            grid_size: None,
            camera_scale: 1.0,
            anchors: Vec::new(),
            cache_key: None,
        }
    }

    /// Sets the grid spacing; `None` disables grid anchors entirely.
    pub fn set_grid(&mut self, grid_size: Option<f64>) {
        self.grid_size = grid_size.filter(|g| *g > 0.0);
    }

    /// Current grid spacing.
    pub fn grid(&self) -> Option<f64> {
        self.grid_size
    }

    /// Updates the camera scale used to convert the screen-space snap radius
    /// to world units.
    pub fn set_camera_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.camera_scale = scale;
        }
    }

    /// Snap search tolerance in world units at the current camera scale.
    pub fn tolerance(&self) -> f64 {
        SNAP_RADIUS_PX / self.camera_scale
    }

    /// Rebuilds the anchor cache if the grid, camera scale, excluded set, or
    /// document revision changed since the previous call.
    pub fn prepare(&mut self, elements: &[DesignElement], exclude: &BTreeSet<u64>, revision: u64) {
        let key = CacheKey {
            grid_bits: self.grid_size.map(f64::to_bits),
            scale_bits: self.camera_scale.to_bits(),
            revision,
            exclude: exclude.clone(),
        };
        if self.cache_key.as_ref() == Some(&key) {
            return;
        }
        self.rebuild(elements, exclude);
        self.cache_key = Some(key);
    }

    fn rebuild(&mut self, elements: &[DesignElement], exclude: &BTreeSet<u64>) {
        self.anchors.clear();
        let mut segments: Vec<(u64, Point, Point)> = Vec::new();

        for element in elements {
            if exclude.contains(&element.id) {
                continue;
            }
            for p in &element.points {
                self.anchors.push(Anchor {
                    point: *p,
                    kind: SnapKind::Endpoint,
                    source: Some(element.id),
                });
            }
            let element_segments: SmallVec<[(Point, Point); 8]> = element.edges().collect();
            for (a, b) in &element_segments {
                self.anchors.push(Anchor {
                    point: a.midpoint(b),
                    kind: SnapKind::Midpoint,
                    source: Some(element.id),
                });
                segments.push((element.id, *a, *b));
            }
        }

        // Pairwise proper intersections between candidate segments. Segments
        // sharing an endpoint intersect there trivially; those are already
        // endpoint anchors, so skip near-endpoint crossings.
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                let (id_a, a1, a2) = segments[i];
                let (id_b, b1, b2) = segments[j];
                if let Some(p) = segment_intersection(&a1, &a2, &b1, &b2) {
                    let at_endpoint = [a1, a2, b1, b2]
                        .iter()
                        .any(|e| e.distance_to(&p) < 1e-9);
                    if at_endpoint {
                        continue;
                    }
                    self.anchors.push(Anchor {
                        point: p,
                        kind: SnapKind::Intersection,
                        // Attribute to the topmost of the two contributors.
                        source: Some(id_a.max(id_b)),
                    });
                }
            }
        }
    }

    /// Resolves the best snap for a cursor position, or `None` when no
    /// anchor of an allowed kind is within tolerance.
    ///
    /// Tie-break: smallest world distance; exact ties resolve by kind
    /// priority endpoint > intersection > midpoint > grid. Idempotent for
    /// identical (point, camera, grid) inputs.
    pub fn find_snap(&self, point: &Point, kinds: &SnapKinds) -> Option<SnapResult> {
        let tolerance = self.tolerance();
        let mut best: Option<(f64, SnapResult)> = None;

        let mut consider = |candidate: Anchor| {
            if !kinds.allows(candidate.kind) {
                return;
            }
            let d = point.distance_to(&candidate.point);
            if d > tolerance {
                return;
            }
            let better = match &best {
                None => true,
                Some((bd, br)) => {
                    d < *bd || (d == *bd && candidate.kind.priority() < br.kind.priority())
                }
            };
            if better {
                best = Some((
                    d,
                    SnapResult {
                        point: candidate.point,
                        kind: candidate.kind,
                        source: candidate.source,
                    },
                ));
            }
        };

        for anchor in &self.anchors {
            consider(*anchor);
        }

        if let Some(grid) = self.grid_size {
            consider(Anchor {
                point: Point::new(
                    (point.x / grid).round() * grid,
                    (point.y / grid).round() * grid,
                ),
                kind: SnapKind::Grid,
                source: None,
            });
        }

        best.map(|(_, r)| r)
    }

    /// Rounds a point to the grid, independent of the snap radius. Used by
    /// move gestures that force grid alignment.
    pub fn round_to_grid(&self, point: &Point) -> Point {
        match self.grid_size {
            Some(grid) => Point::new(
                (point.x / grid).round() * grid,
                (point.y / grid).round() * grid,
            ),
            None => *point,
        }
    }
}
