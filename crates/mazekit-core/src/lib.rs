//! # MazeKit Core
//!
//! Core types, errors, and geometry primitives for MazeKit.
//! Provides the fundamental abstractions shared by the design surface:
//! error types, interaction tuning constants, and pure 2D geometry
//! predicates used by hit-testing, snapping, and transforms.

pub mod constants;
pub mod error;
pub mod geometry;

pub use error::{DesignError, Result};
pub use geometry::{
    bounding_box, distance_to_segment, point_in_polygon, segment_intersection, Bounds, Point,
};
