//! Interactive selection, transform, and snap engine for the maze design
//! surface.
//!
//! The crate is host-agnostic: a UI layer feeds pointer events in world
//! coordinates through the [`Tool`] trait and draws affordances through
//! [`OverlayContext`]; elements live behind the [`DocumentStore`] trait so
//! the host can supply its own persistence. [`SelectTool`] is the default
//! tool, combining click/marquee selection, handle-driven move/scale/rotate,
//! vertex editing, and snap-to-anchor feedback.

pub mod document;
pub mod model;
pub mod revalidate;
pub mod select_tool;
pub mod snap;
pub mod tool;
pub mod transform;
pub mod viewport;

pub use document::{Document, DocumentStore};
pub use hit_test::{combined_bounds, hit_test_element, hit_test_scene, Handle};
pub use model::{DesignElement, ElementKind, ElementSpec};
pub use revalidate::{ConstraintThresholds, ConstraintValidator, Violation};
pub use select_tool::SelectTool;
pub use snap::{SnapEngine, SnapKind, SnapKinds, SnapResult};
pub use tool::{MarkerStyle, Modifiers, OverlayContext, PointerEvent, Tool};
pub use transform::TransformGesture;
pub use viewport::Camera;
