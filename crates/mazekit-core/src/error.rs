//! Error handling for MazeKit.
//!
//! Provides error types for the design surface layers: document store
//! operations, transform gestures, and constraint revalidation transport.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Design surface error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    /// Referenced an element id the document does not contain.
    #[error("Unknown element id {id}")]
    UnknownElement {
        /// The offending element id.
        id: u64,
    },

    /// A gesture or store operation required a non-empty selection.
    #[error("Operation requires a selection")]
    EmptySelection,

    /// A scale gesture started from bounds with no area.
    #[error("Cannot scale from zero-area bounds")]
    DegenerateBounds,

    /// A vertex deletion would leave the element below its minimum point
    /// count (2 for open elements, 3 for closed ones).
    #[error("Deleting {requested} vertices would leave element {id} with {remaining} points")]
    TooFewPoints {
        /// The element whose vertices were being deleted.
        id: u64,
        /// How many vertices the deletion asked to remove.
        requested: usize,
        /// How many points the element would have kept.
        remaining: usize,
    },

    /// No vertex-edit session is active for the requested operation.
    #[error("No active vertex-edit session")]
    NoVertexSession,

    /// The constraint validation backend could not be reached or returned an
    /// invalid response. Never fatal for the canvas.
    #[error("Constraint revalidation failed: {message}")]
    Validation {
        /// Transport-level failure description.
        message: String,
    },
}

/// Convenience result type for design surface operations.
pub type Result<T> = std::result::Result<T, DesignError>;
