//! Debounced constraint revalidation.
//!
//! After a completed transform, the composition is sent to an external
//! geometry/constraint service to check carve-width and wall-clearance rules.
//! The call is fire-and-forget and debounced: each completed gesture re-arms
//! the timer, so rapid consecutive transforms collapse into one request after
//! the user pauses. A transport failure is logged and otherwise ignored; the
//! canvas never stops being editable because validation is down.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::DesignElement;

/// Carving limits the backend validates the composition against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConstraintThresholds {
    /// Narrowest walkable path width, in world units.
    pub min_path_width: f64,
    /// Minimum stand-off between carved paths and between a path and the
    /// field boundary.
    pub min_wall_clearance: f64,
}

impl Default for ConstraintThresholds {
    fn default() -> Self {
        Self {
            min_path_width: 1.5,
            min_wall_clearance: 1.0,
        }
    }
}

/// The payload sent to the validation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RevalidationRequest<'a> {
    pub elements: &'a [DesignElement],
    pub thresholds: ConstraintThresholds,
}

/// One constraint violation reported by the backend. The engine forwards
/// these for display without interpreting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// The offending element, when the backend can attribute the violation.
    pub element_id: Option<u64>,
    pub message: String,
}

/// Transport to the external constraint service.
pub trait ConstraintValidator {
    fn validate(&mut self, request: &RevalidationRequest<'_>) -> anyhow::Result<Vec<Violation>>;
}

/// A restartable single-shot timer polled from the per-frame tick.
///
/// Arming while pending supersedes the previous deadline.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    /// Creates a debounce with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the timer from now.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Arms the timer relative to an explicit instant. Test hook.
    pub fn arm_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drops any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True while a deadline is pending.
    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the deadline if it has elapsed. Returns `true` at most once
    /// per arm.
    pub fn fire_if_elapsed(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Runs one validation round-trip and hands the violations to `on_report`.
/// Failures are logged and swallowed.
pub fn run_validation(
    validator: &mut dyn ConstraintValidator,
    elements: &[DesignElement],
    thresholds: ConstraintThresholds,
    on_report: &mut dyn FnMut(Vec<Violation>),
) {
    let request = RevalidationRequest {
        elements,
        thresholds,
    };
    match validator.validate(&request) {
        Ok(violations) => {
            debug!(count = violations.len(), "constraint revalidation complete");
            on_report(violations);
        }
        Err(error) => {
            warn!(%error, "constraint revalidation failed; canvas stays editable");
        }
    }
}
