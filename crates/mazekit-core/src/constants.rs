//! Interaction tuning constants.
//!
//! All screen-space values are in logical pixels and are converted to world
//! units at the current camera scale by the callers that need them.

/// Hit-test tolerance around element edges, in screen pixels.
pub const HIT_TOLERANCE_PX: f64 = 5.0;

/// Side length of the square scale handles, in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 8.0;

/// Distance of the rotation handle above the top-center of the selection
/// bounds, in screen pixels.
pub const ROTATION_HANDLE_OFFSET_PX: f64 = 24.0;

/// The rotation handle gets a larger hit radius than the scale handles so it
/// stays reachable at low zoom.
pub const ROTATION_HANDLE_RADIUS_FACTOR: f64 = 1.5;

/// Snap search radius, in screen pixels.
pub const SNAP_RADIUS_PX: f64 = 8.0;

/// Maximum delay between two clicks to count as a double-click.
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 400;

/// Maximum screen-space distance between two clicks to count as a
/// double-click.
pub const DOUBLE_CLICK_DISTANCE_PX: f64 = 5.0;

/// Minimum camera zoom (10%).
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum camera zoom (5000%).
pub const MAX_ZOOM: f64 = 50.0;

/// Scale factors with a magnitude below this floor are clamped to the signed
/// floor to block collapse through zero.
pub const SCALE_FACTOR_FLOOR: f64 = 0.1;

/// Rotation snap increment when the angle-snap modifier is held, in degrees.
pub const ROTATION_SNAP_DEGREES: f64 = 15.0;

/// Delay before a completed transform triggers constraint revalidation.
/// Restarted by each subsequent gesture so rapid edits coalesce into one
/// request.
pub const REVALIDATE_DEBOUNCE_MS: u64 = 300;

/// Per-edge padding fraction used when fitting the viewport to content.
pub const VIEW_PADDING: f64 = 0.05;
