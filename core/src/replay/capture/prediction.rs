//! Movement input prediction
//!
//! Movement keys cannot be observed, so they are inferred from how the
//! observed horizontal velocity points relative to where the participant is
//! facing. Velocity at tick N is the result of input at tick N-1, so the
//! inferred input is written to the previous frame.

use glam::Vec3;

use crate::replay::types::Frame;

/// Magnitude written to a predicted velocity axis.
pub const PREDICTED_SPEED: f32 = 450.0;

/// Degrees trimmed from each side of a 180° sector.
pub const SECTOR_TOLERANCE: f64 = 30.0;

/// Shift a negative angle into `[0, 360)`.
pub fn normalize_degree(degree: f64) -> f64 {
    if degree < 0.0 { degree + 360.0 } else { degree }
}

/// Direction of horizontal travel in degrees, `[0, 360)`.
pub fn velocity_angle(velocity: Vec3) -> f64 {
    if velocity.x == 0.0 {
        if velocity.y < 0.0 { 270.0 } else { 90.0 }
    } else {
        normalize_degree((velocity.y as f64).atan2(velocity.x as f64).to_degrees())
    }
}

/// Travel direction relative to facing, `[0, 360)`.
pub fn relative_angle(velocity: Vec3, yaw: f32) -> f64 {
    let facing = normalize_degree(yaw as f64);
    normalize_degree(velocity_angle(velocity) - facing)
}

/// Predicted `(forward, side)` input for a relative travel angle.
///
/// Sectors overlap, so a diagonal sets both axes. Later sectors win on the
/// same axis.
pub fn sector_input(delta: f64) -> (Option<f32>, Option<f32>) {
    let t = SECTOR_TOLERANCE;
    let mut forward = None;
    let mut side = None;

    if t < delta && delta < 180.0 - t {
        side = Some(-PREDICTED_SPEED); // left
    }
    if 90.0 + t < delta && delta < 270.0 - t {
        forward = Some(-PREDICTED_SPEED); // back
    }
    if 180.0 + t < delta && delta < 360.0 - t {
        side = Some(PREDICTED_SPEED); // right
    }
    if 270.0 + t < delta || delta < 90.0 - t {
        forward = Some(PREDICTED_SPEED); // front
    }
    (forward, side)
}

/// Write the input inferred from `current` into `previous`.
///
/// Nothing changes when the participant stood still on both frames.
pub fn apply_to_previous(previous: &mut Frame, current: &Frame) {
    let still = |v: Vec3| v.x == 0.0 && v.y == 0.0;
    if still(current.actual_velocity) && still(previous.actual_velocity) {
        return;
    }

    let delta = relative_angle(current.actual_velocity, current.predicted_angles.y);
    let (forward, side) = sector_input(delta);
    if let Some(forward) = forward {
        previous.predicted_velocity.x = forward;
    }
    if let Some(side) = side {
        previous.predicted_velocity.y = side;
    }
}
