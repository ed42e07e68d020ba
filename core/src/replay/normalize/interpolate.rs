//! Temporal upsampling of captured frames
//!
//! Positions follow a Catmull-Rom spline through the neighboring frames,
//! velocities are linear, and view angles take the short way around the
//! circle. Discrete input is copied from the earlier frame of each pair.

use glam::{Vec2, Vec3};

use crate::catalog::WEAPON_NONE;
use crate::replay::types::{Frame, FrameFields};

/// Catmull-Rom spline between `p1` and `p2`.
pub fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Interpolate between two angles in degrees along the shorter arc.
///
/// The result is in `[-180, 180)`.
pub fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    let mut diff = b - a;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff < -180.0 {
        diff += 360.0;
    }

    let mut result = a + diff * t;
    while result >= 180.0 {
        result -= 360.0;
    }
    while result < -180.0 {
        result += 360.0;
    }
    result
}

fn catmull_rom_vec3(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    Vec3::new(
        catmull_rom(p0.x, p1.x, p2.x, p3.x, t),
        catmull_rom(p0.y, p1.y, p2.y, p3.y, t),
        catmull_rom(p0.z, p1.z, p2.z, p3.z, t),
    )
}

/// Frames emitted per captured frame when going from `effective_fps` to
/// `target_fps`. A factor of one means no upsampling.
pub fn interpolation_factor(target_fps: f64, effective_fps: f64) -> usize {
    if effective_fps.is_nan() || effective_fps <= 0.0 {
        return 1;
    }
    ((target_fps / effective_fps).floor() as usize).max(1)
}

/// Synthesized frame at `t` between `current` and `next`.
fn blend(prev: &Frame, current: &Frame, next: &Frame, next_next: &Frame, t: f32) -> Frame {
    let mut frame = Frame {
        buttons: current.buttons,
        impulse: current.impulse,
        actual_velocity: current.actual_velocity.lerp(next.actual_velocity, t),
        predicted_velocity: current.predicted_velocity.lerp(next.predicted_velocity, t),
        predicted_angles: Vec2::new(
            lerp_angle(current.predicted_angles.x, next.predicted_angles.x, t),
            lerp_angle(current.predicted_angles.y, next.predicted_angles.y, t),
        ),
        origin: catmull_rom_vec3(prev.origin, current.origin, next.origin, next_next.origin, t),
        weapon: WEAPON_NONE,
        subtype: current.subtype,
        seed: current.seed,
        ..Frame::default()
    };

    let shared = current.fields & next.fields;
    if shared.contains(FrameFields::ORIGIN) {
        frame.fields |= FrameFields::ORIGIN;
        frame.at_origin = catmull_rom_vec3(
            prev.at_origin,
            current.at_origin,
            next.at_origin,
            next_next.at_origin,
            t,
        );
    }
    if shared.contains(FrameFields::VELOCITY) {
        frame.fields |= FrameFields::VELOCITY;
        frame.at_velocity = current.at_velocity.lerp(next.at_velocity, t);
    }
    frame
}

/// Insert `factor - 1` synthesized frames between every captured pair.
///
/// The result has `(len - 1) * factor + 1` frames; sequences shorter than two
/// frames and factors of one or less are returned unchanged.
pub fn upsample(frames: &[Frame], factor: usize) -> Vec<Frame> {
    if frames.len() < 2 || factor <= 1 {
        return frames.to_vec();
    }

    let mut out = Vec::with_capacity((frames.len() - 1) * factor + 1);
    for i in 0..frames.len() - 1 {
        let current = &frames[i];
        let next = &frames[i + 1];
        let prev = if i > 0 { &frames[i - 1] } else { current };
        let next_next = frames.get(i + 2).unwrap_or(next);

        out.push(*current);
        for j in 1..factor {
            let t = j as f32 / factor as f32;
            out.push(blend(prev, current, next, next_next, t));
        }
    }
    out.extend(frames.last().copied());
    out
}
