//! Per-tick frame synthesis
//!
//! Observed participant state carries positions, velocities and view angles
//! but no input. This module reconstructs a plausible input stream from it:
//! queued one-shot buttons, weapon-switch deltas, movement keys inferred from
//! velocity, and periodic keyframes for resynchronization.

mod buttons;
pub mod prediction;
mod recorder;

pub use buttons::ButtonQueue;
pub use recorder::{CapturedTrack, FrameRecorder, Track};
