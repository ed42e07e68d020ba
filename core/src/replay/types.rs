//! Core types for `.rec` recordings
//!
//! One [`Recording`] holds a single participant's movement and input for one
//! round: a header describing the participant at round start, followed by one
//! [`Frame`] per captured (or synthesized) tick.

use glam::{Vec2, Vec3};

/// File magic, written as a little-endian `i32`.
pub const MAGIC: i32 = 0xDEAD_BEEF_u32 as i32;

/// Layout version this crate reads and writes.
pub const FORMAT_VERSION: u8 = 2;

/// Longest participant name the header can hold.
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

bitflags::bitflags! {
    /// Input button bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Buttons: i32 {
        const ATTACK = 1 << 0;
        const JUMP = 1 << 1;
        const DUCK = 1 << 2;
        const FORWARD = 1 << 3;
        const BACK = 1 << 4;
        const USE = 1 << 5;
        const MOVELEFT = 1 << 9;
        const MOVERIGHT = 1 << 10;
        const ATTACK2 = 1 << 11;
        const RELOAD = 1 << 13;
    }
}

bitflags::bitflags! {
    /// Extended fields present on a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct FrameFields: i32 {
        const ORIGIN = 1 << 0;
        const ANGLES = 1 << 1;
        const VELOCITY = 1 << 2;
    }
}

/// Participant state at the start of the recording.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingHeader {
    /// Capture time (unix seconds).
    pub timestamp: i32,
    pub name: String,
    pub position: Vec3,
    /// `x` = pitch, `y` = yaw.
    pub angles: Vec2,
}

/// One tick of movement and input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub buttons: Buttons,
    pub impulse: i32,
    pub actual_velocity: Vec3,
    pub predicted_velocity: Vec3,
    /// `x` = pitch, `y` = yaw.
    pub predicted_angles: Vec2,
    pub origin: Vec3,
    /// Weapon switched to on this frame, or [`crate::catalog::WEAPON_NONE`].
    pub weapon: i32,
    pub subtype: i32,
    pub seed: i32,
    pub fields: FrameFields,
    pub at_origin: Vec3,
    pub at_angles: Vec3,
    pub at_velocity: Vec3,
}

impl Frame {
    /// Whether the frame carries full resynchronization data.
    pub fn is_keyframe(&self) -> bool {
        self.fields.contains(FrameFields::ORIGIN)
    }
}

/// A complete per-participant, per-round recording.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recording {
    pub header: RecordingHeader,
    pub frames: Vec<Frame>,
}

impl Recording {
    pub fn new(header: RecordingHeader) -> Self {
        Self {
            header,
            frames: Vec::new(),
        }
    }

    pub fn tick_count(&self) -> usize {
        self.frames.len()
    }

    pub fn keyframe_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_keyframe()).count()
    }
}
