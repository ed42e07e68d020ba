//! Movement recordings
//!
//! Builds, normalizes and encodes one `.rec` recording per participant per round.
//!
//! # Pipeline
//!
//! ```text
//! tick_done ─▶ capture::FrameRecorder ─▶ normalize::FrameNormalizer ─▶ binary::BinaryWriter
//!               (buttons, weapon delta,    (upsample low-cadence        (.rec, little-endian)
//!                predicted velocity,        captures to the target
//!                keyframes)                 rate at round end)
//! ```

pub mod binary;
pub mod capture;
pub mod normalize;
pub mod types;

pub use types::{
    Buttons, FORMAT_VERSION, Frame, FrameFields, MAGIC, MAX_NAME_LEN, Recording, RecordingHeader,
};

pub use binary::{BinaryReader, BinaryWriter, RecError, decode_recording, encode_recording};

pub use capture::{ButtonQueue, CapturedTrack, FrameRecorder};

pub use normalize::{Cadence, FrameNormalizer, FrameRateDetector, FrameRateEstimate};
