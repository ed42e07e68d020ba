//! demorec core - replay event stream to movement recordings
//!
//! This crate turns the ordered event stream of a decoded match replay into
//! one `.rec` movement recording per participant per round, plus economy and
//! match analytics.
//!
//! # Architecture
//!
//! - [`Session`] - Owns all match state and dispatches each [`StreamEvent`]
//! - [`RoundMachine`] - Warmup / freeze time / active / ended lifecycle
//! - [`economy`] - Purchase classification and money reconstruction
//! - [`replay`] - Frame capture, frame-rate normalization and the `.rec` codec
//! - [`OutputStore`] - Where recordings and analytics are written

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod economy;
pub mod event;
#[cfg(test)]
mod integration;
pub mod output;
pub mod replay;
pub mod round;
pub mod session;
pub mod stream;
#[cfg(test)]
pub mod test_utils;

pub use config::{ConfigError, FrameRateConfig, SessionConfig};
pub use event::{Event, ItemRef, ParticipantId, PlayerRef, PlayerState, StreamEvent, Team};
pub use output::{FsStore, MemoryStore, OutputStore};
pub use round::{RoundInfo, RoundMachine, RoundPhase, RoundStartOutcome};
pub use session::{Session, SessionReport};
pub use stream::{EventStream, StreamError};

// Re-export catalog and analytics types
pub use analytics::{Analytics, ChatMessage, DemoInfo};
pub use catalog::{Equipment, Slot};

// Re-export recording types
pub use replay::{Frame, Recording, RecordingHeader, RecError, decode_recording, encode_recording};
