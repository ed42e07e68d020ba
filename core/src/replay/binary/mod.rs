//! Binary recording format (`.rec`)
//!
//! Fixed little-endian layout; optional per-frame fields are gated by the
//! frame's field bitmask.
//!
//! # File Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Header                                       │
//! │ ├─ magic: i32 (0xDEADBEEF)                   │
//! │ ├─ version: u8 (2)                           │
//! │ ├─ timestamp: i32                            │
//! │ ├─ name_len: u8, name: [u8]                  │
//! │ ├─ position: f32 × 3                         │
//! │ └─ angles: f32 × 2 (pitch, yaw)              │
//! ├──────────────────────────────────────────────┤
//! │ tick_count: i32, bookmark_count: i32 (0)     │
//! ├──────────────────────────────────────────────┤
//! │ Frame × tick_count                           │
//! │ ├─ buttons, impulse: i32                     │
//! │ ├─ actual / predicted velocity: f32 × 3      │
//! │ ├─ predicted angles: f32 × 2                 │
//! │ ├─ origin: f32 × 3                           │
//! │ ├─ weapon, subtype, seed, fields: i32        │
//! │ └─ origin / angles / velocity: f32 × 3 each, │
//! │    present only when the field bit is set    │
//! └──────────────────────────────────────────────┘
//! ```

mod reader;
mod writer;

pub use reader::{BinaryReader, RecError, decode_recording};
pub use writer::{BinaryWriter, encode_recording};
