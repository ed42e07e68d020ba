//! Session configuration (`demorec.toml`)
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock behavior. Loaded from TOML like the rest of the workspace's settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for one encoding session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Nominal simulation rate used until the stream announces its own (default: 128)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    /// Seconds after freeze time during which purchases still count (default: 10)
    #[serde(default = "default_buy_time_extension")]
    pub buy_time_extension_secs: f64,
    /// Seconds between keyframes carrying extended fields (default: 2)
    #[serde(default = "default_keyframe_interval")]
    pub keyframe_interval_secs: f64,
    /// Capture cadence detection and upsampling
    #[serde(default)]
    pub frame_rate: FrameRateConfig,
}

/// Frame-rate detection and normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRateConfig {
    /// Number of inter-frame deltas sampled before deciding (default: 500)
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Deltas at or above this many ticks are pauses/seeks and ignored (default: 10)
    #[serde(default = "default_max_tick_delta")]
    pub max_tick_delta: i32,
    /// Below this rate recordings are upsampled (default: 90)
    #[serde(default = "default_min_acceptable_fps")]
    pub min_acceptable_fps: f64,
    /// Above this rate the capture is considered high-rate (default: 120)
    #[serde(default = "default_max_normal_fps")]
    pub max_normal_fps: f64,
    /// Rate recordings are upsampled to (default: 128)
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
}

fn default_tick_rate() -> f64 {
    128.0
}
fn default_buy_time_extension() -> f64 {
    10.0
}
fn default_keyframe_interval() -> f64 {
    2.0
}
fn default_sample_count() -> usize {
    500
}
fn default_max_tick_delta() -> i32 {
    10
}
fn default_min_acceptable_fps() -> f64 {
    90.0
}
fn default_max_normal_fps() -> f64 {
    120.0
}
fn default_target_fps() -> f64 {
    128.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            buy_time_extension_secs: default_buy_time_extension(),
            keyframe_interval_secs: default_keyframe_interval(),
            frame_rate: FrameRateConfig::default(),
        }
    }
}

impl Default for FrameRateConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            max_tick_delta: default_max_tick_delta(),
            min_acceptable_fps: default_min_acceptable_fps(),
            max_normal_fps: default_max_normal_fps(),
            target_fps: default_target_fps(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SessionConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Ticks in the post-freeze buy window for the given rate.
    pub fn buy_time_extension_ticks(&self, tick_rate: f64) -> i32 {
        (tick_rate * self.buy_time_extension_secs) as i32
    }

    /// Frames between keyframes for the given rate, never less than one.
    pub fn keyframe_interval(&self, tick_rate: f64) -> usize {
        ((tick_rate * self.keyframe_interval_secs).round() as usize).max(1)
    }
}
