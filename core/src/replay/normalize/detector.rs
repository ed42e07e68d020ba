//! Capture cadence detection
//!
//! Replays are not always captured every tick. The gap between consecutive
//! captured frames is sampled once, early in the stream, to find the effective
//! frame rate.

use serde::Serialize;

use crate::config::FrameRateConfig;

/// How the effective frame rate compares to the acceptable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Below the acceptable minimum: frames get upsampled.
    Low,
    Normal,
    High,
}

/// Result of frame-rate detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameRateEstimate {
    pub tick_rate: f64,
    /// Mean ticks between captured frames.
    pub mean_tick_delta: f64,
    pub effective_fps: f64,
    /// `effective_fps / tick_rate`.
    pub time_scale: f64,
    pub cadence: Cadence,
    pub samples: usize,
}

impl FrameRateEstimate {
    pub fn should_interpolate(&self) -> bool {
        self.cadence == Cadence::Low
    }
}

/// Samples inter-frame tick deltas until enough are collected.
#[derive(Debug)]
pub struct FrameRateDetector {
    config: FrameRateConfig,
    last_tick: Option<i32>,
    sum: f64,
    samples: usize,
    estimate: Option<FrameRateEstimate>,
}

impl FrameRateDetector {
    pub fn new(config: FrameRateConfig) -> Self {
        Self {
            config,
            last_tick: None,
            sum: 0.0,
            samples: 0,
            estimate: None,
        }
    }

    /// Feed one captured frame's tick. Returns the estimate on the frame that
    /// completes detection.
    pub fn observe(&mut self, tick: i32, tick_rate: f64) -> Option<FrameRateEstimate> {
        if self.estimate.is_some() {
            return None;
        }

        if let Some(last) = self.last_tick {
            let delta = tick - last;
            if delta > 0 && delta < self.config.max_tick_delta {
                self.sum += delta as f64;
                self.samples += 1;
            }
        }
        self.last_tick = Some(tick);

        if self.samples < self.config.sample_count {
            return None;
        }

        let estimate = self.compute(tick_rate)?;
        tracing::info!(
            tick_rate = estimate.tick_rate,
            fps = format_args!("{:.2}", estimate.effective_fps),
            mean_delta = format_args!("{:.2}", estimate.mean_tick_delta),
            time_scale = format_args!("{:.4}", estimate.time_scale),
            cadence = ?estimate.cadence,
            "frame rate detected"
        );
        self.estimate = Some(estimate);
        self.estimate
    }

    /// Finished estimate, if enough samples were collected.
    pub fn estimate(&self) -> Option<FrameRateEstimate> {
        self.estimate
    }

    /// Estimate from whatever has been sampled so far.
    pub fn partial_estimate(&self, tick_rate: f64) -> Option<FrameRateEstimate> {
        self.estimate.or_else(|| self.compute(tick_rate))
    }

    pub fn is_complete(&self) -> bool {
        self.estimate.is_some()
    }

    pub fn config(&self) -> &FrameRateConfig {
        &self.config
    }

    fn compute(&self, tick_rate: f64) -> Option<FrameRateEstimate> {
        if self.samples == 0 {
            return None;
        }
        let mean_tick_delta = self.sum / self.samples as f64;
        let effective_fps = tick_rate / mean_tick_delta;
        Some(FrameRateEstimate {
            tick_rate,
            mean_tick_delta,
            effective_fps,
            time_scale: effective_fps / tick_rate,
            cadence: self.classify(effective_fps),
            samples: self.samples,
        })
    }

    fn classify(&self, fps: f64) -> Cadence {
        if fps < self.config.min_acceptable_fps {
            Cadence::Low
        } else if fps > self.config.max_normal_fps {
            Cadence::High
        } else {
            Cadence::Normal
        }
    }
}
