//! Frame-rate normalization
//!
//! Low-cadence captures are upsampled to the target rate before encoding so
//! that playback runs at the nominal tick rate.

mod detector;
mod interpolate;

pub use detector::{Cadence, FrameRateDetector, FrameRateEstimate};
pub use interpolate::{catmull_rom, interpolation_factor, lerp_angle, upsample};

use crate::config::FrameRateConfig;
use crate::replay::types::Recording;

/// Cadence detection plus the per-recording upsampling decision.
#[derive(Debug)]
pub struct FrameNormalizer {
    detector: FrameRateDetector,
}

impl FrameNormalizer {
    pub fn new(config: FrameRateConfig) -> Self {
        Self {
            detector: FrameRateDetector::new(config),
        }
    }

    /// Feed one captured frame's tick.
    pub fn observe(&mut self, tick: i32, tick_rate: f64) -> Option<FrameRateEstimate> {
        self.detector.observe(tick, tick_rate)
    }

    pub fn detector(&self) -> &FrameRateDetector {
        &self.detector
    }

    pub fn target_fps(&self) -> f64 {
        self.detector.config().target_fps
    }

    /// Upsampling factor for recordings finished now; one until detection
    /// completes with a low cadence.
    pub fn factor(&self) -> usize {
        match self.detector.estimate() {
            Some(estimate) if estimate.should_interpolate() => {
                interpolation_factor(self.target_fps(), estimate.effective_fps)
            }
            _ => 1,
        }
    }

    /// Upsample the recording's frames in place. Returns the factor applied.
    pub fn normalize(&self, recording: &mut Recording) -> usize {
        let factor = self.factor();
        if factor <= 1 || recording.frames.len() < 2 {
            return 1;
        }

        let original = recording.frames.len();
        recording.frames = upsample(&recording.frames, factor);
        tracing::debug!(
            player = %recording.header.name,
            original,
            upsampled = recording.frames.len(),
            factor,
            "frames interpolated"
        );
        factor
    }
}
