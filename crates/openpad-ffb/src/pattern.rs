//! Force feedback patterns: timed frames of motor levels.

use openpad_curves::IntensityCurve;
use serde::{Deserialize, Serialize};

use crate::intensity::FfIntensity;

/// Identifier assigned when a pattern is stored; unique for the engine's
/// lifetime, never reused after deletion.
pub type PatternId = u32;

/// One step of a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfFrame {
    /// Left (low-frequency) motor level.
    pub left: FfIntensity,
    /// Right (high-frequency) motor level.
    pub right: FfIntensity,
    /// How long the frame holds, in milliseconds.
    pub duration_ms: u32,
    /// Curve shaping the frame's base intensity.
    pub curve: IntensityCurve,
}

impl FfFrame {
    /// Build a frame.
    pub fn new(left: FfIntensity, right: FfIntensity, duration_ms: u32, curve: IntensityCurve) -> Self {
        Self {
            left,
            right,
            duration_ms,
            curve,
        }
    }

    /// The louder of the two motor levels.
    pub fn peak(&self) -> FfIntensity {
        self.left.max(self.right)
    }
}

/// A named, time-ordered frame sequence with cached totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfPattern {
    id: PatternId,
    name: String,
    frames: Vec<FfFrame>,
    total_duration_ms: u32,
    max_intensity: FfIntensity,
    enabled: bool,
}

impl FfPattern {
    pub(crate) fn new(id: PatternId, name: String, frames: Vec<FfFrame>, enabled: bool) -> Self {
        let mut pattern = Self {
            id,
            name,
            frames: Vec::new(),
            total_duration_ms: 0,
            max_intensity: FfIntensity::Off,
            enabled,
        };
        for frame in frames {
            pattern.push_frame(frame);
        }
        pattern
    }

    pub(crate) fn from_record(
        id: PatternId,
        name: String,
        frames: Vec<FfFrame>,
        total_duration_ms: u32,
        max_intensity: FfIntensity,
        enabled: bool,
    ) -> Self {
        Self {
            id,
            name,
            frames,
            total_duration_ms,
            max_intensity,
            enabled,
        }
    }

    /// Pattern id.
    pub fn id(&self) -> PatternId {
        self.id
    }

    /// Pattern name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The frame sequence in playback order.
    pub fn frames(&self) -> &[FfFrame] {
        &self.frames
    }

    /// Cached sum of frame durations.
    pub fn total_duration_ms(&self) -> u32 {
        self.total_duration_ms
    }

    /// Cached loudest motor level across all frames.
    pub fn max_intensity(&self) -> FfIntensity {
        self.max_intensity
    }

    /// Whether the pattern may be triggered.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn push_frame(&mut self, frame: FfFrame) {
        self.total_duration_ms = self.total_duration_ms.saturating_add(frame.duration_ms);
        self.max_intensity = self.max_intensity.max(frame.peak());
        self.frames.push(frame);
    }

    pub(crate) fn clear_frames(&mut self) {
        self.frames.clear();
        self.total_duration_ms = 0;
        self.max_intensity = FfIntensity::Off;
    }
}
