//! The discrete motor intensity scale.

use serde::{Deserialize, Serialize};

/// Discrete motor intensity, 0..6.
///
/// Motor hardware is driven from a normalized fraction; the scale fixes the
/// steps authored patterns may use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum FfIntensity {
    /// Motor off.
    #[default]
    Off,
    /// 20% drive.
    Weak,
    /// 35% drive.
    Light,
    /// 50% drive.
    Medium,
    /// 75% drive.
    Strong,
    /// 100% drive.
    VeryStrong,
    /// Maximum safe drive.
    Max,
}

impl FfIntensity {
    /// Normalized motor fraction for this level.
    pub fn fraction(self) -> f32 {
        match self {
            FfIntensity::Off => 0.0,
            FfIntensity::Weak => 0.2,
            FfIntensity::Light => 0.35,
            FfIntensity::Medium => 0.5,
            FfIntensity::Strong => 0.75,
            FfIntensity::VeryStrong => 1.0,
            FfIntensity::Max => 1.0,
        }
    }

    /// Wire code (0..=6).
    pub fn code(self) -> u32 {
        match self {
            FfIntensity::Off => 0,
            FfIntensity::Weak => 1,
            FfIntensity::Light => 2,
            FfIntensity::Medium => 3,
            FfIntensity::Strong => 4,
            FfIntensity::VeryStrong => 5,
            FfIntensity::Max => 6,
        }
    }

    /// Decode a wire code; `None` above 6.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(FfIntensity::Off),
            1 => Some(FfIntensity::Weak),
            2 => Some(FfIntensity::Light),
            3 => Some(FfIntensity::Medium),
            4 => Some(FfIntensity::Strong),
            5 => Some(FfIntensity::VeryStrong),
            6 => Some(FfIntensity::Max),
            _ => None,
        }
    }

    /// Map a normalized `[0,1]` value onto the scale, clamping outside it.
    pub fn from_fraction(value: f32) -> Self {
        let level = (value.clamp(0.0, 1.0) * 6.0).round() as u32;
        Self::from_code(level).unwrap_or(FfIntensity::Max)
    }

    /// One level softer; `Off` stays `Off`.
    pub fn step_down(self) -> Self {
        match self {
            FfIntensity::Off | FfIntensity::Weak => FfIntensity::Off,
            FfIntensity::Light => FfIntensity::Weak,
            FfIntensity::Medium => FfIntensity::Light,
            FfIntensity::Strong => FfIntensity::Medium,
            FfIntensity::VeryStrong => FfIntensity::Strong,
            FfIntensity::Max => FfIntensity::VeryStrong,
        }
    }
}
