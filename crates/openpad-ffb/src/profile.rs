//! Force feedback profiles.

use openpad_curves::IntensityCurve;
use serde::{Deserialize, Serialize};

/// Identifier assigned when a profile is created; unique for the engine's
/// lifetime, never reused after deletion.
pub type ProfileId = u32;

/// How patterns translate to motor output for a player.
///
/// The active profile's default curve shapes its intensity scale into a gain
/// applied to every frame; the sensitivity multipliers bias weapon-sourced
/// and environment-sourced feedback separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfProfile {
    id: ProfileId,
    name: String,
    /// Default curve shaping the profile gain.
    pub default_curve: IntensityCurve,
    /// Master intensity, `[0,1]`.
    pub intensity_scale: f32,
    /// Weapon feedback multiplier, `[0.5,2.0]`.
    pub weapon_sensitivity: f32,
    /// Environmental feedback multiplier, `[0.5,2.0]`.
    pub environment_sensitivity: f32,
    /// Scale feedback by player status when the host supports it.
    pub adaptive_intensity: bool,
    /// Whether haptic-specific patterns are allowed.
    pub haptics_enabled: bool,
    /// Whether this profile may be activated.
    pub enabled: bool,
}

impl FfProfile {
    pub(crate) fn new(id: ProfileId, name: String, default_curve: IntensityCurve) -> Self {
        Self {
            id,
            name,
            default_curve,
            intensity_scale: 1.0,
            weapon_sensitivity: 1.0,
            environment_sensitivity: 1.0,
            adaptive_intensity: false,
            haptics_enabled: true,
            enabled: true,
        }
    }

    pub(crate) fn with_id(mut self, id: ProfileId) -> Self {
        self.id = id;
        self
    }

    /// Profile id.
    pub fn id(&self) -> ProfileId {
        self.id
    }

    /// Profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gain contributed by this profile: its default curve applied to its
    /// intensity scale.
    pub fn gain(&self) -> f32 {
        self.default_curve.evaluate(self.intensity_scale)
    }

    /// Range check over every scalar field.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.intensity_scale)
            && (0.5..=2.0).contains(&self.weapon_sensitivity)
            && (0.5..=2.0).contains(&self.environment_sensitivity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let profile = FfProfile::new(1, "default".into(), IntensityCurve::Linear);
        assert!((profile.intensity_scale - 1.0).abs() < f32::EPSILON);
        assert!((profile.weapon_sensitivity - 1.0).abs() < f32::EPSILON);
        assert!((profile.environment_sensitivity - 1.0).abs() < f32::EPSILON);
        assert!(!profile.adaptive_intensity);
        assert!(profile.haptics_enabled);
        assert!(profile.enabled);
        assert!(profile.is_valid());
    }

    #[test]
    fn test_gain_applies_default_curve() {
        let mut profile = FfProfile::new(1, "half".into(), IntensityCurve::Exponential);
        profile.intensity_scale = 0.5;
        assert!((profile.gain() - 0.25).abs() < 1e-6);

        profile.default_curve = IntensityCurve::Linear;
        assert!((profile.gain() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_validity_ranges() {
        let mut profile = FfProfile::new(1, "p".into(), IntensityCurve::Linear);
        profile.intensity_scale = 1.5;
        assert!(!profile.is_valid());

        profile.intensity_scale = 1.0;
        profile.weapon_sensitivity = 0.4;
        assert!(!profile.is_valid());

        profile.weapon_sensitivity = 2.0;
        profile.environment_sensitivity = 2.1;
        assert!(!profile.is_valid());

        profile.environment_sensitivity = 0.5;
        assert!(profile.is_valid());
    }

    #[test]
    fn test_serde_round_trip() -> Result<(), serde_json::Error> {
        let profile = FfProfile::new(3, "snappy".into(), IntensityCurve::Sigmoid);
        let json = serde_json::to_string(&profile)?;
        let back: FfProfile = serde_json::from_str(&json)?;
        assert_eq!(profile, back);
        Ok(())
    }
}
