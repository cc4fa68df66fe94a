//! Predefined feedback patterns.
//!
//! The weapon tables are a closed lookup: per-type timings and intensities
//! are canonical tuning data, not derived values. Do not adjust them without
//! re-tuning against hardware.

use openpad_curves::IntensityCurve;
use serde::{Deserialize, Serialize};

use crate::intensity::FfIntensity;
use crate::pattern::FfFrame;

/// Weapon and combat-effect classes with authored feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Hand-to-hand.
    Unarmed,
    /// Light weapon fire.
    Pistol,
    /// Medium weapon fire.
    Rifle,
    /// Heavy weapon fire.
    Shotgun,
    /// Melee weapon impact.
    Melee,
    /// Nearby explosion.
    Explosion,
    /// Heavy ordnance (tank, aircraft).
    Heavy,
    /// Being hit or damaged.
    Hit,
    /// Healing or support.
    Heal,
    /// Power-up activated.
    PowerUp,
}

/// Environmental effect classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentKind {
    /// Ground or surface impact.
    Impact,
    /// Water splash.
    Water,
    /// Fire or burning.
    Fire,
    /// Electrical effects.
    Electric,
    /// Wind or air pressure.
    Wind,
    /// Freezing or ice.
    Freeze,
    /// Desert or sand.
    Sand,
}

fn frame(
    left: FfIntensity,
    right: FfIntensity,
    duration_ms: u32,
    curve: IntensityCurve,
) -> FfFrame {
    FfFrame::new(left, right, duration_ms, curve)
}

/// Authored frames for a weapon class, with the pattern's display name.
pub fn weapon_frames(kind: WeaponKind) -> (&'static str, Vec<FfFrame>) {
    use FfIntensity::{Light, Max, Medium, Off, Strong, VeryStrong, Weak};
    use IntensityCurve::{Exponential, Linear};

    match kind {
        WeaponKind::Pistol => (
            "Weapon_Pistol",
            vec![
                frame(Medium, Light, 20, Linear),
                frame(Weak, Off, 30, Linear),
            ],
        ),
        WeaponKind::Rifle => (
            "Weapon_Rifle",
            vec![
                frame(Strong, Medium, 40, Linear),
                frame(Medium, Light, 30, Linear),
            ],
        ),
        WeaponKind::Shotgun => (
            "Weapon_Shotgun",
            vec![
                frame(Max, VeryStrong, 30, Linear),
                frame(Strong, Medium, 50, Linear),
            ],
        ),
        WeaponKind::Melee => (
            "Weapon_Melee",
            vec![
                frame(VeryStrong, VeryStrong, 50, Exponential),
                frame(Weak, Weak, 50, Linear),
            ],
        ),
        WeaponKind::Explosion => (
            "Weapon_Explosion",
            vec![
                frame(Max, Max, 60, Exponential),
                frame(Strong, Strong, 100, Linear),
                frame(Light, Light, 80, Linear),
            ],
        ),
        WeaponKind::Hit => (
            "Effect_Hit",
            vec![
                frame(VeryStrong, VeryStrong, 40, Linear),
                frame(Strong, Strong, 80, Linear),
            ],
        ),
        WeaponKind::PowerUp => (
            "Effect_PowerUp",
            [Weak, Light, Medium, Strong, VeryStrong]
                .into_iter()
                .map(|level| frame(level, level, 20, Linear))
                .collect(),
        ),
        WeaponKind::Unarmed | WeaponKind::Heavy | WeaponKind::Heal => {
            ("Weapon_Default", vec![frame(Light, Light, 40, Linear)])
        }
    }
}

/// Authored frames for an environmental effect at a requested level.
pub fn environment_frames(kind: EnvironmentKind, level: FfIntensity) -> (&'static str, Vec<FfFrame>) {
    use IntensityCurve::{Exponential, Linear, Sigmoid};
    let soft = level.step_down();
    let off = FfIntensity::Off;

    match kind {
        EnvironmentKind::Impact => (
            "Env_Impact",
            vec![frame(level, level, 60, Exponential), frame(soft, soft, 40, Linear)],
        ),
        EnvironmentKind::Water => (
            "Env_Water",
            vec![frame(soft, level, 80, Sigmoid), frame(off, soft, 120, Linear)],
        ),
        EnvironmentKind::Fire => (
            "Env_Fire",
            vec![
                frame(level, soft, 30, Linear),
                frame(soft, level, 30, Linear),
                frame(level, soft, 30, Linear),
            ],
        ),
        EnvironmentKind::Electric => (
            "Env_Electric",
            vec![
                frame(level, off, 15, Linear),
                frame(off, level, 15, Linear),
                frame(level, off, 15, Linear),
                frame(off, level, 15, Linear),
            ],
        ),
        EnvironmentKind::Wind => ("Env_Wind", vec![frame(soft, soft, 200, Sigmoid)]),
        EnvironmentKind::Freeze => (
            "Env_Freeze",
            vec![
                frame(soft, soft, 100, Sigmoid),
                frame(off, off, 100, Linear),
                frame(soft, soft, 100, Sigmoid),
            ],
        ),
        EnvironmentKind::Sand => (
            "Env_Sand",
            vec![
                frame(soft, off, 25, Linear),
                frame(off, soft, 25, Linear),
                frame(soft, off, 25, Linear),
            ],
        ),
    }
}

/// Burst-and-decay frames for a damage impact of normalized `force`.
pub fn impact_frames(force: f32) -> (&'static str, Vec<FfFrame>) {
    let level = FfIntensity::from_fraction(force);
    (
        "Impact",
        vec![
            frame(level, level, 40, IntensityCurve::Exponential),
            frame(level.step_down(), level.step_down(), 80, IntensityCurve::Linear),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(frames: &[FfFrame]) -> u32 {
        frames.iter().map(|f| f.duration_ms).sum()
    }

    #[test]
    fn test_pistol_is_short_medium_burst_with_weak_decay() {
        let (name, frames) = weapon_frames(WeaponKind::Pistol);
        assert_eq!(name, "Weapon_Pistol");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.first().map(|f| (f.left, f.right, f.duration_ms)),
            Some((FfIntensity::Medium, FfIntensity::Light, 20)));
        assert_eq!(frames.get(1).map(|f| (f.left, f.right, f.duration_ms)),
            Some((FfIntensity::Weak, FfIntensity::Off, 30)));
        assert_eq!(total(&frames), 50);
    }

    #[test]
    fn test_shotgun_is_max_burst_then_strong_decay() {
        let (_, frames) = weapon_frames(WeaponKind::Shotgun);
        assert_eq!(frames.first().map(|f| (f.left, f.right, f.duration_ms)),
            Some((FfIntensity::Max, FfIntensity::VeryStrong, 30)));
        assert_eq!(frames.get(1).map(|f| (f.left, f.right, f.duration_ms)),
            Some((FfIntensity::Strong, FfIntensity::Medium, 50)));
    }

    #[test]
    fn test_explosion_is_three_stage_decay_over_240ms() {
        let (_, frames) = weapon_frames(WeaponKind::Explosion);
        assert_eq!(frames.len(), 3);
        assert_eq!(total(&frames), 240);
        let lefts: Vec<FfIntensity> = frames.iter().map(|f| f.left).collect();
        assert_eq!(
            lefts,
            vec![FfIntensity::Max, FfIntensity::Strong, FfIntensity::Light]
        );
        assert_eq!(
            frames.first().map(|f| f.curve.clone()),
            Some(IntensityCurve::Exponential)
        );
    }

    #[test]
    fn test_melee_leads_with_exponential_spike() {
        let (_, frames) = weapon_frames(WeaponKind::Melee);
        assert_eq!(
            frames.first().map(|f| (f.left, f.curve.clone())),
            Some((FfIntensity::VeryStrong, IntensityCurve::Exponential))
        );
    }

    #[test]
    fn test_powerup_ascends() {
        let (_, frames) = weapon_frames(WeaponKind::PowerUp);
        assert_eq!(frames.len(), 5);
        assert!(frames.windows(2).all(|pair| match pair {
            [a, b] => a.left < b.left,
            _ => false,
        }));
        assert!(frames.iter().all(|f| f.duration_ms == 20));
    }

    #[test]
    fn test_default_classes_share_light_tap() {
        for kind in [WeaponKind::Unarmed, WeaponKind::Heavy, WeaponKind::Heal] {
            let (name, frames) = weapon_frames(kind);
            assert_eq!(name, "Weapon_Default");
            assert_eq!(frames.len(), 1);
            assert_eq!(frames.first().map(|f| f.left), Some(FfIntensity::Light));
        }
    }

    #[test]
    fn test_environment_patterns_respect_requested_level() {
        let (_, frames) = environment_frames(EnvironmentKind::Electric, FfIntensity::Strong);
        assert!(frames.iter().all(|f| f.peak() <= FfIntensity::Strong));
        let (_, calm) = environment_frames(EnvironmentKind::Wind, FfIntensity::Weak);
        assert!(calm.iter().all(|f| f.peak() <= FfIntensity::Weak));
    }

    #[test]
    fn test_impact_scales_with_force() {
        let (_, hard) = impact_frames(1.0);
        let (_, soft) = impact_frames(0.2);
        assert_eq!(hard.first().map(|f| f.left), Some(FfIntensity::Max));
        assert!(soft.first().map(|f| f.left) < hard.first().map(|f| f.left));
    }
}
