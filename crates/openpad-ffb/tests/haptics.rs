//! Behavioral tests for the force feedback engine.

use std::sync::Arc;

use parking_lot::Mutex;

use openpad_curves::IntensityCurve;
use openpad_device_types::{OutputEvent, OutputSink};
use openpad_errors::{PadError, Result};
use openpad_ffb::{
    EnvironmentKind, FfEngine, FfFrame, FfIntensity, MAX_PATTERNS, MAX_PROFILES, WeaponKind,
};
use openpad_store::{MemoryStore, RecordKind};

#[derive(Default)]
struct RumbleLog {
    events: Mutex<Vec<(usize, f32, f32)>>,
}

impl RumbleLog {
    fn take(&self) -> Vec<(usize, f32, f32)> {
        std::mem::take(&mut *self.events.lock())
    }

    fn len(&self) -> usize {
        self.events.lock().len()
    }
}

impl OutputSink for RumbleLog {
    fn dispatch(&self, device: usize, event: OutputEvent) {
        if let OutputEvent::Rumble { left, right } = event {
            self.events.lock().push((device, left, right));
        }
    }
}

fn engine() -> (FfEngine, Arc<RumbleLog>, Arc<MemoryStore>) {
    let sink = Arc::new(RumbleLog::default());
    let store = Arc::new(MemoryStore::new());
    (FfEngine::new(sink.clone(), store.clone()), sink, store)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn weapon_trigger_dispatches_first_frame_immediately() -> Result<()> {
    let (engine, log, _) = engine();
    engine.trigger_weapon(0, WeaponKind::Pistol, 1.0)?;
    let events = log.take();
    // pistol frame 0: Medium/Light, linear curve
    assert_eq!(events.len(), 1);
    let (device, left, right) = events[0];
    assert_eq!(device, 0);
    assert!(close(left, 0.5));
    assert!(close(right, 0.35));
    assert!(engine.is_playing(0)?);
    Ok(())
}

#[test]
fn weapon_playback_walks_frames_then_idles() -> Result<()> {
    let (engine, log, _) = engine();
    engine.trigger_weapon(0, WeaponKind::Pistol, 1.0)?;
    log.take();

    // 20 ms: frame 1 (Weak/Off)
    engine.update(20);
    let events = log.take();
    assert_eq!(events.len(), 1);
    let (_, left, right) = events[0];
    assert!(close(left, 0.2));
    assert!(close(right, 0.0));

    // 30 ms more: pattern over, motors zeroed
    engine.update(30);
    let events = log.take();
    assert_eq!(events.len(), 1);
    let (_, left, right) = events[0];
    assert!(close(left, 0.0) && close(right, 0.0));
    assert!(!engine.is_playing(0)?);
    Ok(())
}

#[test]
fn explosion_runs_three_stages_over_240ms() -> Result<()> {
    let (engine, log, _) = engine();
    engine.trigger_weapon(1, WeaponKind::Explosion, 1.0)?;
    // entry frame: Max/Max through the exponential curve (1.0² = 1.0)
    let entry = log.take();
    assert_eq!(entry.first().copied(), Some((1, 1.0, 1.0)));

    engine.update(60);
    let stage2 = log.take();
    assert_eq!(stage2.len(), 1);
    assert!(close(stage2[0].1, 0.75));

    engine.update(100);
    let stage3 = log.take();
    assert_eq!(stage3.len(), 1);
    assert!(close(stage3[0].1, 0.35));

    engine.update(80);
    assert!(!engine.is_playing(1)?);
    Ok(())
}

#[test]
fn melee_spike_is_shaped_by_exponential_curve() -> Result<()> {
    let (engine, log, _) = engine();
    engine.trigger_weapon(0, WeaponKind::Melee, 1.0)?;
    let events = log.take();
    // VeryStrong (1.0) through x² stays 1.0
    assert_eq!(events.first().copied(), Some((0, 1.0, 1.0)));
    Ok(())
}

#[test]
fn trigger_intensity_scales_output() -> Result<()> {
    let (engine, log, _) = engine();
    engine.trigger_weapon(0, WeaponKind::Pistol, 0.5)?;
    let events = log.take();
    let (_, left, _) = events[0];
    assert!(close(left, 0.25)); // Medium 0.5 × trigger 0.5
    Ok(())
}

#[test]
fn disabled_device_makes_triggers_silent_successes() -> Result<()> {
    let (engine, log, _) = engine();
    engine.set_enabled(Some(2), false)?;

    engine.trigger_weapon(2, WeaponKind::Shotgun, 1.0)?;
    engine.trigger_environment(2, EnvironmentKind::Fire, FfIntensity::Strong)?;
    engine.trigger_impact(2, 1.0, 0)?;
    assert_eq!(log.len(), 0);
    assert!(!engine.is_playing(2)?);

    // other devices unaffected
    engine.trigger_weapon(0, WeaponKind::Shotgun, 1.0)?;
    assert_eq!(log.len(), 1);
    Ok(())
}

#[test]
fn disable_all_stops_running_effects() -> Result<()> {
    let (engine, log, _) = engine();
    engine.trigger_weapon(0, WeaponKind::Rifle, 1.0)?;
    engine.trigger_weapon(1, WeaponKind::Rifle, 1.0)?;
    log.take();

    engine.set_enabled(None, false)?;
    let events = log.take();
    // both devices got a zero rumble
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|(_, l, r)| close(*l, 0.0) && close(*r, 0.0)));
    assert!(!engine.is_playing(0)? && !engine.is_playing(1)?);
    Ok(())
}

#[test]
fn invalid_arguments_are_rejected() {
    let (engine, _, _) = engine();
    assert!(engine.trigger_weapon(4, WeaponKind::Pistol, 1.0).is_err());
    assert!(engine.trigger_weapon(0, WeaponKind::Pistol, 1.5).is_err());
    assert!(engine.trigger_impact(0, 0.5, 8).is_err());
    assert!(engine.set_global_scale(2.5).is_err());
    assert!(engine.set_global_scale(-0.1).is_err());
}

#[test]
fn impact_damage_is_clamped_not_rejected() -> Result<()> {
    let (engine, log, _) = engine();
    engine.trigger_impact(0, 7.5, 3)?;
    let events = log.take();
    // clamped to 1.0 → Max level through x²
    assert_eq!(events.first().copied(), Some((0, 1.0, 1.0)));
    Ok(())
}

#[test]
fn custom_pattern_lifecycle() -> Result<()> {
    let (engine, log, _) = engine();
    let id = engine.create_pattern("heartbeat")?;
    engine.add_frame(
        id,
        FfFrame::new(FfIntensity::Strong, FfIntensity::Off, 100, IntensityCurve::Linear),
    )?;
    engine.add_frame(
        id,
        FfFrame::new(FfIntensity::Off, FfIntensity::Off, 400, IntensityCurve::Linear),
    )?;

    let pattern = engine.pattern(id)?;
    assert_eq!(pattern.total_duration_ms(), 500);
    assert_eq!(pattern.max_intensity(), FfIntensity::Strong);

    engine.trigger_pattern(0, id, false, 1.0)?;
    assert_eq!(log.take().first().copied(), Some((0, 0.75, 0.0)));

    engine.clear_pattern(id)?;
    assert_eq!(engine.pattern(id)?.frames().len(), 0);
    engine.delete_pattern(id)?;
    assert!(matches!(engine.pattern(id), Err(PadError::NotFound { .. })));
    Ok(())
}

#[test]
fn looping_pattern_repeats_until_stop() -> Result<()> {
    let (engine, log, _) = engine();
    let id = engine.create_pattern("pulse")?;
    engine.add_frame(
        id,
        FfFrame::new(FfIntensity::Medium, FfIntensity::Medium, 50, IntensityCurve::Linear),
    )?;
    engine.add_frame(
        id,
        FfFrame::new(FfIntensity::Off, FfIntensity::Off, 50, IntensityCurve::Linear),
    )?;

    engine.trigger_pattern(0, id, true, 1.0)?;
    log.take();
    for _ in 0..5 {
        engine.update(100);
        assert!(engine.is_playing(0)?);
    }
    // two frame entries per 100 ms cycle
    assert_eq!(log.take().len(), 10);

    engine.stop(Some(0))?;
    assert!(!engine.is_playing(0)?);
    let events = log.take();
    assert_eq!(events.len(), 1);
    assert!(close(events[0].1, 0.0));
    engine.update(200);
    assert_eq!(log.len(), 0, "stop is synchronous");
    Ok(())
}

#[test]
fn disabled_pattern_cannot_be_triggered() -> Result<()> {
    let (engine, _, _) = engine();
    let id = engine.create_pattern("off")?;
    engine.add_frame(
        id,
        FfFrame::new(FfIntensity::Weak, FfIntensity::Weak, 10, IntensityCurve::Linear),
    )?;
    engine.set_pattern_enabled(id, false)?;
    assert!(matches!(
        engine.trigger_pattern(0, id, false, 1.0),
        Err(PadError::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn profile_shapes_output() -> Result<()> {
    let (engine, log, _) = engine();
    let profile = engine.create_profile("half", IntensityCurve::Linear)?;
    engine.set_profile_scale(profile, 0.5)?;
    engine.activate_profile(profile)?;
    assert_eq!(engine.active_profile(), Some(profile));

    engine.trigger_weapon(0, WeaponKind::Melee, 1.0)?;
    let events = log.take();
    // VeryStrong spike halved by the profile gain
    assert!(close(events[0].1, 0.5));
    Ok(())
}

#[test]
fn weapon_sensitivity_applies_to_weapon_triggers_only() -> Result<()> {
    let (engine, log, _) = engine();
    let profile = engine.create_profile("sens", IntensityCurve::Linear)?;
    engine.set_weapon_sensitivity(profile, 2.0)?;
    engine.activate_profile(profile)?;

    engine.trigger_weapon(0, WeaponKind::Pistol, 1.0)?;
    let weapon = log.take();
    // Medium 0.5 × sensitivity 2.0, clamped within [0,1]
    assert!(close(weapon[0].1, 1.0));

    engine.trigger_environment(1, EnvironmentKind::Wind, FfIntensity::Medium)?;
    let env = log.take();
    // wind frame is Light (one step under Medium) through its sigmoid
    // curve, and env sensitivity is still 1.0
    let expected = 0.35_f32 * 0.35 * (3.0 - 2.0 * 0.35);
    assert!(close(env[0].1, expected));
    Ok(())
}

#[test]
fn exponential_profile_curve_shapes_profile_gain() -> Result<()> {
    let (engine, log, _) = engine();
    let profile = engine.create_profile("exp", IntensityCurve::Exponential)?;
    engine.set_profile_scale(profile, 0.5)?;
    engine.activate_profile(profile)?;

    engine.trigger_weapon(0, WeaponKind::Melee, 1.0)?;
    let events = log.take();
    // profile gain = 0.5² = 0.25; spike 1.0 × 0.25
    assert!(close(events[0].1, 0.25));
    Ok(())
}

#[test]
fn global_scale_multiplies_everything() -> Result<()> {
    let (engine, log, _) = engine();
    engine.set_global_scale(0.5)?;
    engine.trigger_weapon(0, WeaponKind::Melee, 1.0)?;
    let events = log.take();
    assert!(close(events[0].1, 0.5));
    assert!(close(engine.global_scale(), 0.5));
    Ok(())
}

#[test]
fn profile_setters_validate_ranges() -> Result<()> {
    let (engine, _, _) = engine();
    let profile = engine.create_profile("p", IntensityCurve::Linear)?;
    assert!(engine.set_profile_scale(profile, 1.5).is_err());
    assert!(engine.set_weapon_sensitivity(profile, 0.4).is_err());
    assert!(engine.set_weapon_sensitivity(profile, 2.1).is_err());
    assert!(engine.set_environment_sensitivity(profile, 3.0).is_err());
    engine.set_adaptive_intensity(profile, true)?;
    assert!(engine.profile(profile)?.adaptive_intensity);
    Ok(())
}

#[test]
fn deleting_active_profile_deactivates_it() -> Result<()> {
    let (engine, _, _) = engine();
    let profile = engine.create_profile("gone", IntensityCurve::Linear)?;
    engine.activate_profile(profile)?;
    engine.delete_profile(profile)?;
    assert_eq!(engine.active_profile(), None);
    Ok(())
}

#[test]
fn tables_are_bounded() -> Result<()> {
    let (engine, _, _) = engine();
    for i in 0..MAX_PROFILES {
        engine.create_profile(&format!("p{i}"), IntensityCurve::Linear)?;
    }
    assert!(matches!(
        engine.create_profile("extra", IntensityCurve::Linear),
        Err(PadError::CapacityExceeded { .. })
    ));

    for i in 0..MAX_PATTERNS {
        engine.create_pattern(&format!("pat{i}"))?;
    }
    assert!(matches!(
        engine.create_weapon_pattern(WeaponKind::Pistol),
        Err(PadError::CapacityExceeded { .. })
    ));
    Ok(())
}

#[test]
fn registered_weapon_pattern_matches_canonical_frames() -> Result<()> {
    let (engine, _, _) = engine();
    let id = engine.create_weapon_pattern(WeaponKind::Shotgun)?;
    let pattern = engine.pattern(id)?;
    assert_eq!(pattern.name(), "Weapon_Shotgun");
    assert_eq!(pattern.total_duration_ms(), 80);
    assert_eq!(pattern.max_intensity(), FfIntensity::Max);
    Ok(())
}

#[test]
fn deleting_pattern_mid_play_lets_snapshot_finish() -> Result<()> {
    let (engine, log, _) = engine();
    let id = engine.create_pattern("short")?;
    engine.add_frame(
        id,
        FfFrame::new(FfIntensity::Light, FfIntensity::Light, 30, IntensityCurve::Linear),
    )?;
    engine.trigger_pattern(0, id, false, 1.0)?;
    engine.delete_pattern(id)?;
    log.take();

    engine.update(30);
    // the snapshot still ended cleanly with a zero rumble
    let events = log.take();
    assert_eq!(events.len(), 1);
    assert!(close(events[0].1, 0.0));
    Ok(())
}

#[test]
fn profile_save_load_round_trip() -> Result<()> {
    let (engine, _, store) = engine();
    let profile = engine.create_profile("saved", IntensityCurve::Sigmoid)?;
    engine.set_profile_scale(profile, 0.75)?;
    engine.set_weapon_sensitivity(profile, 1.25)?;
    engine.save_profile(profile, 0, 2)?;

    let fresh = FfEngine::new(Arc::new(openpad_device_types::NullSink), store);
    let loaded = fresh.load_profile(0, 2)?;
    let restored = fresh.profile(loaded)?;
    assert_eq!(restored.name(), "saved");
    assert!((restored.intensity_scale - 0.75).abs() < 1e-6);
    assert!((restored.weapon_sensitivity - 1.25).abs() < 1e-6);
    Ok(())
}

#[test]
fn pattern_save_load_round_trip() -> Result<()> {
    let (engine, _, store) = engine();
    let id = engine.create_weapon_pattern(WeaponKind::Explosion)?;
    engine.save_pattern(id, 1, 0)?;

    let fresh = FfEngine::new(Arc::new(openpad_device_types::NullSink), store);
    let loaded = fresh.load_pattern(1, 0)?;
    let restored = fresh.pattern(loaded)?;
    assert_eq!(restored.name(), "Weapon_Explosion");
    assert_eq!(restored.frames().len(), 3);
    assert_eq!(restored.total_duration_ms(), 240);

    fresh.erase_saved(RecordKind::FfPattern, 1, 0)?;
    assert!(matches!(fresh.load_pattern(1, 0), Err(PadError::NotFound { .. })));
    Ok(())
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    const KINDS: [WeaponKind; 10] = [
        WeaponKind::Unarmed,
        WeaponKind::Pistol,
        WeaponKind::Rifle,
        WeaponKind::Shotgun,
        WeaponKind::Melee,
        WeaponKind::Explosion,
        WeaponKind::Heavy,
        WeaponKind::Hit,
        WeaponKind::Heal,
        WeaponKind::PowerUp,
    ];

    proptest! {
        #[test]
        fn prop_motor_levels_stay_normalized(
            kind in 0usize..KINDS.len(),
            intensity in 0.0f32..=1.0,
            scale in 0.0f32..=2.0,
        ) {
            let (engine, log, _) = engine();
            prop_assert!(engine.set_global_scale(scale).is_ok());
            prop_assert!(engine.trigger_weapon(0, KINDS[kind], intensity).is_ok());
            engine.update(500);
            for (_, left, right) in log.take() {
                prop_assert!((0.0..=1.0).contains(&left));
                prop_assert!((0.0..=1.0).contains(&right));
            }
        }
    }
}

#[test]
fn environment_trigger_plays_and_finishes() -> Result<()> {
    let (engine, log, _) = engine();
    engine.trigger_environment(3, EnvironmentKind::Electric, FfIntensity::Strong)?;
    assert!(engine.is_playing(3)?);
    assert!(log.len() > 0);
    engine.update(60);
    assert!(!engine.is_playing(3)?);
    Ok(())
}
