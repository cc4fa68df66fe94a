//! The force feedback engine: pattern/profile tables and per-device frame
//! playback.

use std::sync::Arc;

use openpad_curves::IntensityCurve;
use openpad_device_types::{MAX_DEVICES, OutputEvent, OutputSink};
use openpad_errors::{PadError, Result};
use openpad_store::{RecordKind, SlotKey, SlotStore};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::intensity::FfIntensity;
use crate::pattern::{FfFrame, FfPattern, PatternId};
use crate::profile::{FfProfile, ProfileId};
use crate::weapons::{self, EnvironmentKind, WeaponKind};
use crate::{MAX_FRAMES, MAX_GLOBAL_SCALE, MAX_PATTERNS, MAX_PROFILES, SAVE_SLOTS, wire};

/// Where a playing effect came from; selects the sensitivity multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerSource {
    Direct,
    Weapon,
    Environment,
}

struct FfPlayback {
    frames: Vec<FfFrame>,
    position: usize,
    remaining_ms: u32,
    looping: bool,
    source: TriggerSource,
    trigger_gain: f32,
}

struct DeviceFf {
    enabled: bool,
    playback: Option<FfPlayback>,
}

impl Default for DeviceFf {
    fn default() -> Self {
        Self {
            enabled: true,
            playback: None,
        }
    }
}

struct EngineState {
    patterns: Vec<FfPattern>,
    profiles: Vec<FfProfile>,
    next_pattern_id: PatternId,
    next_profile_id: ProfileId,
    active_profile: Option<ProfileId>,
    global_scale: f32,
    devices: [DeviceFf; MAX_DEVICES],
}

impl EngineState {
    fn pattern_index(&self, id: PatternId) -> Option<usize> {
        self.patterns.iter().position(|p| p.id() == id)
    }

    fn profile_index(&self, id: ProfileId) -> Option<usize> {
        self.profiles.iter().position(|p| p.id() == id)
    }

    /// Gain and sensitivity from the active profile for a trigger source.
    fn profile_terms(&self, source: TriggerSource) -> f32 {
        let Some(profile) = self
            .active_profile
            .and_then(|id| self.profile_index(id))
            .and_then(|i| self.profiles.get(i))
        else {
            return 1.0;
        };
        let sensitivity = match source {
            TriggerSource::Direct => 1.0,
            TriggerSource::Weapon => profile.weapon_sensitivity,
            TriggerSource::Environment => profile.environment_sensitivity,
        };
        profile.gain() * sensitivity
    }

    /// Motor levels for the frame a device playback just entered.
    fn frame_levels(&self, playback: &FfPlayback) -> Option<(f32, f32)> {
        let frame = playback.frames.get(playback.position)?;
        let gain = self.profile_terms(playback.source) * self.global_scale * playback.trigger_gain;
        let left = (frame.curve.evaluate(frame.left.fraction()) * gain).clamp(0.0, 1.0);
        let right = (frame.curve.evaluate(frame.right.fraction()) * gain).clamp(0.0, 1.0);
        Some((left, right))
    }
}

fn check_device(device: usize) -> Result<()> {
    if device >= MAX_DEVICES {
        return Err(PadError::out_of_range("device", device, 0, MAX_DEVICES - 1));
    }
    Ok(())
}

fn check_slot(slot: u8) -> Result<()> {
    if slot as usize >= SAVE_SLOTS {
        return Err(PadError::out_of_range("slot", slot as usize, 0, SAVE_SLOTS - 1));
    }
    Ok(())
}

fn check_unit(field: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(PadError::out_of_range(field, value, 0.0, 1.0));
    }
    Ok(())
}

/// Plays authored intensity patterns on up to [`MAX_DEVICES`] gamepads.
///
/// Tables and per-device playback state sit behind one mutex held for the
/// duration of a single operation; motor output goes through the injected
/// [`OutputSink`] as [`OutputEvent::Rumble`] events after the lock is
/// released.
///
/// Haptics disabled for the target device make every trigger a silent
/// success: callers fire feedback unconditionally and players without
/// rumble hardware simply feel nothing.
pub struct FfEngine {
    inner: Mutex<EngineState>,
    sink: Arc<dyn OutputSink>,
    store: Arc<dyn SlotStore>,
}

impl std::fmt::Debug for FfEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("FfEngine")
            .field("patterns", &inner.patterns.len())
            .field("profiles", &inner.profiles.len())
            .field("active_profile", &inner.active_profile)
            .finish()
    }
}

impl FfEngine {
    /// Create an engine with feedback enabled on every device and a neutral
    /// global scale.
    pub fn new(sink: Arc<dyn OutputSink>, store: Arc<dyn SlotStore>) -> Self {
        Self {
            inner: Mutex::new(EngineState {
                patterns: Vec::new(),
                profiles: Vec::new(),
                next_pattern_id: 1,
                next_profile_id: 1,
                active_profile: None,
                global_scale: 1.0,
                devices: Default::default(),
            }),
            sink,
            store,
        }
    }

    // ------------------------------------------------------------------
    // Enablement and global scale
    // ------------------------------------------------------------------

    /// Enable or disable feedback for one device, or for all when `device`
    /// is `None`. Disabling a device stops anything it is playing.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn set_enabled(&self, device: Option<usize>, enabled: bool) -> Result<()> {
        let mut stopped = Vec::new();
        {
            let mut inner = self.inner.lock();
            match device {
                Some(device) => {
                    check_device(device)?;
                    if let Some(state) = inner.devices.get_mut(device) {
                        state.enabled = enabled;
                        if !enabled && state.playback.take().is_some() {
                            stopped.push(device);
                        }
                    }
                }
                None => {
                    for (index, state) in inner.devices.iter_mut().enumerate() {
                        state.enabled = enabled;
                        if !enabled && state.playback.take().is_some() {
                            stopped.push(index);
                        }
                    }
                }
            }
        }
        info!(?device, enabled, "force feedback toggled");
        for device in stopped {
            self.sink.dispatch(
                device,
                OutputEvent::Rumble {
                    left: 0.0,
                    right: 0.0,
                },
            );
        }
        Ok(())
    }

    /// Whether feedback is enabled for a device.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn is_enabled(&self, device: usize) -> Result<bool> {
        check_device(device)?;
        Ok(self
            .inner
            .lock()
            .devices
            .get(device)
            .is_some_and(|d| d.enabled))
    }

    /// Set the engine-wide intensity scale.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` outside `[0, 2]`.
    pub fn set_global_scale(&self, scale: f32) -> Result<()> {
        if !scale.is_finite() || !(0.0..=MAX_GLOBAL_SCALE).contains(&scale) {
            return Err(PadError::out_of_range("scale", scale, 0.0, MAX_GLOBAL_SCALE));
        }
        self.inner.lock().global_scale = scale;
        Ok(())
    }

    /// The engine-wide intensity scale.
    pub fn global_scale(&self) -> f32 {
        self.inner.lock().global_scale
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    /// Create a profile with neutral settings and the given default curve.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name, `CapacityExceeded` at
    /// [`MAX_PROFILES`].
    pub fn create_profile(&self, name: &str, default_curve: IntensityCurve) -> Result<ProfileId> {
        if name.is_empty() {
            return Err(PadError::invalid("name", name, "non-empty"));
        }
        let mut inner = self.inner.lock();
        if inner.profiles.len() >= MAX_PROFILES {
            return Err(PadError::capacity("ff profile", MAX_PROFILES));
        }
        let id = inner.next_profile_id;
        inner.next_profile_id += 1;
        inner
            .profiles
            .push(FfProfile::new(id, name.to_string(), default_curve));
        info!(profile_id = id, name, "created ff profile");
        Ok(id)
    }

    /// Delete a profile. An active profile falls back to none.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn delete_profile(&self, id: ProfileId) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .profile_index(id)
            .ok_or(PadError::not_found("ff profile", id))?;
        inner.profiles.remove(index);
        if inner.active_profile == Some(id) {
            inner.active_profile = None;
        }
        info!(profile_id = id, "deleted ff profile");
        Ok(())
    }

    /// Snapshot a profile.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn profile(&self, id: ProfileId) -> Result<FfProfile> {
        let inner = self.inner.lock();
        inner
            .profile_index(id)
            .and_then(|i| inner.profiles.get(i))
            .cloned()
            .ok_or(PadError::not_found("ff profile", id))
    }

    /// Snapshot every profile.
    pub fn profiles(&self) -> Vec<FfProfile> {
        self.inner.lock().profiles.clone()
    }

    /// Make a profile the one shaping subsequent effects.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `InvalidArgument` for a disabled
    /// profile.
    pub fn activate_profile(&self, id: ProfileId) -> Result<()> {
        let mut inner = self.inner.lock();
        let enabled = inner
            .profile_index(id)
            .and_then(|i| inner.profiles.get(i))
            .map(|p| p.enabled)
            .ok_or(PadError::not_found("ff profile", id))?;
        if !enabled {
            return Err(PadError::invalid("profile", id, "enabled"));
        }
        inner.active_profile = Some(id);
        info!(profile_id = id, "activated ff profile");
        Ok(())
    }

    /// The currently active profile, if any.
    pub fn active_profile(&self) -> Option<ProfileId> {
        self.inner.lock().active_profile
    }

    /// Set a profile's master intensity.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` outside `[0,1]`, `NotFound` for an unknown id.
    pub fn set_profile_scale(&self, id: ProfileId, scale: f32) -> Result<()> {
        check_unit("intensity scale", scale)?;
        self.edit_profile(id, |p| p.intensity_scale = scale)
    }

    /// Set a profile's weapon sensitivity.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` outside `[0.5,2.0]`, `NotFound` for an unknown id.
    pub fn set_weapon_sensitivity(&self, id: ProfileId, sensitivity: f32) -> Result<()> {
        if !sensitivity.is_finite() || !(0.5..=2.0).contains(&sensitivity) {
            return Err(PadError::out_of_range("weapon sensitivity", sensitivity, 0.5, 2.0));
        }
        self.edit_profile(id, |p| p.weapon_sensitivity = sensitivity)
    }

    /// Set a profile's environment sensitivity.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` outside `[0.5,2.0]`, `NotFound` for an unknown id.
    pub fn set_environment_sensitivity(&self, id: ProfileId, sensitivity: f32) -> Result<()> {
        if !sensitivity.is_finite() || !(0.5..=2.0).contains(&sensitivity) {
            return Err(PadError::out_of_range(
                "environment sensitivity",
                sensitivity,
                0.5,
                2.0,
            ));
        }
        self.edit_profile(id, |p| p.environment_sensitivity = sensitivity)
    }

    /// Toggle a profile's adaptive intensity flag.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn set_adaptive_intensity(&self, id: ProfileId, enabled: bool) -> Result<()> {
        self.edit_profile(id, |p| p.adaptive_intensity = enabled)
    }

    fn edit_profile(&self, id: ProfileId, edit: impl FnOnce(&mut FfProfile)) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .profile_index(id)
            .ok_or(PadError::not_found("ff profile", id))?;
        if let Some(profile) = inner.profiles.get_mut(index) {
            edit(profile);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    /// Create an empty pattern.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name, `CapacityExceeded` at
    /// [`MAX_PATTERNS`].
    pub fn create_pattern(&self, name: &str) -> Result<PatternId> {
        if name.is_empty() {
            return Err(PadError::invalid("name", name, "non-empty"));
        }
        let mut inner = self.inner.lock();
        if inner.patterns.len() >= MAX_PATTERNS {
            return Err(PadError::capacity("ff pattern", MAX_PATTERNS));
        }
        let id = inner.next_pattern_id;
        inner.next_pattern_id += 1;
        inner
            .patterns
            .push(FfPattern::new(id, name.to_string(), Vec::new(), true));
        info!(pattern_id = id, name, "created ff pattern");
        Ok(id)
    }

    /// Register the canonical pattern for a weapon class.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` at [`MAX_PATTERNS`].
    pub fn create_weapon_pattern(&self, kind: WeaponKind) -> Result<PatternId> {
        let (name, frames) = weapons::weapon_frames(kind);
        let mut inner = self.inner.lock();
        if inner.patterns.len() >= MAX_PATTERNS {
            return Err(PadError::capacity("ff pattern", MAX_PATTERNS));
        }
        let id = inner.next_pattern_id;
        inner.next_pattern_id += 1;
        inner
            .patterns
            .push(FfPattern::new(id, name.to_string(), frames, true));
        info!(pattern_id = id, ?kind, "registered weapon pattern");
        Ok(id)
    }

    /// Append a frame to a pattern, updating its cached duration and peak.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown pattern, `CapacityExceeded` at
    /// [`MAX_FRAMES`] frames.
    pub fn add_frame(&self, id: PatternId, frame: FfFrame) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .pattern_index(id)
            .ok_or(PadError::not_found("ff pattern", id))?;
        let pattern = inner
            .patterns
            .get_mut(index)
            .ok_or(PadError::not_found("ff pattern", id))?;
        if pattern.frames().len() >= MAX_FRAMES {
            return Err(PadError::capacity("ff frame", MAX_FRAMES));
        }
        pattern.push_frame(frame);
        Ok(())
    }

    /// Delete a pattern. Running playbacks keep their snapshot and finish
    /// normally.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn delete_pattern(&self, id: PatternId) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .pattern_index(id)
            .ok_or(PadError::not_found("ff pattern", id))?;
        inner.patterns.remove(index);
        info!(pattern_id = id, "deleted ff pattern");
        Ok(())
    }

    /// Snapshot a pattern.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn pattern(&self, id: PatternId) -> Result<FfPattern> {
        let inner = self.inner.lock();
        inner
            .pattern_index(id)
            .and_then(|i| inner.patterns.get(i))
            .cloned()
            .ok_or(PadError::not_found("ff pattern", id))
    }

    /// Snapshot every pattern.
    pub fn patterns(&self) -> Vec<FfPattern> {
        self.inner.lock().patterns.clone()
    }

    /// Drop every frame from a pattern.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn clear_pattern(&self, id: PatternId) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .pattern_index(id)
            .ok_or(PadError::not_found("ff pattern", id))?;
        if let Some(pattern) = inner.patterns.get_mut(index) {
            pattern.clear_frames();
        }
        Ok(())
    }

    /// Allow or refuse triggering a pattern.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn set_pattern_enabled(&self, id: PatternId, enabled: bool) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .pattern_index(id)
            .ok_or(PadError::not_found("ff pattern", id))?;
        if let Some(pattern) = inner.patterns.get_mut(index) {
            pattern.set_enabled(enabled);
        }
        debug!(pattern_id = id, enabled, "ff pattern toggled");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Triggers
    // ------------------------------------------------------------------

    /// Play a stored pattern on a device.
    ///
    /// Disabled haptics on the device are a silent success.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device or intensity outside `[0,1]`,
    /// `NotFound` for an unknown or disabled pattern.
    pub fn trigger_pattern(
        &self,
        device: usize,
        pattern_id: PatternId,
        looping: bool,
        intensity: f32,
    ) -> Result<()> {
        check_device(device)?;
        check_unit("intensity", intensity)?;
        let mut inner = self.inner.lock();
        if !inner.devices.get(device).is_some_and(|d| d.enabled) {
            return Ok(());
        }
        let frames = {
            let pattern = inner
                .pattern_index(pattern_id)
                .and_then(|i| inner.patterns.get(i))
                .filter(|p| p.is_enabled())
                .ok_or(PadError::not_found("ff pattern", pattern_id))?;
            pattern.frames().to_vec()
        };
        debug!(device, pattern_id, looping, intensity, "triggered ff pattern");
        self.begin_playback(&mut inner, device, frames, looping, TriggerSource::Direct, intensity);
        self.flush_entry(inner, device)
    }

    /// Fire the canonical feedback for a weapon class.
    ///
    /// Disabled haptics on the device are a silent success.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device or intensity outside `[0,1]`.
    pub fn trigger_weapon(&self, device: usize, kind: WeaponKind, intensity: f32) -> Result<()> {
        check_device(device)?;
        check_unit("intensity", intensity)?;
        let mut inner = self.inner.lock();
        if !inner.devices.get(device).is_some_and(|d| d.enabled) {
            return Ok(());
        }
        let (_, frames) = weapons::weapon_frames(kind);
        debug!(device, ?kind, intensity, "triggered weapon vibration");
        self.begin_playback(&mut inner, device, frames, false, TriggerSource::Weapon, intensity);
        self.flush_entry(inner, device)
    }

    /// Fire an environmental effect at a requested level.
    ///
    /// Disabled haptics on the device are a silent success.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn trigger_environment(
        &self,
        device: usize,
        kind: EnvironmentKind,
        level: FfIntensity,
    ) -> Result<()> {
        check_device(device)?;
        let mut inner = self.inner.lock();
        if !inner.devices.get(device).is_some_and(|d| d.enabled) {
            return Ok(());
        }
        let (_, frames) = weapons::environment_frames(kind, level);
        debug!(device, ?kind, ?level, "triggered environment vibration");
        self.begin_playback(&mut inner, device, frames, false, TriggerSource::Environment, 1.0);
        self.flush_entry(inner, device)
    }

    /// Fire damage feedback. `damage` is clamped to `[0,1]`.
    ///
    /// Disabled haptics on the device are a silent success.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device or a hit location outside `0..8`.
    pub fn trigger_impact(&self, device: usize, damage: f32, hit_location: u8) -> Result<()> {
        check_device(device)?;
        if hit_location >= 8 {
            return Err(PadError::out_of_range("hit location", hit_location as usize, 0, 7));
        }
        let mut inner = self.inner.lock();
        if !inner.devices.get(device).is_some_and(|d| d.enabled) {
            return Ok(());
        }
        let (_, frames) = weapons::impact_frames(damage.clamp(0.0, 1.0));
        debug!(device, damage, hit_location, "triggered impact vibration");
        self.begin_playback(&mut inner, device, frames, false, TriggerSource::Direct, 1.0);
        self.flush_entry(inner, device)
    }

    /// Stop feedback on one device, or on all when `device` is `None`.
    ///
    /// Synchronous: once this returns, no further frames from the stopped
    /// playbacks are dispatched.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn stop(&self, device: Option<usize>) -> Result<()> {
        let mut stopped = Vec::new();
        {
            let mut inner = self.inner.lock();
            match device {
                Some(device) => {
                    check_device(device)?;
                    if let Some(state) = inner.devices.get_mut(device) {
                        if state.playback.take().is_some() {
                            stopped.push(device);
                        }
                    }
                }
                None => {
                    for (index, state) in inner.devices.iter_mut().enumerate() {
                        if state.playback.take().is_some() {
                            stopped.push(index);
                        }
                    }
                }
            }
        }
        for device in &stopped {
            debug!(device, "stopped force feedback");
            self.sink.dispatch(
                *device,
                OutputEvent::Rumble {
                    left: 0.0,
                    right: 0.0,
                },
            );
        }
        Ok(())
    }

    /// Whether a device is playing an effect.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn is_playing(&self, device: usize) -> Result<bool> {
        check_device(device)?;
        Ok(self
            .inner
            .lock()
            .devices
            .get(device)
            .is_some_and(|d| d.playback.is_some()))
    }

    fn begin_playback(
        &self,
        inner: &mut EngineState,
        device: usize,
        frames: Vec<FfFrame>,
        looping: bool,
        source: TriggerSource,
        trigger_gain: f32,
    ) {
        if frames.is_empty() {
            return;
        }
        // A zero-length looping pattern would spin forever in update.
        let total: u32 = frames.iter().map(|f| f.duration_ms).sum();
        let looping = looping && total > 0;
        let remaining_ms = frames.first().map(|f| f.duration_ms).unwrap_or(0);
        if let Some(state) = inner.devices.get_mut(device) {
            state.playback = Some(FfPlayback {
                frames,
                position: 0,
                remaining_ms,
                looping,
                source,
                trigger_gain,
            });
        }
    }

    /// Dispatch the entry levels of the frame the device just moved to.
    fn flush_entry(
        &self,
        inner: parking_lot::MutexGuard<'_, EngineState>,
        device: usize,
    ) -> Result<()> {
        let levels = inner
            .devices
            .get(device)
            .and_then(|d| d.playback.as_ref())
            .and_then(|p| inner.frame_levels(p));
        drop(inner);
        if let Some((left, right)) = levels {
            self.sink.dispatch(device, OutputEvent::Rumble { left, right });
        }
        Ok(())
    }

    /// Advance every device's effect by `delta_ms`. Each newly entered frame
    /// dispatches its scaled motor levels; a finished non-looping effect
    /// dispatches a zero rumble and idles, a looping one restarts.
    pub fn update(&self, delta_ms: u32) {
        let mut dispatches: Vec<(usize, OutputEvent)> = Vec::new();
        {
            let mut inner = self.inner.lock();
            // The lock is held for the whole pass, so the profile terms are
            // stable per source.
            let source_gain = [
                inner.profile_terms(TriggerSource::Direct),
                inner.profile_terms(TriggerSource::Weapon),
                inner.profile_terms(TriggerSource::Environment),
            ];
            let global_scale = inner.global_scale;
            for (device, dev) in inner.devices.iter_mut().enumerate() {
                let Some(playback) = dev.playback.as_mut() else {
                    continue;
                };
                let profile_gain = match playback.source {
                    TriggerSource::Direct => source_gain[0],
                    TriggerSource::Weapon => source_gain[1],
                    TriggerSource::Environment => source_gain[2],
                };
                let gain = profile_gain * global_scale * playback.trigger_gain;
                let mut delta = delta_ms;
                let mut finished = false;
                loop {
                    if delta < playback.remaining_ms {
                        playback.remaining_ms -= delta;
                        break;
                    }
                    delta -= playback.remaining_ms;
                    playback.position += 1;
                    if playback.position >= playback.frames.len() {
                        if playback.looping {
                            playback.position = 0;
                        } else {
                            finished = true;
                            break;
                        }
                    }
                    playback.remaining_ms = playback
                        .frames
                        .get(playback.position)
                        .map(|f| f.duration_ms)
                        .unwrap_or(0);
                    if let Some(frame) = playback.frames.get(playback.position) {
                        let left =
                            (frame.curve.evaluate(frame.left.fraction()) * gain).clamp(0.0, 1.0);
                        let right =
                            (frame.curve.evaluate(frame.right.fraction()) * gain).clamp(0.0, 1.0);
                        dispatches.push((device, OutputEvent::Rumble { left, right }));
                    }
                    if delta == 0 {
                        break;
                    }
                }
                if finished {
                    dev.playback = None;
                    dispatches.push((
                        device,
                        OutputEvent::Rumble {
                            left: 0.0,
                            right: 0.0,
                        },
                    ));
                }
            }
        }
        for (device, event) in dispatches {
            self.sink.dispatch(device, event);
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist a profile into `(device, slot)`. Fire-and-forget: store
    /// failures are logged, not surfaced.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown profile, `InvalidArgument` for an
    /// out-of-range device or slot.
    pub fn save_profile(&self, id: ProfileId, device: u8, slot: u8) -> Result<()> {
        check_device(device as usize)?;
        check_slot(slot)?;
        let profile = self.profile(id)?;
        let key = SlotKey::new(RecordKind::FfProfile, device, slot);
        if let Err(err) = self.store.save(key, &wire::encode_profile(&profile)) {
            warn!(%key, error = %err, "failed to persist ff profile");
        }
        Ok(())
    }

    /// Load a persisted profile from `(device, slot)` under a fresh id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the slot is empty, `InvalidArgument` when the record
    /// does not decode, `CapacityExceeded` when the table is full.
    pub fn load_profile(&self, device: u8, slot: u8) -> Result<ProfileId> {
        check_device(device as usize)?;
        check_slot(slot)?;
        let key = SlotKey::new(RecordKind::FfProfile, device, slot);
        let blob = self
            .store
            .load(key)
            .map_err(|_| PadError::not_found("saved ff profile", slot as u32))?;
        let record = wire::decode_profile(&blob)
            .map_err(|err| PadError::invalid("ff profile record", err.to_string(), "decodable record"))?;
        let mut inner = self.inner.lock();
        if inner.profiles.len() >= MAX_PROFILES {
            return Err(PadError::capacity("ff profile", MAX_PROFILES));
        }
        let id = inner.next_profile_id;
        inner.next_profile_id += 1;
        inner.profiles.push(record.with_id(id));
        info!(profile_id = id, %key, "loaded ff profile");
        Ok(id)
    }

    /// Persist a pattern into `(device, slot)`. Fire-and-forget.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown pattern, `InvalidArgument` for an
    /// out-of-range device or slot.
    pub fn save_pattern(&self, id: PatternId, device: u8, slot: u8) -> Result<()> {
        check_device(device as usize)?;
        check_slot(slot)?;
        let pattern = self.pattern(id)?;
        let key = SlotKey::new(RecordKind::FfPattern, device, slot);
        if let Err(err) = self.store.save(key, &wire::encode_pattern(&pattern)) {
            warn!(%key, error = %err, "failed to persist ff pattern");
        }
        Ok(())
    }

    /// Load a persisted pattern from `(device, slot)` under a fresh id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the slot is empty, `InvalidArgument` when the record
    /// does not decode, `CapacityExceeded` when the table is full.
    pub fn load_pattern(&self, device: u8, slot: u8) -> Result<PatternId> {
        check_device(device as usize)?;
        check_slot(slot)?;
        let key = SlotKey::new(RecordKind::FfPattern, device, slot);
        let blob = self
            .store
            .load(key)
            .map_err(|_| PadError::not_found("saved ff pattern", slot as u32))?;
        let mut inner = self.inner.lock();
        if inner.patterns.len() >= MAX_PATTERNS {
            return Err(PadError::capacity("ff pattern", MAX_PATTERNS));
        }
        let id = inner.next_pattern_id;
        let pattern = wire::decode_pattern(&blob, id)
            .map_err(|err| PadError::invalid("ff pattern record", err.to_string(), "decodable record"))?;
        inner.next_pattern_id += 1;
        inner.patterns.push(pattern);
        info!(pattern_id = id, %key, "loaded ff pattern");
        Ok(id)
    }

    /// Remove a persisted record. Missing records are tolerated.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an out-of-range device or slot.
    pub fn erase_saved(&self, kind: RecordKind, device: u8, slot: u8) -> Result<()> {
        check_device(device as usize)?;
        check_slot(slot)?;
        let key = SlotKey::new(kind, device, slot);
        if let Err(err) = self.store.delete(key) {
            warn!(%key, error = %err, "failed to delete ff record");
        }
        Ok(())
    }
}
