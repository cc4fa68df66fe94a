//! The macro system: per-device recorders, the macro table, and the
//! playback slot pool.

use std::sync::Arc;

use openpad_device_types::{MAX_DEVICES, OutputEvent, OutputSink};
use openpad_errors::{PadError, Result};
use openpad_store::{RecordKind, SlotKey, SlotStore};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::definition::{Macro, MacroId};
use crate::event::MacroEvent;
use crate::wire;
use crate::{MAX_EVENTS, MAX_MACROS, MAX_SPEED, MIN_SPEED, PLAYBACK_SLOTS, SAVE_SLOTS};

/// Snapshot of an active recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingStats {
    /// Events captured so far.
    pub events: usize,
    /// Sum of captured event offsets.
    pub elapsed_ms: u32,
}

/// Snapshot of one playback slot's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackProgress {
    /// Index of the next event to fire.
    pub position: usize,
    /// Total events in the macro.
    pub total_events: usize,
    /// Scaled milliseconds accumulated since the last fired event.
    pub elapsed_ms: f32,
}

struct RecordingSession {
    name: String,
    events: Vec<MacroEvent>,
}

struct PlaybackState {
    macro_id: MacroId,
    device: usize,
    position: usize,
    elapsed_ms: f32,
    looping: bool,
    speed: f32,
    paused: bool,
}

struct StoredMacro {
    def: Macro,
    saved: Option<SlotKey>,
}

struct SystemState {
    macros: Vec<StoredMacro>,
    next_id: MacroId,
    recorders: [Option<RecordingSession>; MAX_DEVICES],
    players: Vec<Option<PlaybackState>>,
    enabled: bool,
}

impl SystemState {
    fn find(&self, id: MacroId) -> Option<usize> {
        self.macros.iter().position(|m| m.def.id() == id)
    }

    fn player_index(&self, id: MacroId) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.as_ref().is_some_and(|p| p.macro_id == id))
    }

    fn free_save_slot(&self, device: u8) -> Option<u8> {
        (0..SAVE_SLOTS as u8).find(|slot| {
            let key = SlotKey::new(RecordKind::Macro, device, *slot);
            !self.macros.iter().any(|m| m.saved == Some(key))
        })
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

/// Records and replays input macros.
///
/// Commands may arrive from any call site within a frame; the table and all
/// per-device/per-slot state sit behind one mutex held for the duration of a
/// single operation. Output dispatch and persistence happen after the lock is
/// released, so no lock is ever held across a call into a collaborator.
pub struct MacroSystem {
    inner: Mutex<SystemState>,
    sink: Arc<dyn OutputSink>,
    store: Arc<dyn SlotStore>,
}

impl std::fmt::Debug for MacroSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MacroSystem")
            .field("macros", &inner.macros.len())
            .field("enabled", &inner.enabled)
            .finish()
    }
}

impl MacroSystem {
    /// Create an empty system dispatching through `sink` and persisting
    /// through `store`.
    pub fn new(sink: Arc<dyn OutputSink>, store: Arc<dyn SlotStore>) -> Self {
        Self {
            inner: Mutex::new(SystemState {
                macros: Vec::new(),
                next_id: 1,
                recorders: Default::default(),
                players: (0..PLAYBACK_SLOTS).map(|_| None).collect(),
                enabled: true,
            }),
            sink,
            store,
        }
    }

    /// Master switch; while disabled, `update` advances nothing.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.lock().enabled = enabled;
        info!(enabled, "macro system toggled");
    }

    /// Whether the system is enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Begin recording on a device.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device or empty name,
    /// `AlreadyInProgress` when the device is already recording.
    pub fn start_recording(&self, device: usize, name: &str) -> Result<()> {
        check_device(device)?;
        if name.is_empty() {
            return Err(PadError::invalid("name", name, "non-empty"));
        }
        let mut inner = self.inner.lock();
        let slot = inner
            .recorders
            .get_mut(device)
            .ok_or(PadError::out_of_range("device", device, 0, MAX_DEVICES - 1))?;
        if slot.is_some() {
            return Err(PadError::in_progress("recording", device));
        }
        *slot = Some(RecordingSession {
            name: name.to_string(),
            events: Vec::new(),
        });
        info!(device, name, "started macro recording");
        Ok(())
    }

    /// Append an event to the active recording.
    ///
    /// # Errors
    ///
    /// `NotFound` when the device is not recording, `CapacityExceeded` once
    /// the event table is full.
    pub fn add_event(&self, device: usize, event: MacroEvent) -> Result<()> {
        check_device(device)?;
        let mut inner = self.inner.lock();
        let session = inner
            .recorders
            .get_mut(device)
            .and_then(|s| s.as_mut())
            .ok_or(PadError::not_found("recording session", device as u32))?;
        if session.events.len() >= MAX_EVENTS {
            return Err(PadError::capacity("macro event", MAX_EVENTS));
        }
        session.events.push(event);
        Ok(())
    }

    /// Finish recording: compute the duration as the sum of event offsets,
    /// store the macro, and fire-and-forget a persistence save into the
    /// device's first free slot.
    ///
    /// # Errors
    ///
    /// `NotFound` when the device is not recording. `CapacityExceeded` when
    /// the macro table is full — the session then stays active so the caller
    /// may free a macro and stop again.
    pub fn stop_recording(&self, device: usize) -> Result<MacroId> {
        check_device(device)?;
        let (id, pending_save) = {
            let mut inner = self.inner.lock();
            let session_ref = inner
                .recorders
                .get(device)
                .and_then(|s| s.as_ref())
                .ok_or(PadError::not_found("recording session", device as u32))?;
            if session_ref.events.is_empty() {
                warn!(device, name = %session_ref.name, "recorded macro has no events");
            }
            if inner.macros.len() >= MAX_MACROS {
                // Session intentionally survives: the caller may delete a
                // macro and retry the stop.
                return Err(PadError::capacity("macro", MAX_MACROS));
            }
            let session = inner
                .recorders
                .get_mut(device)
                .and_then(|s| s.take())
                .ok_or(PadError::not_found("recording session", device as u32))?;

            let id = inner.next_id;
            inner.next_id += 1;
            let duration = session
                .events
                .iter()
                .fold(0u32, |acc, e| acc.saturating_add(e.offset_ms));
            let def = Macro::new(id, session.name, session.events, duration, true);
            info!(
                device,
                macro_id = id,
                name = %def.name(),
                events = def.events().len(),
                duration_ms = duration,
                "stopped macro recording"
            );

            let saved = inner.free_save_slot(device as u8).map(|slot| {
                SlotKey::new(RecordKind::Macro, device as u8, slot)
            });
            if saved.is_none() {
                warn!(device, macro_id = id, "no free save slot, macro kept in memory only");
            }
            let blob = saved.map(|key| (key, wire::encode_macro(&def)));
            inner.macros.push(StoredMacro { def, saved });
            (id, blob)
        };

        if let Some((key, blob)) = pending_save {
            if let Err(err) = self.store.save(key, &blob) {
                warn!(%key, error = %err, "failed to persist macro");
            }
        }
        Ok(id)
    }

    /// Discard the active recording. Synchronous: nothing from the session
    /// is ever dispatched afterwards.
    ///
    /// # Errors
    ///
    /// `NotFound` when the device is not recording.
    pub fn cancel_recording(&self, device: usize) -> Result<()> {
        check_device(device)?;
        let mut inner = self.inner.lock();
        let slot = inner
            .recorders
            .get_mut(device)
            .ok_or(PadError::out_of_range("device", device, 0, MAX_DEVICES - 1))?;
        if slot.take().is_none() {
            return Err(PadError::not_found("recording session", device as u32));
        }
        info!(device, "cancelled macro recording");
        Ok(())
    }

    /// Whether a device is recording.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn is_recording(&self, device: usize) -> Result<bool> {
        check_device(device)?;
        Ok(self
            .inner
            .lock()
            .recorders
            .get(device)
            .is_some_and(|s| s.is_some()))
    }

    /// Progress of the active recording.
    ///
    /// # Errors
    ///
    /// `NotFound` when the device is not recording.
    pub fn recording_stats(&self, device: usize) -> Result<RecordingStats> {
        check_device(device)?;
        let inner = self.inner.lock();
        let session = inner
            .recorders
            .get(device)
            .and_then(|s| s.as_ref())
            .ok_or(PadError::not_found("recording session", device as u32))?;
        Ok(RecordingStats {
            events: session.events.len(),
            elapsed_ms: session
                .events
                .iter()
                .fold(0u32, |acc, e| acc.saturating_add(e.offset_ms)),
        })
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    /// Start playing a macro on a device.
    ///
    /// Out-of-range or non-finite speeds fall back to 1.0 (start is
    /// tolerant; [`MacroSystem::set_playback_speed`] is strict).
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown macro, `InvalidArgument` for a bad device
    /// or a disabled macro, `CapacityExceeded` when no playback slot is
    /// free.
    pub fn start_playback(
        &self,
        macro_id: MacroId,
        device: usize,
        looping: bool,
        speed: f32,
    ) -> Result<()> {
        check_device(device)?;
        let speed = if speed.is_finite() && (MIN_SPEED..=MAX_SPEED).contains(&speed) {
            speed
        } else {
            warn!(macro_id, speed, "playback speed out of range, using 1.0");
            1.0
        };

        let mut inner = self.inner.lock();
        let index = inner
            .find(macro_id)
            .ok_or(PadError::not_found("macro", macro_id))?;
        let enabled = inner
            .macros
            .get(index)
            .map(|m| m.def.is_enabled())
            .unwrap_or(false);
        if !enabled {
            return Err(PadError::invalid("macro", macro_id, "enabled"));
        }
        let slot = inner
            .players
            .iter()
            .position(|p| p.is_none())
            .ok_or(PadError::capacity("playback slot", PLAYBACK_SLOTS))?;
        if let Some(entry) = inner.players.get_mut(slot) {
            *entry = Some(PlaybackState {
                macro_id,
                device,
                position: 0,
                elapsed_ms: 0.0,
                looping,
                speed,
                paused: false,
            });
        }
        info!(macro_id, device, looping, speed, "started macro playback");
        Ok(())
    }

    /// Stop playback of a macro. Synchronous: once this returns no further
    /// events from that playback are dispatched.
    ///
    /// # Errors
    ///
    /// `NotFound` when the macro is not playing.
    pub fn stop_playback(&self, macro_id: MacroId) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .player_index(macro_id)
            .ok_or(PadError::not_found("active playback", macro_id))?;
        if let Some(slot) = inner.players.get_mut(index) {
            *slot = None;
        }
        info!(macro_id, "stopped macro playback");
        Ok(())
    }

    /// Stop every active playback.
    pub fn stop_all(&self) {
        let mut inner = self.inner.lock();
        for slot in &mut inner.players {
            *slot = None;
        }
        info!("stopped all macro playback");
    }

    /// Whether a macro is currently playing (paused counts as playing).
    pub fn is_playing(&self, macro_id: MacroId) -> bool {
        self.inner.lock().player_index(macro_id).is_some()
    }

    /// Freeze time advancement for a playback without losing position.
    ///
    /// # Errors
    ///
    /// `NotFound` when the macro is not playing.
    pub fn pause_playback(&self, macro_id: MacroId) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .player_index(macro_id)
            .ok_or(PadError::not_found("active playback", macro_id))?;
        if let Some(state) = inner.players.get_mut(index).and_then(|p| p.as_mut()) {
            state.paused = true;
        }
        debug!(macro_id, "paused macro playback");
        Ok(())
    }

    /// Resume a paused playback.
    ///
    /// # Errors
    ///
    /// `NotFound` when the macro has no paused playback.
    pub fn resume_playback(&self, macro_id: MacroId) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .players
            .iter()
            .position(|p| p.as_ref().is_some_and(|p| p.macro_id == macro_id && p.paused))
            .ok_or(PadError::not_found("paused playback", macro_id))?;
        if let Some(state) = inner.players.get_mut(index).and_then(|p| p.as_mut()) {
            state.paused = false;
        }
        debug!(macro_id, "resumed macro playback");
        Ok(())
    }

    /// Change the speed of a running playback. Takes effect from the next
    /// `update` call; already-accumulated elapsed time is not rescaled.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` outside `[0.25, 4.0]`, `NotFound` when the macro is
    /// not playing.
    pub fn set_playback_speed(&self, macro_id: MacroId, speed: f32) -> Result<()> {
        if !speed.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(PadError::out_of_range("speed", speed, MIN_SPEED, MAX_SPEED));
        }
        let mut inner = self.inner.lock();
        let index = inner
            .player_index(macro_id)
            .ok_or(PadError::not_found("active playback", macro_id))?;
        if let Some(state) = inner.players.get_mut(index).and_then(|p| p.as_mut()) {
            state.speed = speed;
        }
        debug!(macro_id, speed, "changed playback speed");
        Ok(())
    }

    /// Position of a running playback.
    ///
    /// # Errors
    ///
    /// `NotFound` when the macro is not playing.
    pub fn playback_progress(&self, macro_id: MacroId) -> Result<PlaybackProgress> {
        let inner = self.inner.lock();
        let state = inner
            .players
            .iter()
            .find_map(|p| p.as_ref().filter(|p| p.macro_id == macro_id))
            .ok_or(PadError::not_found("active playback", macro_id))?;
        let total_events = inner
            .find(macro_id)
            .and_then(|i| inner.macros.get(i))
            .map(|m| m.def.events().len())
            .unwrap_or(0);
        Ok(PlaybackProgress {
            position: state.position,
            total_events,
            elapsed_ms: state.elapsed_ms,
        })
    }

    /// Advance every active playback by `delta_ms` of wall time. Events
    /// whose cumulative offsets fall inside the scaled window dispatch in
    /// order; finished non-looping playbacks free their slot, looping ones
    /// restart from position zero.
    pub fn update(&self, delta_ms: u32) {
        let mut dispatches: Vec<(usize, OutputEvent)> = Vec::new();
        {
            let mut inner = self.inner.lock();
            if !inner.enabled {
                return;
            }
            let state = &mut *inner;
            for slot in &mut state.players {
                let finished = match slot.as_mut() {
                    None => false,
                    Some(playback) if playback.paused => false,
                    Some(playback) => {
                        match state
                            .macros
                            .iter()
                            .find(|m| m.def.id() == playback.macro_id)
                        {
                            // Macro deleted while playing: free the slot.
                            None => true,
                            Some(stored) => {
                                playback.elapsed_ms += delta_ms as f32 * playback.speed;
                                let events = stored.def.events();
                                while let Some(event) = events.get(playback.position) {
                                    if event.offset_ms as f32 <= playback.elapsed_ms {
                                        playback.elapsed_ms -= event.offset_ms as f32;
                                        playback.position += 1;
                                        if let Some(out) = event.kind.to_output() {
                                            dispatches.push((playback.device, out));
                                        }
                                    } else {
                                        break;
                                    }
                                }
                                if playback.position >= events.len() {
                                    if playback.looping {
                                        playback.position = 0;
                                        playback.elapsed_ms = 0.0;
                                        false
                                    } else {
                                        true
                                    }
                                } else {
                                    false
                                }
                            }
                        }
                    }
                };
                if finished {
                    *slot = None;
                }
            }
        }

        for (device, event) in dispatches {
            self.sink.dispatch(device, event);
        }
    }

    // ------------------------------------------------------------------
    // Management & editing
    // ------------------------------------------------------------------

    /// Snapshot a stored macro.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn get(&self, id: MacroId) -> Result<Macro> {
        let inner = self.inner.lock();
        inner
            .find(id)
            .and_then(|i| inner.macros.get(i))
            .map(|m| m.def.clone())
            .ok_or(PadError::not_found("macro", id))
    }

    /// Snapshot every stored macro.
    pub fn list(&self) -> Vec<Macro> {
        self.inner
            .lock()
            .macros
            .iter()
            .map(|m| m.def.clone())
            .collect()
    }

    /// Number of stored macros.
    pub fn count(&self) -> usize {
        self.inner.lock().macros.len()
    }

    /// Look up a macro id by name.
    ///
    /// # Errors
    ///
    /// `NameNotFound` when no macro carries the name.
    pub fn find_by_name(&self, name: &str) -> Result<MacroId> {
        self.inner
            .lock()
            .macros
            .iter()
            .find(|m| m.def.name() == name)
            .map(|m| m.def.id())
            .ok_or_else(|| PadError::name_not_found("macro", name))
    }

    /// Allow or refuse playback of a macro without touching running slots.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn set_macro_enabled(&self, id: MacroId, enabled: bool) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner.find(id).ok_or(PadError::not_found("macro", id))?;
        if let Some(stored) = inner.macros.get_mut(index) {
            stored.def.set_enabled(enabled);
        }
        debug!(macro_id = id, enabled, "macro toggled");
        Ok(())
    }

    /// Rename a macro.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `InvalidArgument` for an empty name.
    pub fn rename(&self, id: MacroId, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(PadError::invalid("name", name, "non-empty"));
        }
        let mut inner = self.inner.lock();
        let index = inner.find(id).ok_or(PadError::not_found("macro", id))?;
        if let Some(stored) = inner.macros.get_mut(index) {
            stored.def.set_name(name.to_string());
        }
        Ok(())
    }

    /// Drop every event from a macro and zero its duration.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn clear_events(&self, id: MacroId) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner.find(id).ok_or(PadError::not_found("macro", id))?;
        if let Some(stored) = inner.macros.get_mut(index) {
            stored.def.events_mut().clear();
            stored.def.set_duration(0);
        }
        Ok(())
    }

    /// Remove a macro from the table and delete its persisted record.
    /// Slots still playing it free themselves on the next `update`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn delete(&self, id: MacroId) -> Result<()> {
        let saved = {
            let mut inner = self.inner.lock();
            let index = inner.find(id).ok_or(PadError::not_found("macro", id))?;
            let stored = inner.macros.remove(index);
            info!(macro_id = id, name = %stored.def.name(), "deleted macro");
            stored.saved
        };
        if let Some(key) = saved {
            if let Err(err) = self.store.delete(key) {
                warn!(%key, error = %err, "failed to delete macro record");
            }
        }
        Ok(())
    }

    /// Deep-copy a macro under a new name and id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown source, `InvalidArgument` for an empty
    /// name, `CapacityExceeded` when the table is full.
    pub fn duplicate(&self, id: MacroId, new_name: &str) -> Result<MacroId> {
        if new_name.is_empty() {
            return Err(PadError::invalid("name", new_name, "non-empty"));
        }
        let mut inner = self.inner.lock();
        if inner.macros.len() >= MAX_MACROS {
            return Err(PadError::capacity("macro", MAX_MACROS));
        }
        let index = inner.find(id).ok_or(PadError::not_found("macro", id))?;
        let new_id = inner.next_id;
        let copy = inner
            .macros
            .get(index)
            .map(|m| m.def.with_id(new_id, new_name.to_string()))
            .ok_or(PadError::not_found("macro", id))?;
        inner.next_id += 1;
        inner.macros.push(StoredMacro {
            def: copy,
            saved: None,
        });
        info!(source = id, macro_id = new_id, name = new_name, "duplicated macro");
        Ok(new_id)
    }

    /// Append macro `b`'s events to macro `a`. `b`'s first event offset is
    /// increased by `a`'s total duration so the merged timeline plays `a`
    /// then `b`; durations concatenate. `b` itself is untouched.
    ///
    /// # Errors
    ///
    /// `NotFound` when either id is unknown, `CapacityExceeded` when the
    /// merged event count would exceed the per-macro limit.
    pub fn merge(&self, a: MacroId, b: MacroId) -> Result<()> {
        let mut inner = self.inner.lock();
        let a_index = inner.find(a).ok_or(PadError::not_found("macro", a))?;
        let b_index = inner.find(b).ok_or(PadError::not_found("macro", b))?;

        let (mut appended, b_duration) = inner
            .macros
            .get(b_index)
            .map(|m| (m.def.events().to_vec(), m.def.total_duration_ms()))
            .ok_or(PadError::not_found("macro", b))?;

        let target = inner
            .macros
            .get_mut(a_index)
            .ok_or(PadError::not_found("macro", a))?;
        let combined = target.def.events().len() + appended.len();
        if combined > MAX_EVENTS {
            return Err(PadError::capacity("macro event", MAX_EVENTS));
        }
        let a_duration = target.def.total_duration_ms();
        if let Some(first) = appended.first_mut() {
            first.offset_ms = first.offset_ms.saturating_add(a_duration);
        }
        target.def.events_mut().extend(appended);
        target
            .def
            .set_duration(a_duration.saturating_add(b_duration));
        info!(into = a, from = b, "merged macros");
        Ok(())
    }

    /// Soft consistency check: `true` when the stored duration equals the
    /// sum of event offsets. A mismatch is logged and reported, never
    /// rejected.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn validate(&self, id: MacroId) -> Result<bool> {
        let inner = self.inner.lock();
        let stored = inner
            .find(id)
            .and_then(|i| inner.macros.get(i))
            .ok_or(PadError::not_found("macro", id))?;
        let sum = stored.def.offset_sum();
        let recorded = stored.def.total_duration_ms();
        if sum != recorded {
            warn!(
                macro_id = id,
                recorded_ms = recorded,
                offset_sum_ms = sum,
                "macro duration differs from offset sum"
            );
            return Ok(false);
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist a macro into `(device, slot)`. Fire-and-forget: store
    /// failures are logged, not surfaced.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown macro, `InvalidArgument` for an
    /// out-of-range device or slot.
    pub fn save(&self, id: MacroId, device: u8, slot: u8) -> Result<()> {
        check_device(device as usize)?;
        check_slot(slot)?;
        let key = SlotKey::new(RecordKind::Macro, device, slot);
        let blob = {
            let mut inner = self.inner.lock();
            let index = inner.find(id).ok_or(PadError::not_found("macro", id))?;
            let stored = inner
                .macros
                .get_mut(index)
                .ok_or(PadError::not_found("macro", id))?;
            stored.saved = Some(key);
            wire::encode_macro(&stored.def)
        };
        if let Err(err) = self.store.save(key, &blob) {
            warn!(%key, error = %err, "failed to persist macro");
        }
        Ok(())
    }

    /// Load a persisted macro from `(device, slot)` and store it under a
    /// fresh id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the slot is empty, `InvalidArgument` when the record
    /// does not decode, `CapacityExceeded` when the table is full.
    pub fn load(&self, device: u8, slot: u8) -> Result<MacroId> {
        check_device(device as usize)?;
        check_slot(slot)?;
        let key = SlotKey::new(RecordKind::Macro, device, slot);
        let blob = self
            .store
            .load(key)
            .map_err(|_| PadError::not_found("saved macro", slot as u32))?;
        let record = wire::decode_macro(&blob)
            .map_err(|err| PadError::invalid("macro record", err.to_string(), "decodable record"))?;

        let mut inner = self.inner.lock();
        if inner.macros.len() >= MAX_MACROS {
            return Err(PadError::capacity("macro", MAX_MACROS));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        let def = Macro::new(
            id,
            record.name,
            record.events,
            record.total_duration_ms,
            record.enabled,
        );
        info!(macro_id = id, %key, events = def.events().len(), "loaded macro");
        inner.macros.push(StoredMacro {
            def,
            saved: Some(key),
        });
        Ok(id)
    }

    /// Delete the persisted record in `(device, slot)` without touching the
    /// in-memory table. Missing records are tolerated.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an out-of-range device or slot.
    pub fn erase_saved(&self, device: u8, slot: u8) -> Result<()> {
        check_device(device as usize)?;
        check_slot(slot)?;
        let key = SlotKey::new(RecordKind::Macro, device, slot);
        if let Err(err) = self.store.delete(key) {
            warn!(%key, error = %err, "failed to delete macro record");
        }
        Ok(())
    }

    /// Summaries of every persisted macro for a device: `(slot, name,
    /// event count)`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn saved_macros(&self, device: u8) -> Result<Vec<(u8, String, usize)>> {
        check_device(device as usize)?;
        let mut found = Vec::new();
        for key in self.store.enumerate() {
            if key.kind != RecordKind::Macro || key.device != device {
                continue;
            }
            match self.store.load(key).map(|blob| wire::decode_macro(&blob)) {
                Ok(Ok(record)) => found.push((key.slot, record.name, record.events.len())),
                Ok(Err(err)) => warn!(%key, error = %err, "undecodable macro record"),
                Err(err) => warn!(%key, error = %err, "unreadable macro record"),
            }
        }
        found.sort_by_key(|(slot, _, _)| *slot);
        Ok(found)
    }
}
