//! The combo detector: pattern registry plus per-device sequence state.

use std::sync::Arc;

use openpad_device_types::{MAX_DEVICES, PadButton};
use openpad_errors::{PadError, Result};
use openpad_store::{RecordKind, SlotKey, SlotStore};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::pattern::{ComboId, ComboPattern};
use crate::{DEFAULT_TIMEOUT_MS, MAX_PATTERNS, MAX_TOKENS, wire};

/// Persistence slots per device for saved patterns.
pub const SAVE_SLOTS: usize = 16;

/// Per-device detection statistics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComboStats {
    /// Most recently detected combo on this device.
    pub last_detected: Option<ComboId>,
    /// Detections on this device since construction or reset.
    pub detections: u32,
}

#[derive(Debug, Default)]
struct DeviceState {
    buffer: Vec<PadButton>,
    idle_ms: u32,
    last_detected: Option<ComboId>,
    detections: u32,
}

impl DeviceState {
    fn clear_sequence(&mut self) {
        self.buffer.clear();
        self.idle_ms = 0;
    }
}

struct Entry {
    id: ComboId,
    pattern: ComboPattern,
}

struct DetectorState {
    patterns: Vec<Entry>,
    next_id: ComboId,
    devices: [DeviceState; MAX_DEVICES],
    enabled: bool,
}

impl DetectorState {
    /// Largest timeout among enabled patterns; the registration default when
    /// none is enabled.
    fn max_enabled_timeout(&self) -> u32 {
        self.patterns
            .iter()
            .filter(|e| e.pattern.is_enabled())
            .map(|e| e.pattern.timeout_ms())
            .max()
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    fn find(&self, id: ComboId) -> Option<usize> {
        self.patterns.iter().position(|e| e.id == id)
    }
}

/// Recognizes registered button sequences on up to [`MAX_DEVICES`] gamepads.
///
/// All operations take `&self`; the table and per-device state live behind a
/// single mutex held only for the duration of one call. Persistence goes
/// through the injected [`SlotStore`] and is fire-and-forget: a failing store
/// is logged, never surfaced.
pub struct ComboDetector {
    inner: Mutex<DetectorState>,
    store: Arc<dyn SlotStore>,
}

impl std::fmt::Debug for ComboDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ComboDetector")
            .field("patterns", &inner.patterns.len())
            .field("enabled", &inner.enabled)
            .finish()
    }
}

fn check_device(device: usize) -> Result<()> {
    if device >= MAX_DEVICES {
        return Err(PadError::out_of_range("device", device, 0, MAX_DEVICES - 1));
    }
    Ok(())
}

impl ComboDetector {
    /// Create an empty detector with detection enabled.
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            inner: Mutex::new(DetectorState {
                patterns: Vec::new(),
                next_id: 1,
                devices: Default::default(),
                enabled: true,
            }),
            store,
        }
    }

    /// Master switch for detection. Input processed while disabled is
    /// silently discarded.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.lock().enabled = enabled;
        info!(enabled, "combo detection toggled");
    }

    /// Whether detection is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Register a pattern, assigning its id.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` once [`MAX_PATTERNS`] patterns are registered; the
    /// call is then a no-op.
    pub fn register_pattern(&self, pattern: ComboPattern) -> Result<ComboId> {
        let mut inner = self.inner.lock();
        if inner.patterns.len() >= MAX_PATTERNS {
            return Err(PadError::capacity("combo pattern", MAX_PATTERNS));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        info!(combo_id = id, name = %pattern.name(), tokens = pattern.tokens().len(), "registered combo pattern");
        inner.patterns.push(Entry { id, pattern });
        Ok(id)
    }

    /// Remove a pattern. Remaining patterns keep their registration order.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn unregister_pattern(&self, id: ComboId) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .find(id)
            .ok_or(PadError::not_found("combo pattern", id))?;
        inner.patterns.remove(index);
        info!(combo_id = id, "unregistered combo pattern");
        Ok(())
    }

    /// Snapshot a registered pattern.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn pattern(&self, id: ComboId) -> Result<ComboPattern> {
        let inner = self.inner.lock();
        inner
            .find(id)
            .and_then(|i| inner.patterns.get(i))
            .map(|e| e.pattern.clone())
            .ok_or(PadError::not_found("combo pattern", id))
    }

    /// Snapshot every registered pattern in registration order.
    pub fn patterns(&self) -> Vec<(ComboId, ComboPattern)> {
        self.inner
            .lock()
            .patterns
            .iter()
            .map(|e| (e.id, e.pattern.clone()))
            .collect()
    }

    /// Look up a pattern id by name.
    ///
    /// # Errors
    ///
    /// `NameNotFound` when no pattern carries the name.
    pub fn find_by_name(&self, name: &str) -> Result<ComboId> {
        self.inner
            .lock()
            .patterns
            .iter()
            .find(|e| e.pattern.name() == name)
            .map(|e| e.id)
            .ok_or_else(|| PadError::name_not_found("combo pattern", name))
    }

    /// Enable or disable one pattern.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn set_pattern_enabled(&self, id: ComboId, enabled: bool) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner
            .find(id)
            .ok_or(PadError::not_found("combo pattern", id))?;
        if let Some(entry) = inner.patterns.get_mut(index) {
            entry.pattern.set_enabled(enabled);
            debug!(combo_id = id, enabled, "combo pattern toggled");
        }
        Ok(())
    }

    /// Disable every registered pattern.
    pub fn disable_all(&self) {
        let mut inner = self.inner.lock();
        for entry in &mut inner.patterns {
            entry.pattern.set_enabled(false);
        }
        info!("disabled all combo patterns");
    }

    /// Feed one button transition into the detector.
    ///
    /// Releases and input while the detector is disabled are tolerated
    /// no-ops (`Ok(None)`). A press appends to the device's bounded buffer
    /// (presses on a full buffer are dropped) and resets its idle timer,
    /// then the buffer is matched against every enabled pattern in
    /// registration order. The first full match wins: its id is returned,
    /// the buffer clears, and later patterns are not consulted.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a device index outside `0..MAX_DEVICES`.
    pub fn process_button_input(
        &self,
        device: usize,
        button: PadButton,
        pressed: bool,
    ) -> Result<Option<ComboId>> {
        check_device(device)?;
        let mut inner = self.inner.lock();
        if !inner.enabled || !pressed {
            return Ok(None);
        }

        if let Some(state) = inner.devices.get_mut(device) {
            if state.buffer.len() < MAX_TOKENS {
                state.buffer.push(button);
                state.idle_ms = 0;
            }
            debug!(
                device,
                button = button.name(),
                sequence_len = state.buffer.len(),
                "combo input"
            );
        }

        let buffer_len = inner
            .devices
            .get(device)
            .map(|s| s.buffer.len())
            .unwrap_or(0);

        let mut detected = None;
        for entry in &inner.patterns {
            if !entry.pattern.is_enabled() {
                continue;
            }
            let tokens = entry.pattern.tokens();
            if tokens.len() != buffer_len {
                continue;
            }
            let matches = inner
                .devices
                .get(device)
                .map(|s| {
                    tokens
                        .iter()
                        .zip(s.buffer.iter())
                        .all(|(token, pressed)| token.matches(*pressed))
                })
                .unwrap_or(false);
            if matches {
                detected = Some((entry.id, entry.pattern.name().to_string()));
                break;
            }
        }

        if let Some((id, name)) = detected {
            if let Some(state) = inner.devices.get_mut(device) {
                state.last_detected = Some(id);
                state.detections = state.detections.saturating_add(1);
                state.clear_sequence();
            }
            info!(device, combo_id = id, name = %name, "combo detected");
            return Ok(Some(id));
        }

        Ok(None)
    }

    /// Advance idle timers; buffers whose idle time exceeds the maximum
    /// timeout among enabled patterns clear even without new input.
    pub fn update(&self, delta_ms: u32) {
        let mut inner = self.inner.lock();
        let max_timeout = inner.max_enabled_timeout();
        for (device, state) in inner.devices.iter_mut().enumerate() {
            if state.buffer.is_empty() {
                continue;
            }
            state.idle_ms = state.idle_ms.saturating_add(delta_ms);
            if state.idle_ms > max_timeout {
                debug!(device, idle_ms = state.idle_ms, "combo sequence timed out");
                state.clear_sequence();
            }
        }
    }

    /// Clear the pending sequence of one device, or of all devices.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a device index outside `0..MAX_DEVICES`.
    pub fn reset(&self, device: Option<usize>) -> Result<()> {
        let mut inner = self.inner.lock();
        match device {
            Some(device) => {
                check_device(device)?;
                if let Some(state) = inner.devices.get_mut(device) {
                    state.clear_sequence();
                }
                debug!(device, "combo state reset");
            }
            None => {
                for state in &mut inner.devices {
                    state.clear_sequence();
                }
                debug!("combo state reset for all devices");
            }
        }
        Ok(())
    }

    /// Buttons buffered so far on a device.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn sequence(&self, device: usize) -> Result<Vec<PadButton>> {
        check_device(device)?;
        Ok(self
            .inner
            .lock()
            .devices
            .get(device)
            .map(|s| s.buffer.clone())
            .unwrap_or_default())
    }

    /// Milliseconds before the pending sequence times out; 0 when nothing is
    /// buffered.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn time_remaining(&self, device: usize) -> Result<u32> {
        check_device(device)?;
        let inner = self.inner.lock();
        let max_timeout = inner.max_enabled_timeout();
        Ok(inner
            .devices
            .get(device)
            .filter(|s| !s.buffer.is_empty())
            .map(|s| max_timeout.saturating_sub(s.idle_ms))
            .unwrap_or(0))
    }

    /// Most recent detection on a device.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn last_detected(&self, device: usize) -> Result<Option<ComboId>> {
        check_device(device)?;
        Ok(self
            .inner
            .lock()
            .devices
            .get(device)
            .and_then(|s| s.last_detected))
    }

    /// Whether the given combo was the latest detection on any device.
    pub fn was_detected(&self, id: ComboId) -> bool {
        self.inner
            .lock()
            .devices
            .iter()
            .any(|s| s.last_detected == Some(id))
    }

    /// Detection statistics for a device.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn stats(&self, device: usize) -> Result<ComboStats> {
        check_device(device)?;
        Ok(self
            .inner
            .lock()
            .devices
            .get(device)
            .map(|s| ComboStats {
                last_detected: s.last_detected,
                detections: s.detections,
            })
            .unwrap_or_default())
    }

    /// Persist a registered pattern into `(device, slot)`.
    ///
    /// The store call itself is fire-and-forget: backend failures are logged
    /// and the operation still succeeds.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown pattern id, `InvalidArgument` for an
    /// out-of-range device or slot.
    pub fn save_pattern(&self, id: ComboId, device: u8, slot: u8) -> Result<()> {
        check_device(device as usize)?;
        if slot as usize >= SAVE_SLOTS {
            return Err(PadError::out_of_range("slot", slot as usize, 0, SAVE_SLOTS - 1));
        }
        let pattern = self.pattern(id)?;
        let blob = wire::encode_pattern(&pattern);
        let key = SlotKey::new(RecordKind::ComboPattern, device, slot);
        if let Err(err) = self.store.save(key, &blob) {
            warn!(%key, error = %err, "failed to persist combo pattern");
        }
        Ok(())
    }

    /// Load a persisted pattern from `(device, slot)` and register it.
    ///
    /// # Errors
    ///
    /// `NotFound` when the slot is empty, `InvalidArgument` when the record
    /// does not decode, `CapacityExceeded` when the pattern table is full.
    pub fn load_pattern(&self, device: u8, slot: u8) -> Result<ComboId> {
        check_device(device as usize)?;
        if slot as usize >= SAVE_SLOTS {
            return Err(PadError::out_of_range("slot", slot as usize, 0, SAVE_SLOTS - 1));
        }
        let key = SlotKey::new(RecordKind::ComboPattern, device, slot);
        let blob = self
            .store
            .load(key)
            .map_err(|_| PadError::not_found("saved combo pattern", slot as u32))?;
        let pattern = wire::decode_pattern(&blob)
            .map_err(|err| PadError::invalid("combo pattern record", err.to_string(), "decodable record"))?;
        self.register_pattern(pattern)
    }

    /// Remove a persisted pattern record. Missing records are tolerated.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an out-of-range device or slot.
    pub fn erase_saved_pattern(&self, device: u8, slot: u8) -> Result<()> {
        check_device(device as usize)?;
        if slot as usize >= SAVE_SLOTS {
            return Err(PadError::out_of_range("slot", slot as usize, 0, SAVE_SLOTS - 1));
        }
        let key = SlotKey::new(RecordKind::ComboPattern, device, slot);
        if let Err(err) = self.store.delete(key) {
            warn!(%key, error = %err, "failed to delete combo pattern record");
        }
        Ok(())
    }
}
