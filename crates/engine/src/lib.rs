//! The composed OpenPad engine
//!
//! Owns one [`ComboDetector`], one [`MacroSystem`], and one [`FfEngine`],
//! all sharing an output sink and a persistence store, and wires combo
//! detections to macro playback or force-feedback triggers through explicit
//! bindings.
//!
//! The engine is an owned instance: construct it, hand out a shared handle,
//! and drive it with one [`PadEngine::update`] per frame from the game loop.
//! Command operations (input processing, triggers, editing) may be called
//! from any site within the frame; each subsystem serializes its own state
//! internally and no lock is ever held across a subsystem boundary.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use openpad_device_types::{NullSink, PadButton};
//! use openpad_engine::{ComboAction, PadEngine};
//! use openpad_combo::presets;
//! use openpad_store::MemoryStore;
//!
//! let engine = PadEngine::new(Arc::new(NullSink), Arc::new(MemoryStore::new()));
//! let combo = engine.combos().register_pattern(presets::hadoken())?;
//!
//! // route the fireball gesture to a haptic pattern
//! let pattern = engine.ffb().create_weapon_pattern(openpad_ffb::WeaponKind::Explosion)?;
//! engine.bind_combo(combo, ComboAction::TriggerPattern {
//!     pattern_id: pattern,
//!     looping: false,
//!     intensity: 1.0,
//! })?;
//!
//! for button in [PadButton::Y, PadButton::X, PadButton::B, PadButton::A] {
//!     engine.process_button_input(0, button, true)?;
//! }
//! engine.update(16);
//! # Ok::<(), openpad_errors::PadError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use openpad_combo::{ComboDetector, ComboId};
use openpad_device_types::{OutputSink, PadButton};
use openpad_errors::{PadError, Result};
use openpad_ffb::{FfEngine, PatternId};
use openpad_macros::{MacroId, MacroSystem};
use openpad_store::SlotStore;

/// What a detected combo triggers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ComboAction {
    /// Start playback of a stored macro on the detecting device.
    PlayMacro {
        /// Macro to play.
        macro_id: MacroId,
        /// Loop until stopped.
        looping: bool,
        /// Playback speed multiplier.
        speed: f32,
    },
    /// Trigger a force-feedback pattern on the detecting device.
    TriggerPattern {
        /// Pattern to play.
        pattern_id: PatternId,
        /// Loop until stopped.
        looping: bool,
        /// Trigger intensity, `[0,1]`.
        intensity: f32,
    },
}

struct Binding {
    combo: ComboId,
    action: ComboAction,
}

/// The composed input macro, combo-detection, and force-feedback engine.
pub struct PadEngine {
    combos: ComboDetector,
    macros: MacroSystem,
    ffb: FfEngine,
    bindings: Mutex<Vec<Binding>>,
}

impl std::fmt::Debug for PadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PadEngine")
            .field("bindings", &self.bindings.lock().len())
            .finish_non_exhaustive()
    }
}

impl PadEngine {
    /// Build an engine whose subsystems share `sink` and `store`.
    pub fn new(sink: Arc<dyn OutputSink>, store: Arc<dyn SlotStore>) -> Self {
        Self {
            combos: ComboDetector::new(store.clone()),
            macros: MacroSystem::new(sink.clone(), store.clone()),
            ffb: FfEngine::new(sink, store),
            bindings: Mutex::new(Vec::new()),
        }
    }

    /// The combo detection subsystem.
    pub fn combos(&self) -> &ComboDetector {
        &self.combos
    }

    /// The macro recording/playback subsystem.
    pub fn macros(&self) -> &MacroSystem {
        &self.macros
    }

    /// The force feedback subsystem.
    pub fn ffb(&self) -> &FfEngine {
        &self.ffb
    }

    /// Route a combo detection to an action.
    ///
    /// # Errors
    ///
    /// `Conflict` when the combo is already bound; unbind first to rebind.
    pub fn bind_combo(&self, combo: ComboId, action: ComboAction) -> Result<()> {
        let mut bindings = self.bindings.lock();
        if bindings.iter().any(|b| b.combo == combo) {
            return Err(PadError::conflict(format!("combo {combo} is already bound")));
        }
        bindings.push(Binding { combo, action });
        info!(combo_id = combo, ?action, "bound combo");
        Ok(())
    }

    /// Remove a combo's binding.
    ///
    /// # Errors
    ///
    /// `NotFound` when the combo has no binding.
    pub fn unbind_combo(&self, combo: ComboId) -> Result<()> {
        let mut bindings = self.bindings.lock();
        let index = bindings
            .iter()
            .position(|b| b.combo == combo)
            .ok_or(PadError::not_found("combo binding", combo))?;
        bindings.remove(index);
        info!(combo_id = combo, "unbound combo");
        Ok(())
    }

    /// The action a combo is bound to, if any.
    pub fn binding(&self, combo: ComboId) -> Option<ComboAction> {
        self.bindings
            .lock()
            .iter()
            .find(|b| b.combo == combo)
            .map(|b| b.action)
    }

    /// Feed one button transition through combo detection and perform the
    /// bound action on detection. Returns the detected combo, if any.
    ///
    /// The binding lookup completes and releases its lock before any
    /// subsystem is called.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad device index.
    pub fn process_button_input(
        &self,
        device: usize,
        button: PadButton,
        pressed: bool,
    ) -> Result<Option<ComboId>> {
        let detected = self.combos.process_button_input(device, button, pressed)?;
        let Some(combo) = detected else {
            return Ok(None);
        };
        let action = self.binding(combo);
        if let Some(action) = action {
            self.perform(device, combo, action);
        }
        Ok(Some(combo))
    }

    fn perform(&self, device: usize, combo: ComboId, action: ComboAction) {
        let outcome = match action {
            ComboAction::PlayMacro {
                macro_id,
                looping,
                speed,
            } => self.macros.start_playback(macro_id, device, looping, speed),
            ComboAction::TriggerPattern {
                pattern_id,
                looping,
                intensity,
            } => self.ffb.trigger_pattern(device, pattern_id, looping, intensity),
        };
        if let Err(err) = outcome {
            // A stale binding (deleted macro/pattern, full slot pool) must
            // not fail input processing.
            warn!(combo_id = combo, device, error = %err, "combo action failed");
        }
    }

    /// Advance the whole engine by one frame's delta: combo idle timers,
    /// macro playback, then force-feedback frames.
    pub fn update(&self, delta_ms: u32) {
        self.combos.update(delta_ms);
        self.macros.update(delta_ms);
        self.ffb.update(delta_ms);
    }
}
