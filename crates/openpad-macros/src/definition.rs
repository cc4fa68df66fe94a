//! The stored macro type.

use serde::{Deserialize, Serialize};

use crate::event::MacroEvent;

/// Identifier assigned when a macro is stored; unique for the system's
/// lifetime, never reused after deletion.
pub type MacroId = u32;

/// A recorded, replayable input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    id: MacroId,
    name: String,
    events: Vec<MacroEvent>,
    total_duration_ms: u32,
    enabled: bool,
}

impl Macro {
    pub(crate) fn new(
        id: MacroId,
        name: String,
        events: Vec<MacroEvent>,
        total_duration_ms: u32,
        enabled: bool,
    ) -> Self {
        Self {
            id,
            name,
            events,
            total_duration_ms,
            enabled,
        }
    }

    /// Macro id.
    pub fn id(&self) -> MacroId {
        self.id
    }

    /// Macro name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event sequence in playback order.
    pub fn events(&self) -> &[MacroEvent] {
        &self.events
    }

    /// Stored total runtime. Set to the sum of event offsets when recording
    /// stops; editing may leave it stale, which [`Macro::offset_sum`]
    /// exposes for the soft consistency check.
    pub fn total_duration_ms(&self) -> u32 {
        self.total_duration_ms
    }

    /// Whether playback of this macro is allowed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sum of all event offsets.
    pub fn offset_sum(&self) -> u32 {
        self.events
            .iter()
            .fold(0u32, |acc, e| acc.saturating_add(e.offset_ms))
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_duration(&mut self, duration_ms: u32) {
        self.total_duration_ms = duration_ms;
    }

    pub(crate) fn events_mut(&mut self) -> &mut Vec<MacroEvent> {
        &mut self.events
    }

    pub(crate) fn with_id(&self, id: MacroId, name: String) -> Self {
        Self {
            id,
            name,
            events: self.events.clone(),
            total_duration_ms: self.total_duration_ms,
            enabled: self.enabled,
        }
    }
}
