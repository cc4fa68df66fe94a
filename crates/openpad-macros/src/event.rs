//! Macro event types.

use openpad_device_types::{OutputEvent, PadAxis, PadButton};
use serde::{Deserialize, Serialize};

/// What a macro event does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacroEventKind {
    /// Press a button.
    ButtonPress(PadButton),
    /// Release a button.
    ButtonRelease(PadButton),
    /// Move an axis to a position.
    AxisMotion {
        /// Target axis.
        axis: PadAxis,
        /// Position, full i16 range.
        value: i16,
    },
    /// Wait; consumes timeline time and dispatches nothing.
    Pause {
        /// Recorded wait length. Informational: timing comes from the
        /// event's frame offset like every other kind.
        duration_ms: u32,
    },
    /// Trigger a stored force-feedback pattern.
    Vibrate {
        /// Pattern id in the force-feedback engine.
        pattern: u32,
    },
}

impl MacroEventKind {
    /// The output event dispatched when this fires; `None` for pauses.
    pub fn to_output(self) -> Option<OutputEvent> {
        match self {
            MacroEventKind::ButtonPress(button) => Some(OutputEvent::ButtonPress(button)),
            MacroEventKind::ButtonRelease(button) => Some(OutputEvent::ButtonRelease(button)),
            MacroEventKind::AxisMotion { axis, value } => {
                Some(OutputEvent::AxisMotion { axis, value })
            }
            MacroEventKind::Pause { .. } => None,
            MacroEventKind::Vibrate { pattern } => Some(OutputEvent::Vibrate { pattern }),
        }
    }

    /// Wire code of this event kind.
    pub fn code(self) -> u32 {
        match self {
            MacroEventKind::ButtonPress(_) => 0,
            MacroEventKind::ButtonRelease(_) => 1,
            MacroEventKind::AxisMotion { .. } => 2,
            MacroEventKind::Pause { .. } => 3,
            MacroEventKind::Vibrate { .. } => 4,
        }
    }
}

/// One timed step of a macro.
///
/// `offset_ms` is relative to the previous event (or to playback start for
/// the first event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroEvent {
    /// Milliseconds since the previous event.
    pub offset_ms: u32,
    /// What fires.
    pub kind: MacroEventKind,
}

impl MacroEvent {
    /// Build an event.
    pub fn new(offset_ms: u32, kind: MacroEventKind) -> Self {
        Self { offset_ms, kind }
    }

    /// Button press after `offset_ms`.
    pub fn press(offset_ms: u32, button: PadButton) -> Self {
        Self::new(offset_ms, MacroEventKind::ButtonPress(button))
    }

    /// Button release after `offset_ms`.
    pub fn release(offset_ms: u32, button: PadButton) -> Self {
        Self::new(offset_ms, MacroEventKind::ButtonRelease(button))
    }

    /// Axis motion after `offset_ms`.
    pub fn axis(offset_ms: u32, axis: PadAxis, value: i16) -> Self {
        Self::new(offset_ms, MacroEventKind::AxisMotion { axis, value })
    }

    /// Pause step after `offset_ms`.
    pub fn pause(offset_ms: u32, duration_ms: u32) -> Self {
        Self::new(offset_ms, MacroEventKind::Pause { duration_ms })
    }

    /// Vibration trigger after `offset_ms`.
    pub fn vibrate(offset_ms: u32, pattern: u32) -> Self {
        Self::new(offset_ms, MacroEventKind::Vibrate { pattern })
    }
}
