//! Shared gamepad types for the OpenPad engine
//!
//! Buttons, axes, combo tokens, synthesized output events, and the output
//! sink capability through which macro playback and force feedback re-inject
//! events into the host. Kept dependency-light so every subsystem crate can
//! share these without cycles.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

use serde::{Deserialize, Serialize};

/// Number of gamepad devices tracked by every subsystem.
pub const MAX_DEVICES: usize = 4;

/// A physical gamepad button.
///
/// Wire codes are 1..=8; code 0 is the sequence terminator in persisted
/// records and is not representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadButton {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    Back,
    Start,
}

impl PadButton {
    /// Wire code for persisted records (1..=8).
    pub fn code(self) -> u32 {
        match self {
            PadButton::A => 1,
            PadButton::B => 2,
            PadButton::X => 3,
            PadButton::Y => 4,
            PadButton::LeftBumper => 5,
            PadButton::RightBumper => 6,
            PadButton::Back => 7,
            PadButton::Start => 8,
        }
    }

    /// Decode a wire code; `None` for the terminator (0) or unknown codes.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(PadButton::A),
            2 => Some(PadButton::B),
            3 => Some(PadButton::X),
            4 => Some(PadButton::Y),
            5 => Some(PadButton::LeftBumper),
            6 => Some(PadButton::RightBumper),
            7 => Some(PadButton::Back),
            8 => Some(PadButton::Start),
            _ => None,
        }
    }

    /// Human-readable name, as shown in config tooling.
    pub fn name(self) -> &'static str {
        match self {
            PadButton::A => "A",
            PadButton::B => "B",
            PadButton::X => "X",
            PadButton::Y => "Y",
            PadButton::LeftBumper => "LB",
            PadButton::RightBumper => "RB",
            PadButton::Back => "BACK",
            PadButton::Start => "START",
        }
    }
}

/// An analog stick or trigger axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

impl PadAxis {
    /// Wire code for persisted records (0..=5).
    pub fn code(self) -> u32 {
        match self {
            PadAxis::LeftX => 0,
            PadAxis::LeftY => 1,
            PadAxis::RightX => 2,
            PadAxis::RightY => 3,
            PadAxis::LeftTrigger => 4,
            PadAxis::RightTrigger => 5,
        }
    }

    /// Decode a wire code.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(PadAxis::LeftX),
            1 => Some(PadAxis::LeftY),
            2 => Some(PadAxis::RightX),
            3 => Some(PadAxis::RightY),
            4 => Some(PadAxis::LeftTrigger),
            5 => Some(PadAxis::RightTrigger),
            _ => None,
        }
    }
}

/// One position in a combo sequence: a concrete button or the wildcard.
///
/// The wildcard replaces the legacy `-1` integer convention; persisted
/// records still use `-1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboToken {
    /// Matches exactly this button.
    Button(PadButton),
    /// Matches any button.
    Any,
}

impl ComboToken {
    /// Does a pressed button satisfy this token?
    #[inline]
    pub fn matches(self, button: PadButton) -> bool {
        match self {
            ComboToken::Button(expected) => expected == button,
            ComboToken::Any => true,
        }
    }

    /// Signed wire code: button codes 1..=8, wildcard −1.
    pub fn code(self) -> i32 {
        match self {
            ComboToken::Button(b) => b.code() as i32,
            ComboToken::Any => -1,
        }
    }

    /// Decode a signed wire code; `None` for the terminator (0) or unknown
    /// codes.
    pub fn from_code(code: i32) -> Option<Self> {
        if code == -1 {
            return Some(ComboToken::Any);
        }
        u32::try_from(code)
            .ok()
            .and_then(PadButton::from_code)
            .map(ComboToken::Button)
    }
}

impl From<PadButton> for ComboToken {
    fn from(button: PadButton) -> Self {
        ComboToken::Button(button)
    }
}

/// A synthesized event re-injected into the host input layer.
///
/// The engine places no contract on how the receiver handles these beyond
/// ordering within one dispatch call site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputEvent {
    /// Synthesized button press.
    ButtonPress(PadButton),
    /// Synthesized button release.
    ButtonRelease(PadButton),
    /// Synthesized axis motion, value normalized to the i16 range.
    AxisMotion { axis: PadAxis, value: i16 },
    /// Request to play a stored force-feedback pattern by id.
    Vibrate { pattern: u32 },
    /// Raw motor levels, already curve- and profile-scaled to `[0,1]`.
    Rumble { left: f32, right: f32 },
}

/// Injectable capability that accepts synthesized output events.
///
/// Implementations must not call back into the engine from `dispatch`; the
/// calling subsystem has released its own lock but makes no guarantee about
/// the other subsystems.
pub trait OutputSink: Send + Sync {
    /// Deliver one event for the given device.
    fn dispatch(&self, device: usize, event: OutputEvent);
}

/// A sink that discards every event. Useful for tests and headless tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn dispatch(&self, _device: usize, _event: OutputEvent) {}
}
