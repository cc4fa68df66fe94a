//! Input macro recording and playback for OpenPad
//!
//! Captures timestamped input event sequences per device and replays them
//! through the output sink with loop and speed control. Event timing is
//! frame-offset based: every event stores the milliseconds since the previous
//! event, so a macro is independent of when it was recorded.
//!
//! Recording is a per-device state machine (`idle → recording → idle` via
//! stop or cancel); playback runs in a bounded pool of slots, each its own
//! state machine (`idle → playing → idle | looping restart`) with an
//! orthogonal paused flag. All timing is driven by the caller's
//! `update(delta_ms)` — the system never reads a clock.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use openpad_device_types::{NullSink, PadButton};
//! use openpad_macros::{MacroEvent, MacroSystem};
//! use openpad_store::MemoryStore;
//!
//! let system = MacroSystem::new(Arc::new(NullSink), Arc::new(MemoryStore::new()));
//! system.start_recording(0, "jab")?;
//! system.add_event(0, MacroEvent::press(0, PadButton::A))?;
//! system.add_event(0, MacroEvent::release(50, PadButton::A))?;
//! let id = system.stop_recording(0)?;
//!
//! system.start_playback(id, 0, false, 1.0)?;
//! system.update(100);
//! assert!(!system.is_playing(id));
//! # Ok::<(), openpad_errors::PadError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod definition;
pub mod event;
pub mod system;
pub mod wire;

pub use definition::{Macro, MacroId};
pub use event::{MacroEvent, MacroEventKind};
pub use system::{MacroSystem, PlaybackProgress, RecordingStats};

/// Maximum events in one macro.
pub const MAX_EVENTS: usize = 2000;
/// Maximum stored macros.
pub const MAX_MACROS: usize = 32;
/// Concurrent playback slots.
pub const PLAYBACK_SLOTS: usize = 32;
/// Persistence slots per device.
pub const SAVE_SLOTS: usize = 16;
/// Slowest accepted playback speed.
pub const MIN_SPEED: f32 = 0.25;
/// Fastest accepted playback speed.
pub const MAX_SPEED: f32 = 4.0;
