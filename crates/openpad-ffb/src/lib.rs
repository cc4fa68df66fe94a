//! Force feedback engine for OpenPad
//!
//! Drives haptic output from weapon, environment, and impact events through
//! authored intensity patterns. A pattern is a time-ordered list of frames
//! (discrete left/right motor levels, a duration, an intensity curve); a
//! profile shapes how patterns translate to motor output via a default
//! curve, a global scale, and per-source sensitivity multipliers.
//!
//! Triggers validate the device and enabled flags first; haptics disabled
//! globally or for a device make every trigger a silent success — absence of
//! a rumble motor is not an error.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use openpad_device_types::NullSink;
//! use openpad_ffb::{FfEngine, WeaponKind};
//! use openpad_store::MemoryStore;
//!
//! let engine = FfEngine::new(Arc::new(NullSink), Arc::new(MemoryStore::new()));
//! engine.trigger_weapon(0, WeaponKind::Shotgun, 1.0)?;
//! engine.update(80); // 30 ms burst + 50 ms decay, then idle
//! assert!(!engine.is_playing(0)?);
//! # Ok::<(), openpad_errors::PadError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod engine;
pub mod intensity;
pub mod pattern;
pub mod profile;
pub mod weapons;
pub mod wire;

pub use engine::FfEngine;
pub use intensity::FfIntensity;
pub use pattern::{FfFrame, FfPattern, PatternId};
pub use profile::{FfProfile, ProfileId};
pub use weapons::{EnvironmentKind, WeaponKind};

/// Maximum stored patterns.
pub const MAX_PATTERNS: usize = 32;
/// Maximum stored profiles.
pub const MAX_PROFILES: usize = 16;
/// Maximum frames in one pattern.
pub const MAX_FRAMES: usize = 120;
/// Persistence slots per device.
pub const SAVE_SLOTS: usize = 16;
/// Upper bound of the engine-wide intensity scale.
pub const MAX_GLOBAL_SCALE: f32 = 2.0;
