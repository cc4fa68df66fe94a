//! Button combo detection for OpenPad
//!
//! Recognizes fighting-game-style timed button sequences. Patterns are
//! ordered token lists (concrete buttons or wildcards) registered with a
//! timeout; each device keeps a bounded buffer of recent presses that is
//! matched against every enabled pattern in registration order.
//!
//! # Detection rules
//!
//! - Button releases are ignored; only presses enter the buffer.
//! - A press resets the device's idle timer; once idle time exceeds the
//!   maximum timeout among enabled patterns the buffer clears on its own.
//! - The first pattern whose full token sequence matches the buffer wins;
//!   the buffer clears and no later pattern is checked. Tie-break between
//!   patterns sharing a prefix is registration order, by policy.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use openpad_combo::{presets, ComboDetector};
//! use openpad_device_types::PadButton;
//! use openpad_store::MemoryStore;
//!
//! let detector = ComboDetector::new(Arc::new(MemoryStore::new()));
//! let id = detector.register_pattern(presets::hadoken())?;
//!
//! // Y, X, B, A within the timeout
//! assert_eq!(detector.process_button_input(0, PadButton::Y, true)?, None);
//! assert_eq!(detector.process_button_input(0, PadButton::X, true)?, None);
//! assert_eq!(detector.process_button_input(0, PadButton::B, true)?, None);
//! assert_eq!(detector.process_button_input(0, PadButton::A, true)?, Some(id));
//! # Ok::<(), openpad_errors::PadError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod detector;
pub mod pattern;
pub mod presets;
pub mod wire;

pub use detector::{ComboDetector, ComboStats};
pub use pattern::{ComboId, ComboPattern};

/// Maximum tokens in one combo sequence.
pub const MAX_TOKENS: usize = 8;
/// Maximum registered patterns.
pub const MAX_PATTERNS: usize = 64;
/// Upper bound accepted for a pattern timeout.
pub const MAX_TIMEOUT_MS: u32 = 5000;
/// Timeout applied when a pattern asks for 0 or an over-limit value, and the
/// idle-clear bound when no pattern is enabled.
pub const DEFAULT_TIMEOUT_MS: u32 = 2000;
