//! Opaque persistence collaborator for OpenPad
//!
//! The engine persists macros, combo patterns, and force-feedback
//! profiles/patterns as opaque blobs keyed by `(record kind, device, slot)`.
//! The store itself is an external collaborator: the engine only ever calls
//! [`SlotStore::save`], [`SlotStore::load`], [`SlotStore::delete`], and
//! [`SlotStore::enumerate`], always fire-and-forget from the engine's point
//! of view.
//!
//! The blob payload format is owned by the engine, not the store. Each record
//! is a fixed-layout little-endian buffer (64-byte name field, 32-bit counts,
//! packed fixed-width element array); the [`wire`] module carries the shared
//! codec helpers while each subsystem crate owns its own record layout.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod memory;
pub mod wire;

use std::fmt;

pub use memory::MemoryStore;

/// What a persisted record contains. Part of the store key so the four record
/// families never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    /// A recorded input macro.
    Macro,
    /// A registered combo pattern.
    ComboPattern,
    /// A force-feedback profile.
    FfProfile,
    /// A force-feedback pattern.
    FfPattern,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Macro => write!(f, "macro"),
            RecordKind::ComboPattern => write!(f, "combo-pattern"),
            RecordKind::FfProfile => write!(f, "ff-profile"),
            RecordKind::FfPattern => write!(f, "ff-pattern"),
        }
    }
}

/// Store key: one saved record per `(kind, device, slot)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    /// Record family.
    pub kind: RecordKind,
    /// Owning device index.
    pub device: u8,
    /// Save slot within the device (0-based, bounded per subsystem).
    pub slot: u8,
}

impl SlotKey {
    /// Construct a key.
    pub fn new(kind: RecordKind, device: u8, slot: u8) -> Self {
        Self { kind, device, slot }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.device, self.slot)
    }
}

/// Errors surfaced by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record exists under the key.
    #[error("no record stored under {0}")]
    NotFound(SlotKey),
    /// The backend failed; the message is backend-specific.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Opaque key→blob persistence capability.
///
/// Implementations must be safe to call from any engine operation; the
/// engine never holds one of its own locks across a store call.
pub trait SlotStore: Send + Sync {
    /// Persist `blob` under `key`, replacing any previous record.
    fn save(&self, key: SlotKey, blob: &[u8]) -> Result<(), StoreError>;

    /// Fetch the record stored under `key`.
    fn load(&self, key: SlotKey) -> Result<Vec<u8>, StoreError>;

    /// Remove the record stored under `key`.
    fn delete(&self, key: SlotKey) -> Result<(), StoreError>;

    /// List every key currently holding a record.
    fn enumerate(&self) -> Vec<SlotKey>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let key = SlotKey::new(RecordKind::Macro, 1, 7);
        assert_eq!(key.to_string(), "macro:1:7");
    }

    #[test]
    fn test_store_error_messages() {
        let key = SlotKey::new(RecordKind::FfProfile, 0, 3);
        assert!(StoreError::NotFound(key).to_string().contains("ff-profile"));
        assert_eq!(
            StoreError::Backend("disk gone".into()).to_string(),
            "store backend error: disk gone"
        );
    }

    #[test]
    fn test_keys_with_different_kinds_are_distinct() {
        let a = SlotKey::new(RecordKind::Macro, 0, 0);
        let b = SlotKey::new(RecordKind::ComboPattern, 0, 0);
        assert_ne!(a, b);
    }
}
