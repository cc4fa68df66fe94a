//! The `PadError` enum and error classification.
//!
//! Variants map one-to-one onto the failure modes of the engine's public
//! operations; tolerant no-ops (disabled haptics, no combo matched) are not
//! errors and never appear here.

use core::fmt;

/// Unified error type for all OpenPad subsystems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PadError {
    /// A parameter is outside its documented range.
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    InvalidArgument {
        /// Parameter name
        field: String,
        /// The rejected value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// A bounded table (patterns, macros, frames, playback slots) is full.
    ///
    /// The triggering operation is a no-op; retrying after freeing capacity
    /// is entirely the caller's decision.
    #[error("{table} table is full (capacity {capacity})")]
    CapacityExceeded {
        /// Which table rejected the insert
        table: &'static str,
        /// The table's fixed capacity
        capacity: usize,
    },

    /// No entry with the given id exists in the addressed table.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entry kind (pattern, macro, profile, ...)
        kind: &'static str,
        /// The unknown id
        id: u32,
    },

    /// No entry with the given name exists in the addressed table.
    #[error("{kind} '{name}' not found")]
    NameNotFound {
        /// Entry kind (pattern, macro, profile, ...)
        kind: &'static str,
        /// The unknown name
        name: String,
    },

    /// A per-device operation was started twice without finishing.
    #[error("{operation} already in progress on device {device}")]
    AlreadyInProgress {
        /// The doubly-started operation
        operation: &'static str,
        /// Device index
        device: usize,
    },

    /// A binding request collides with an existing binding.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl PadError {
    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PadError::CapacityExceeded { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Create an `InvalidArgument` error for a numeric range violation.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        PadError::InvalidArgument {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create an `InvalidArgument` error for a non-numeric constraint.
    pub fn invalid(field: impl Into<String>, value: impl fmt::Debug, expected: &str) -> Self {
        PadError::InvalidArgument {
            field: field.into(),
            value: format!("{value:?}"),
            min: expected.to_string(),
            max: expected.to_string(),
        }
    }

    /// Create a `CapacityExceeded` error.
    pub fn capacity(table: &'static str, capacity: usize) -> Self {
        PadError::CapacityExceeded { table, capacity }
    }

    /// Create a `NotFound` error.
    pub fn not_found(kind: &'static str, id: u32) -> Self {
        PadError::NotFound { kind, id }
    }

    /// Create a `NameNotFound` error.
    pub fn name_not_found(kind: &'static str, name: impl Into<String>) -> Self {
        PadError::NameNotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create an `AlreadyInProgress` error.
    pub fn in_progress(operation: &'static str, device: usize) -> Self {
        PadError::AlreadyInProgress { operation, device }
    }

    /// Create a `Conflict` error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        PadError::Conflict(msg.into())
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, system may be in unstable state
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = PadError::out_of_range("speed", 8.0_f32, 0.25_f32, 4.0_f32);
        let msg = err.to_string();
        assert!(msg.contains("speed"));
        assert!(msg.contains("8.0"));
        assert!(msg.contains("0.25"));
    }

    #[test]
    fn test_capacity_message() {
        let err = PadError::capacity("combo pattern", 64);
        assert_eq!(err.to_string(), "combo pattern table is full (capacity 64)");
    }

    #[test]
    fn test_not_found_message() {
        let err = PadError::not_found("macro", 17);
        assert_eq!(err.to_string(), "macro 17 not found");
    }

    #[test]
    fn test_in_progress_message() {
        let err = PadError::in_progress("recording", 2);
        assert!(err.to_string().contains("recording"));
        assert!(err.to_string().contains("device 2"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_capacity_is_warning() {
        assert_eq!(
            PadError::capacity("macro", 32).severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            PadError::not_found("macro", 1).severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_pad_error_is_std_error() {
        let err = PadError::conflict("combo 3 already bound");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            PadError::not_found("pattern", 5),
            PadError::not_found("pattern", 5)
        );
        assert_ne!(
            PadError::not_found("pattern", 5),
            PadError::not_found("pattern", 6)
        );
    }
}
