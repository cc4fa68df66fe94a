//! Centralized error types for OpenPad
//!
//! This crate provides the unified error taxonomy shared by the combo
//! detection, macro, and force-feedback subsystems.
//!
//! # Taxonomy
//!
//! - [`PadError::InvalidArgument`]: out-of-range device/id/slot/name/scale
//! - [`PadError::CapacityExceeded`]: a bounded table is full
//! - [`PadError::NotFound`] / [`PadError::NameNotFound`]: unknown id or name
//! - [`PadError::AlreadyInProgress`]: double-start of a per-device operation
//! - [`PadError::Conflict`]: duplicate binding request
//!
//! Every public engine operation returns success, a tolerant no-op, or one of
//! these typed errors. Nothing in the engine panics or blocks.
//!
//! # Example
//!
//! ```
//! use openpad_errors::{PadError, Result};
//!
//! fn check_device(device: usize, max: usize) -> Result<()> {
//!     if device >= max {
//!         return Err(PadError::out_of_range("device", device, 0, max - 1));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_device(2, 4).is_ok());
//! assert!(check_device(7, 4).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod prelude;

pub use common::{ErrorSeverity, PadError};

/// A specialized `Result` type for OpenPad operations.
pub type Result<T> = std::result::Result<T, PadError>;
