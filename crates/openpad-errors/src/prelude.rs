//! Convenience re-exports for downstream crates.
//!
//! ```
//! use openpad_errors::prelude::*;
//!
//! fn demo() -> Result<()> {
//!     Err(PadError::not_found("macro", 9))
//! }
//! assert!(demo().is_err());
//! ```

pub use crate::common::{ErrorSeverity, PadError};
pub use crate::Result;
