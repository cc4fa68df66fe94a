//! Intensity curves for OpenPad haptic output
//!
//! Curves map a normalized `[0,1]` input to a scaled `[0,1]` haptic output
//! intensity. Inputs are clamped before evaluation and outputs after, so a
//! curve can never drive a motor outside its safe range.
//!
//! # Curve shapes
//!
//! - **Linear**: identity, `f(x) = x`
//! - **Exponential**: accelerating response, `f(x) = x²`
//! - **Sigmoid**: smoothstep S-curve, `f(x) = x²·(3 − 2x)`
//! - **Custom**: caller-supplied lookup table; an unresolved custom curve
//!   evaluates as Linear
//!
//! # Example
//!
//! ```
//! use openpad_curves::IntensityCurve;
//!
//! let curve = IntensityCurve::Exponential;
//! assert!((curve.evaluate(0.5) - 0.25).abs() < 1e-6);
//!
//! // Identity at the endpoints for every shape
//! assert!((IntensityCurve::Sigmoid.evaluate(1.0) - 1.0).abs() < 1e-6);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod curve;
pub mod lut;

pub use curve::IntensityCurve;
pub use lut::CurveLut;
