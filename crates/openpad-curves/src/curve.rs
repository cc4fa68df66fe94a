//! The intensity curve shapes applied to haptic output.

use serde::{Deserialize, Serialize};

use crate::lut::CurveLut;

/// An intensity curve maps a normalized `[0,1]` input to a scaled `[0,1]`
/// output. Input is clamped before evaluation and output after.
///
/// `Custom` carries an optional caller-supplied [`CurveLut`]; a custom curve
/// without a resolved table evaluates as `Linear`. This is what a curve loaded
/// from a persisted profile looks like until a table is attached.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub enum IntensityCurve {
    /// `f(x) = x`
    #[default]
    Linear,
    /// Accelerating response: `f(x) = x²`
    Exponential,
    /// Smoothstep S-curve: `f(x) = x²·(3 − 2x)`
    Sigmoid,
    /// Caller-supplied lookup table; `None` evaluates as `Linear`.
    Custom(Option<Box<CurveLut>>),
}

impl IntensityCurve {
    /// Evaluate the curve at `input`.
    #[inline]
    pub fn evaluate(&self, input: f32) -> f32 {
        let x = input.clamp(0.0, 1.0);
        let y = match self {
            IntensityCurve::Linear => x,
            IntensityCurve::Exponential => x * x,
            IntensityCurve::Sigmoid => x * x * (3.0 - 2.0 * x),
            IntensityCurve::Custom(Some(lut)) => lut.lookup(x),
            IntensityCurve::Custom(None) => x,
        };
        y.clamp(0.0, 1.0)
    }

    /// Wire code of this curve shape (0 linear, 1 exponential, 2 sigmoid,
    /// 3 custom). The table of a custom curve is not part of the wire format.
    pub fn code(&self) -> u32 {
        match self {
            IntensityCurve::Linear => 0,
            IntensityCurve::Exponential => 1,
            IntensityCurve::Sigmoid => 2,
            IntensityCurve::Custom(_) => 3,
        }
    }

    /// Decode a wire code. Code 3 yields an unresolved custom curve; unknown
    /// codes decode as `Linear`, mirroring the unresolved-custom fallback.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => IntensityCurve::Exponential,
            2 => IntensityCurve::Sigmoid,
            3 => IntensityCurve::Custom(None),
            _ => IntensityCurve::Linear,
        }
    }

    /// Attach a lookup table, turning this into a resolved custom curve.
    pub fn with_lut(lut: CurveLut) -> Self {
        IntensityCurve::Custom(Some(Box::new(lut)))
    }
}
