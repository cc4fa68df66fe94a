//! Pre-computed lookup table backing custom intensity curves.

use serde::{Deserialize, Serialize};

/// 256-entry lookup table with linear interpolation between entries.
///
/// A `CurveLut` is how a caller supplies a custom curve shape: build it once
/// with [`CurveLut::from_fn`] (or deserialize it from a profile), then attach
/// it to [`crate::IntensityCurve::Custom`]. Lookup is O(1) and allocation
/// free, so it is safe inside the per-frame haptics update.
///
/// # Example
///
/// ```
/// use openpad_curves::CurveLut;
///
/// let lut = CurveLut::from_fn(|x| x.sqrt());
/// assert!((lut.lookup(0.25) - 0.5).abs() < 0.01);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CurveLut {
    table: [f32; Self::SIZE],
}

impl CurveLut {
    /// Number of table entries.
    pub const SIZE: usize = 256;

    /// Identity LUT: output equals input.
    pub fn linear() -> Self {
        Self::from_fn(|x| x)
    }

    /// Build a LUT by sampling `f` at 256 evenly-spaced inputs.
    ///
    /// Sampled outputs are clamped to `[0,1]`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        let mut table = [0.0f32; Self::SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            let input = i as f32 / (Self::SIZE - 1) as f32;
            *entry = f(input).clamp(0.0, 1.0);
        }
        Self { table }
    }

    /// Interpolated lookup. Input is clamped to `[0,1]`.
    #[inline]
    pub fn lookup(&self, input: f32) -> f32 {
        let input = input.clamp(0.0, 1.0);
        let scaled = input * (Self::SIZE - 1) as f32;
        let lo = (scaled as usize).min(Self::SIZE - 2);
        let frac = scaled - lo as f32;

        let low = self.table.get(lo).copied().unwrap_or(0.0);
        let high = self.table.get(lo + 1).copied().unwrap_or(low);
        low + frac * (high - low)
    }

    /// The raw table, mainly for inspection in tests.
    pub fn table(&self) -> &[f32; Self::SIZE] {
        &self.table
    }
}

impl Default for CurveLut {
    fn default() -> Self {
        Self::linear()
    }
}

impl Serialize for CurveLut {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.table.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CurveLut {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries: Vec<f32> = Vec::deserialize(deserializer)?;
        if entries.len() != Self::SIZE {
            return Err(serde::de::Error::custom(format!(
                "expected {} entries in CurveLut, got {}",
                Self::SIZE,
                entries.len()
            )));
        }
        let mut table = [0.0f32; Self::SIZE];
        table.copy_from_slice(&entries);
        Ok(CurveLut { table })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_lut_is_identity() {
        let lut = CurveLut::linear();
        for i in 0..=100 {
            let input = i as f32 / 100.0;
            assert!((lut.lookup(input) - input).abs() < 0.01, "at {input}");
        }
    }

    #[test]
    fn test_lookup_clamps_input() {
        let lut = CurveLut::linear();
        assert!((lut.lookup(-2.0) - 0.0).abs() < 0.01);
        assert!((lut.lookup(3.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_from_fn_clamps_samples() {
        let lut = CurveLut::from_fn(|x| x * 5.0 - 1.0);
        for value in lut.table() {
            assert!((0.0..=1.0).contains(value));
        }
    }

    #[test]
    fn test_square_lut() {
        let lut = CurveLut::from_fn(|x| x * x);
        assert!((lut.lookup(0.0) - 0.0).abs() < 0.01);
        assert!((lut.lookup(0.5) - 0.25).abs() < 0.02);
        assert!((lut.lookup(1.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_default_is_linear() {
        assert_eq!(CurveLut::default(), CurveLut::linear());
    }

    #[test]
    fn test_serde_round_trip() -> Result<(), serde_json::Error> {
        let lut = CurveLut::from_fn(|x| 1.0 - x);
        let json = serde_json::to_string(&lut)?;
        let back: CurveLut = serde_json::from_str(&json)?;
        assert_eq!(lut, back);
        Ok(())
    }

    #[test]
    fn test_deserialize_rejects_wrong_length() {
        let json = serde_json::to_string(&vec![0.5f32; 8]).map_err(|e| e.to_string());
        assert!(json.is_ok());
        let result: Result<CurveLut, _> = serde_json::from_str(&json.unwrap_or_default());
        assert!(result.is_err());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_lookup_stays_in_unit_range(input in -10.0f32..10.0f32) {
            let lut = CurveLut::from_fn(|x| (x * 7.0).sin().abs());
            let output = lut.lookup(input);
            prop_assert!((0.0..=1.0).contains(&output));
        }
    }
}
