//! Persisted force feedback records.
//!
//! Profile layout (little-endian):
//!
//! ```text
//! name      [u8; 64]  NUL-padded
//! curve     u32       0 linear, 1 exponential, 2 sigmoid, 3 custom
//! scale     f32       intensity scale
//! weapon    f32       weapon sensitivity
//! env       f32       environment sensitivity
//! adaptive  u32       0 or 1
//! haptics   u32       0 or 1
//! enabled   u32       0 or 1
//! ```
//!
//! Pattern layout:
//!
//! ```text
//! name      [u8; 64]  NUL-padded
//! count     u32       number of frames (0..=120)
//! enabled   u32       0 or 1
//! duration  u32       cached total duration
//! peak      u32       cached max intensity (0..=6)
//! frames    16 bytes each: left u32 | right u32 | duration u32 | curve u32
//! ```
//!
//! Unknown curve codes decode as linear (the unresolved-custom rule); a
//! custom curve's lookup table is not part of the wire format and comes back
//! unresolved.

use openpad_curves::IntensityCurve;
use openpad_store::wire::{DecodeError, RecordReader, RecordWriter};

use crate::MAX_FRAMES;
use crate::intensity::FfIntensity;
use crate::pattern::{FfFrame, FfPattern, PatternId};
use crate::profile::FfProfile;

/// Encode a profile into its fixed-layout record.
pub fn encode_profile(profile: &FfProfile) -> Vec<u8> {
    let mut writer = RecordWriter::new();
    writer
        .name(profile.name())
        .u32(profile.default_curve.code())
        .f32(profile.intensity_scale)
        .f32(profile.weapon_sensitivity)
        .f32(profile.environment_sensitivity)
        .u32(u32::from(profile.adaptive_intensity))
        .u32(u32::from(profile.haptics_enabled))
        .u32(u32::from(profile.enabled));
    writer.finish()
}

/// Decode a profile record. The caller assigns the id.
///
/// # Errors
///
/// [`DecodeError`] for truncated buffers or out-of-range scalars.
pub fn decode_profile(blob: &[u8]) -> Result<FfProfile, DecodeError> {
    let mut reader = RecordReader::new(blob);
    let name = reader.name()?;
    let curve = IntensityCurve::from_code(reader.u32()?);
    let intensity_scale = reader.f32()?;
    let weapon_sensitivity = reader.f32()?;
    let environment_sensitivity = reader.f32()?;
    let adaptive = reader.u32()? != 0;
    let haptics = reader.u32()? != 0;
    let enabled = reader.u32()? != 0;

    if !(0.0..=1.0).contains(&intensity_scale) {
        return Err(DecodeError::BadValue {
            field: "intensity scale",
            value: intensity_scale as i64,
        });
    }
    if !(0.5..=2.0).contains(&weapon_sensitivity) || !(0.5..=2.0).contains(&environment_sensitivity)
    {
        return Err(DecodeError::BadValue {
            field: "sensitivity",
            value: 0,
        });
    }

    let mut profile = FfProfile::new(0, name, curve);
    profile.intensity_scale = intensity_scale;
    profile.weapon_sensitivity = weapon_sensitivity;
    profile.environment_sensitivity = environment_sensitivity;
    profile.adaptive_intensity = adaptive;
    profile.haptics_enabled = haptics;
    profile.enabled = enabled;
    Ok(profile)
}

/// Encode a pattern into its fixed-layout record.
pub fn encode_pattern(pattern: &FfPattern) -> Vec<u8> {
    let mut writer = RecordWriter::new();
    writer
        .name(pattern.name())
        .u32(pattern.frames().len() as u32)
        .u32(u32::from(pattern.is_enabled()))
        .u32(pattern.total_duration_ms())
        .u32(pattern.max_intensity().code());
    for frame in pattern.frames() {
        writer
            .u32(frame.left.code())
            .u32(frame.right.code())
            .u32(frame.duration_ms)
            .u32(frame.curve.code());
    }
    writer.finish()
}

/// Decode a pattern record under the id the caller assigns.
///
/// # Errors
///
/// [`DecodeError`] for truncated buffers, counts above [`MAX_FRAMES`], or
/// unknown intensity codes.
pub fn decode_pattern(blob: &[u8], id: PatternId) -> Result<FfPattern, DecodeError> {
    let mut reader = RecordReader::new(blob);
    let name = reader.name()?;
    let count = reader.u32()? as usize;
    if count > MAX_FRAMES {
        return Err(DecodeError::CountTooLarge {
            field: "frame",
            count,
            capacity: MAX_FRAMES,
        });
    }
    let enabled = reader.u32()? != 0;
    let total_duration_ms = reader.u32()?;
    let peak_code = reader.u32()?;
    let max_intensity = FfIntensity::from_code(peak_code).ok_or(DecodeError::BadValue {
        field: "max intensity",
        value: i64::from(peak_code),
    })?;

    let mut frames = Vec::with_capacity(count);
    for _ in 0..count {
        let left_code = reader.u32()?;
        let right_code = reader.u32()?;
        let duration_ms = reader.u32()?;
        let curve = IntensityCurve::from_code(reader.u32()?);
        let left = FfIntensity::from_code(left_code).ok_or(DecodeError::BadValue {
            field: "left intensity",
            value: i64::from(left_code),
        })?;
        let right = FfIntensity::from_code(right_code).ok_or(DecodeError::BadValue {
            field: "right intensity",
            value: i64::from(right_code),
        })?;
        frames.push(FfFrame::new(left, right, duration_ms, curve));
    }

    Ok(FfPattern::from_record(
        id,
        name,
        frames,
        total_duration_ms,
        max_intensity,
        enabled,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use openpad_store::wire::NAME_LEN;

    fn sample_pattern() -> FfPattern {
        FfPattern::new(
            7,
            "Weapon_Shotgun".into(),
            vec![
                FfFrame::new(
                    FfIntensity::Max,
                    FfIntensity::VeryStrong,
                    30,
                    IntensityCurve::Linear,
                ),
                FfFrame::new(
                    FfIntensity::Strong,
                    FfIntensity::Medium,
                    50,
                    IntensityCurve::Exponential,
                ),
            ],
            true,
        )
    }

    fn sample_profile() -> FfProfile {
        let mut profile = FfProfile::new(3, "player-one".into(), IntensityCurve::Sigmoid);
        profile.intensity_scale = 0.8;
        profile.weapon_sensitivity = 1.5;
        profile.environment_sensitivity = 0.5;
        profile.adaptive_intensity = true;
        profile
    }

    #[test]
    fn test_profile_round_trip() -> Result<(), DecodeError> {
        let profile = sample_profile();
        let back = decode_profile(&encode_profile(&profile))?;
        assert_eq!(back.name(), "player-one");
        assert_eq!(back.default_curve, IntensityCurve::Sigmoid);
        assert!((back.intensity_scale - 0.8).abs() < 1e-6);
        assert!((back.weapon_sensitivity - 1.5).abs() < 1e-6);
        assert!((back.environment_sensitivity - 0.5).abs() < 1e-6);
        assert!(back.adaptive_intensity);
        assert!(back.haptics_enabled);
        assert!(back.enabled);
        Ok(())
    }

    #[test]
    fn test_profile_record_size_is_fixed() {
        assert_eq!(encode_profile(&sample_profile()).len(), NAME_LEN + 28);
    }

    #[test]
    fn test_profile_out_of_range_scale_rejected() {
        let mut writer = RecordWriter::new();
        writer
            .name("bad")
            .u32(0)
            .f32(1.5)
            .f32(1.0)
            .f32(1.0)
            .u32(0)
            .u32(1)
            .u32(1);
        assert!(matches!(
            decode_profile(&writer.finish()),
            Err(DecodeError::BadValue { field: "intensity scale", .. })
        ));
    }

    #[test]
    fn test_profile_out_of_range_sensitivity_rejected() {
        let mut writer = RecordWriter::new();
        writer
            .name("bad")
            .u32(0)
            .f32(1.0)
            .f32(2.5)
            .f32(1.0)
            .u32(0)
            .u32(1)
            .u32(1);
        assert!(decode_profile(&writer.finish()).is_err());
    }

    #[test]
    fn test_pattern_round_trip() -> Result<(), DecodeError> {
        let pattern = sample_pattern();
        let back = decode_pattern(&encode_pattern(&pattern), 7)?;
        assert_eq!(back, pattern);
        Ok(())
    }

    #[test]
    fn test_pattern_frames_are_fixed_width() {
        let blob = encode_pattern(&sample_pattern());
        assert_eq!(blob.len(), NAME_LEN + 16 + 2 * 16);
    }

    #[test]
    fn test_pattern_custom_curve_comes_back_unresolved() -> Result<(), DecodeError> {
        let pattern = FfPattern::new(
            1,
            "custom".into(),
            vec![FfFrame::new(
                FfIntensity::Medium,
                FfIntensity::Medium,
                40,
                IntensityCurve::with_lut(openpad_curves::CurveLut::from_fn(|x| x * x)),
            )],
            true,
        );
        let back = decode_pattern(&encode_pattern(&pattern), 1)?;
        assert_eq!(
            back.frames().first().map(|f| f.curve.clone()),
            Some(IntensityCurve::Custom(None))
        );
        Ok(())
    }

    #[test]
    fn test_pattern_unknown_curve_decodes_as_linear() -> Result<(), DecodeError> {
        let mut writer = RecordWriter::new();
        writer.name("odd").u32(1).u32(1).u32(10).u32(3);
        writer.u32(3).u32(3).u32(10).u32(250);
        let back = decode_pattern(&writer.finish(), 1)?;
        assert_eq!(
            back.frames().first().map(|f| f.curve.clone()),
            Some(IntensityCurve::Linear)
        );
        Ok(())
    }

    #[test]
    fn test_pattern_unknown_intensity_rejected() {
        let mut writer = RecordWriter::new();
        writer.name("bad").u32(1).u32(1).u32(10).u32(3);
        writer.u32(9).u32(3).u32(10).u32(0);
        assert!(matches!(
            decode_pattern(&writer.finish(), 1),
            Err(DecodeError::BadValue { field: "left intensity", .. })
        ));
    }

    #[test]
    fn test_pattern_count_above_capacity_rejected() {
        let mut writer = RecordWriter::new();
        writer.name("big").u32(MAX_FRAMES as u32 + 1).u32(1).u32(0).u32(0);
        assert!(matches!(
            decode_pattern(&writer.finish(), 1),
            Err(DecodeError::CountTooLarge { .. })
        ));
    }

    #[test]
    fn test_truncated_pattern_rejected() {
        let blob = encode_pattern(&sample_pattern());
        assert!(decode_pattern(&blob[..blob.len() - 1], 7).is_err());
    }
}
