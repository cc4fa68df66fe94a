//! Persisted macro records.
//!
//! Layout (little-endian):
//!
//! ```text
//! name      [u8; 64]  NUL-padded
//! count     u32       number of events (0..=2000)
//! enabled   u32       0 or 1
//! duration  u32       total_duration_ms
//! events    16 bytes each:
//!     kind    u32     0 press, 1 release, 2 axis, 3 pause, 4 vibrate
//!     offset  u16     frame offset in milliseconds
//!     pad     u16     0
//!     payload [u8; 8] by kind:
//!         press/release: button u32, pad u32
//!         axis:          axis u32, value i16, pad u16
//!         pause:         duration u32, pad u32
//!         vibrate:       pattern u32, pad u32
//! ```

use openpad_device_types::{PadAxis, PadButton};
use openpad_store::wire::{DecodeError, RecordReader, RecordWriter};

use crate::MAX_EVENTS;
use crate::definition::Macro;
use crate::event::{MacroEvent, MacroEventKind};

/// A decoded macro record, identity-free: the system assigns the id when the
/// record is (re-)registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroRecord {
    /// Macro name.
    pub name: String,
    /// Whether playback is allowed.
    pub enabled: bool,
    /// Stored total runtime.
    pub total_duration_ms: u32,
    /// Event sequence.
    pub events: Vec<MacroEvent>,
}

fn encode_event(writer: &mut RecordWriter, event: &MacroEvent) {
    writer.u32(event.kind.code());
    writer.u16(event.offset_ms.min(u32::from(u16::MAX)) as u16);
    writer.u16(0);
    match event.kind {
        MacroEventKind::ButtonPress(button) | MacroEventKind::ButtonRelease(button) => {
            writer.u32(button.code()).u32(0);
        }
        MacroEventKind::AxisMotion { axis, value } => {
            writer.u32(axis.code()).i16(value).u16(0);
        }
        MacroEventKind::Pause { duration_ms } => {
            writer.u32(duration_ms).u32(0);
        }
        MacroEventKind::Vibrate { pattern } => {
            writer.u32(pattern).u32(0);
        }
    }
}

fn decode_event(reader: &mut RecordReader<'_>) -> Result<MacroEvent, DecodeError> {
    let kind_code = reader.u32()?;
    let offset_ms = u32::from(reader.u16()?);
    reader.pad(2)?;
    let kind = match kind_code {
        0 | 1 => {
            let code = reader.u32()?;
            reader.pad(4)?;
            let button = PadButton::from_code(code).ok_or(DecodeError::BadValue {
                field: "button",
                value: i64::from(code),
            })?;
            if kind_code == 0 {
                MacroEventKind::ButtonPress(button)
            } else {
                MacroEventKind::ButtonRelease(button)
            }
        }
        2 => {
            let axis_code = reader.u32()?;
            let value = reader.i16()?;
            reader.pad(2)?;
            let axis = PadAxis::from_code(axis_code).ok_or(DecodeError::BadValue {
                field: "axis",
                value: i64::from(axis_code),
            })?;
            MacroEventKind::AxisMotion { axis, value }
        }
        3 => {
            let duration_ms = reader.u32()?;
            reader.pad(4)?;
            MacroEventKind::Pause { duration_ms }
        }
        4 => {
            let pattern = reader.u32()?;
            reader.pad(4)?;
            MacroEventKind::Vibrate { pattern }
        }
        other => {
            return Err(DecodeError::BadValue {
                field: "event kind",
                value: i64::from(other),
            });
        }
    };
    Ok(MacroEvent { offset_ms, kind })
}

/// Encode a macro into its fixed-layout record.
pub fn encode_macro(def: &Macro) -> Vec<u8> {
    encode_fields(def.name(), def.is_enabled(), def.total_duration_ms(), def.events())
}

/// Encode an identity-free record, e.g. one produced by import tooling.
pub fn encode_record(record: &MacroRecord) -> Vec<u8> {
    encode_fields(
        &record.name,
        record.enabled,
        record.total_duration_ms,
        &record.events,
    )
}

fn encode_fields(name: &str, enabled: bool, total_duration_ms: u32, events: &[MacroEvent]) -> Vec<u8> {
    let mut writer = RecordWriter::new();
    writer
        .name(name)
        .u32(events.len() as u32)
        .u32(u32::from(enabled))
        .u32(total_duration_ms);
    for event in events {
        encode_event(&mut writer, event);
    }
    writer.finish()
}

/// Decode a record.
///
/// # Errors
///
/// [`DecodeError`] for truncated buffers, counts above [`MAX_EVENTS`], or
/// unknown kind/button/axis codes.
pub fn decode_macro(blob: &[u8]) -> Result<MacroRecord, DecodeError> {
    let mut reader = RecordReader::new(blob);
    let name = reader.name()?;
    let count = reader.u32()? as usize;
    if count > MAX_EVENTS {
        return Err(DecodeError::CountTooLarge {
            field: "event",
            count,
            capacity: MAX_EVENTS,
        });
    }
    let enabled = reader.u32()? != 0;
    let total_duration_ms = reader.u32()?;
    let mut events = Vec::with_capacity(count);
    for _ in 0..count {
        events.push(decode_event(&mut reader)?);
    }
    Ok(MacroRecord {
        name,
        enabled,
        total_duration_ms,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use openpad_store::wire::NAME_LEN;

    const EVENT_SIZE: usize = 16;
    const HEADER_SIZE: usize = NAME_LEN + 12;

    fn sample() -> Macro {
        Macro::new(
            3,
            "combo-finisher".into(),
            vec![
                MacroEvent::press(0, PadButton::X),
                MacroEvent::axis(16, PadAxis::LeftTrigger, 31000),
                MacroEvent::pause(5, 120),
                MacroEvent::vibrate(120, 2),
                MacroEvent::release(10, PadButton::X),
            ],
            151,
            true,
        )
    }

    #[test]
    fn test_round_trip() -> Result<(), DecodeError> {
        let def = sample();
        let record = decode_macro(&encode_macro(&def))?;
        assert_eq!(record.name, "combo-finisher");
        assert!(record.enabled);
        assert_eq!(record.total_duration_ms, 151);
        assert_eq!(record.events, def.events());
        Ok(())
    }

    #[test]
    fn test_events_are_fixed_width() {
        let blob = encode_macro(&sample());
        assert_eq!(blob.len(), HEADER_SIZE + 5 * EVENT_SIZE);
    }

    #[test]
    fn test_empty_macro_is_header_only() -> Result<(), DecodeError> {
        let def = Macro::new(1, "empty".into(), Vec::new(), 0, false);
        let blob = encode_macro(&def);
        assert_eq!(blob.len(), HEADER_SIZE);
        let record = decode_macro(&blob)?;
        assert!(record.events.is_empty());
        assert!(!record.enabled);
        Ok(())
    }

    #[test]
    fn test_truncated_event_rejected() {
        let blob = encode_macro(&sample());
        let cut = blob.len() - 3;
        assert!(matches!(
            decode_macro(&blob[..cut]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_count_above_capacity_rejected() {
        let mut writer = RecordWriter::new();
        writer.name("big").u32(MAX_EVENTS as u32 + 1).u32(1).u32(0);
        assert!(matches!(
            decode_macro(&writer.finish()),
            Err(DecodeError::CountTooLarge { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut writer = RecordWriter::new();
        writer.name("bad").u32(1).u32(1).u32(0);
        writer.u32(9).u16(0).u16(0).u32(0).u32(0);
        assert!(matches!(
            decode_macro(&writer.finish()),
            Err(DecodeError::BadValue { field: "event kind", .. })
        ));
    }

    #[test]
    fn test_unknown_button_rejected() {
        let mut writer = RecordWriter::new();
        writer.name("bad").u32(1).u32(1).u32(0);
        writer.u32(0).u16(0).u16(0).u32(77).u32(0);
        assert!(matches!(
            decode_macro(&writer.finish()),
            Err(DecodeError::BadValue { field: "button", .. })
        ));
    }

    #[test]
    fn test_negative_axis_value_survives() -> Result<(), DecodeError> {
        let def = Macro::new(
            1,
            "axis".into(),
            vec![MacroEvent::axis(7, PadAxis::RightY, -32768)],
            7,
            true,
        );
        let record = decode_macro(&encode_macro(&def))?;
        assert_eq!(
            record.events.first().map(|e| e.kind),
            Some(MacroEventKind::AxisMotion {
                axis: PadAxis::RightY,
                value: -32768
            })
        );
        Ok(())
    }
}
