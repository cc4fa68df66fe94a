//! Persisted combo pattern records.
//!
//! Layout (little-endian):
//!
//! ```text
//! name      [u8; 64]   NUL-padded
//! count     u32        number of tokens (1..=8)
//! enabled   u32        0 or 1
//! timeout   u32        milliseconds
//! tokens    i32 × (count + 1)   button codes 1..8, wildcard -1,
//!                               terminated by exactly one 0 sentinel
//! ```

use openpad_device_types::ComboToken;
use openpad_store::wire::{DecodeError, RecordReader, RecordWriter};

use crate::MAX_TOKENS;
use crate::pattern::ComboPattern;

/// Wire value terminating the token array.
const TOKEN_TERMINATOR: i32 = 0;

/// Encode a pattern into its fixed-layout record.
pub fn encode_pattern(pattern: &ComboPattern) -> Vec<u8> {
    let mut writer = RecordWriter::new();
    writer
        .name(pattern.name())
        .u32(pattern.tokens().len() as u32)
        .u32(u32::from(pattern.is_enabled()))
        .u32(pattern.timeout_ms());
    for token in pattern.tokens() {
        writer.i32(token.code());
    }
    writer.i32(TOKEN_TERMINATOR);
    writer.finish()
}

/// Decode a record back into a pattern.
///
/// # Errors
///
/// [`DecodeError`] for truncated buffers, counts above [`MAX_TOKENS`],
/// unknown token codes, or a missing terminator.
pub fn decode_pattern(blob: &[u8]) -> Result<ComboPattern, DecodeError> {
    let mut reader = RecordReader::new(blob);
    let name = reader.name()?;
    let count = reader.u32()? as usize;
    if count == 0 || count > MAX_TOKENS {
        return Err(DecodeError::CountTooLarge {
            field: "token",
            count,
            capacity: MAX_TOKENS,
        });
    }
    let enabled = reader.u32()? != 0;
    let timeout_ms = reader.u32()?;

    let mut tokens = Vec::with_capacity(count);
    for _ in 0..count {
        let code = reader.i32()?;
        let token = ComboToken::from_code(code).ok_or(DecodeError::BadValue {
            field: "combo token",
            value: i64::from(code),
        })?;
        tokens.push(token);
    }
    let terminator = reader.i32()?;
    if terminator != TOKEN_TERMINATOR {
        return Err(DecodeError::BadValue {
            field: "token terminator",
            value: i64::from(terminator),
        });
    }

    ComboPattern::rebuild(name, tokens, timeout_ms, enabled).map_err(|_| DecodeError::BadValue {
        field: "combo pattern",
        value: count as i64,
    })
}
