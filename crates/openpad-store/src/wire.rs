//! Fixed-layout little-endian codec helpers.
//!
//! Every persisted record follows the same scheme: a 64-byte NUL-padded name
//! buffer, 32-bit counts and flags, then a packed array of fixed-width
//! element records. The subsystem crates build their record layouts out of
//! these primitives; keeping the byte order and the name-field convention
//! here guarantees the families stay mutually compatible.

/// Fixed length of the name field at the head of every record.
pub const NAME_LEN: usize = 64;

/// Errors produced while decoding a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended before the announced content.
    #[error("record truncated: needed {needed} more bytes")]
    Truncated {
        /// How many bytes past the end the read reached for.
        needed: usize,
    },
    /// A field holds a value with no in-memory representation.
    #[error("invalid {field} value {value}")]
    BadValue {
        /// Field name.
        field: &'static str,
        /// The offending raw value.
        value: i64,
    },
    /// An element count exceeds the table's documented capacity.
    #[error("{field} count {count} exceeds capacity {capacity}")]
    CountTooLarge {
        /// Count field name.
        field: &'static str,
        /// Decoded count.
        count: usize,
        /// Documented capacity.
        capacity: usize,
    },
    /// The name field is not valid UTF-8.
    #[error("record name is not valid UTF-8")]
    BadName,
}

/// Append-only record builder.
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    /// Start an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the fixed 64-byte name field. Longer names are truncated at a
    /// character boundary; the remainder is NUL padding.
    pub fn name(&mut self, name: &str) -> &mut Self {
        let mut field = [0u8; NAME_LEN];
        let mut end = name.len().min(NAME_LEN - 1);
        while end > 0 && !name.is_char_boundary(end) {
            end -= 1;
        }
        field
            .iter_mut()
            .zip(name.as_bytes().iter().take(end))
            .for_each(|(dst, src)| *dst = *src);
        self.buf.extend_from_slice(&field);
        self
    }

    /// Append a little-endian u32.
    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a little-endian i32.
    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a little-endian u16.
    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a little-endian i16.
    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a little-endian f32.
    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append `count` zero bytes of padding.
    pub fn pad(&mut self, count: usize) -> &mut Self {
        self.buf.extend(std::iter::repeat_n(0u8, count));
        self
    }

    /// Finish and take the encoded record.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Cursor-based record reader.
#[derive(Debug)]
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Read from the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(len).ok_or(DecodeError::Truncated {
            needed: len,
        })?;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| DecodeError::Truncated {
                needed: end - self.buf.len(),
            })?;
        self.pos = end;
        Ok(slice)
    }

    /// Read the fixed 64-byte name field back into a string.
    pub fn name(&mut self) -> Result<String, DecodeError> {
        let raw = self.take(NAME_LEN)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        let text = raw.get(..end).ok_or(DecodeError::BadName)?;
        String::from_utf8(text.to_vec()).map_err(|_| DecodeError::BadName)
    }

    /// Read a little-endian u32.
    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        let raw = self.take(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(raw);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a little-endian i32.
    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        let raw = self.take(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(raw);
        Ok(i32::from_le_bytes(bytes))
    }

    /// Read a little-endian u16.
    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        let raw = self.take(2)?;
        let mut bytes = [0u8; 2];
        bytes.copy_from_slice(raw);
        Ok(u16::from_le_bytes(bytes))
    }

    /// Read a little-endian i16.
    pub fn i16(&mut self) -> Result<i16, DecodeError> {
        let raw = self.take(2)?;
        let mut bytes = [0u8; 2];
        bytes.copy_from_slice(raw);
        Ok(i16::from_le_bytes(bytes))
    }

    /// Read a little-endian f32.
    pub fn f32(&mut self) -> Result<f32, DecodeError> {
        let raw = self.take(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(raw);
        Ok(f32::from_le_bytes(bytes))
    }

    /// Skip `count` padding bytes.
    pub fn pad(&mut self, count: usize) -> Result<(), DecodeError> {
        self.take(count).map(|_| ())
    }

    /// Bytes remaining past the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }
}
