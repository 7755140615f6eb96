//! Low-level protobuf wire format reading.
//!
//! This module extracts wire format atoms from a byte slice without
//! interpreting them. Every operation is bounds-checked and reports how many
//! bytes it consumed.
//!
//! ## Wire Format Overview
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing the field number and wire type
//! - The field data (format depends on wire type)
//!
//! Wire types:
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: I64 (fixed64, sfixed64, double)
//! - 2: LEN (string, bytes, embedded messages, packed repeated fields)
//! - 3/4: group start/end (deprecated, not decoded)
//! - 5: I32 (fixed32, sfixed32, float)
//!
//! The free functions operate on a slice and report error offsets relative
//! to that slice. [`ByteCursor`] wraps them with a read position.

pub mod writer;

use crate::error::{Error, Result};
use crate::MAX_FIELD_NUMBER;
use std::fmt;

/// Varints are at most 10 bytes for a 64-bit value
pub const MAX_VARINT_LEN: usize = 10;

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    Fixed64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    Bytes = 2,
    /// Start group (deprecated)
    StartGroup = 3,
    /// End group (deprecated)
    EndGroup = 4,
    /// 32-bit fixed-width
    Fixed32 = 5,
}

impl WireType {
    /// Maps the low three bits of a tag to a wire type
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::Bytes),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    /// Returns the raw wire type bits
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Returns the display name used in rendered output
    pub const fn name(self) -> &'static str {
        match self {
            WireType::Varint => "Varint",
            WireType::Fixed64 => "Fixed64",
            WireType::Bytes => "Bytes",
            WireType::StartGroup => "StartGroup",
            WireType::EndGroup => "EndGroup",
            WireType::Fixed32 => "Fixed32",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_bits(value).ok_or(Error::unsupported_wire_type(value, 0))
    }
}

/// A decoded field key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// Field number (1 to 2^29 - 1)
    pub field_number: u32,
    /// Wire type of the value that follows
    pub wire_type: WireType,
}

/// Decode a varint from the given bytes.
///
/// Returns the decoded value and the number of bytes consumed. A tenth byte
/// carrying more than the single remaining bit of a `u64` is rejected as
/// overflow.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut result: u64 = 0;

    for (i, &byte) in data.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(Error::truncated_varint(0));
        }
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(Error::truncated_varint(0));
        }

        result |= u64::from(byte & 0x7F) << (7 * i);

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(Error::truncated_varint(0))
}

/// Consume a field tag.
///
/// Fails with [`Error::MalformedTag`] when the tag varint is unreadable or
/// the field number is out of range, and with
/// [`Error::UnsupportedWireType`] when the low bits are 6 or 7.
pub fn consume_tag(data: &[u8]) -> Result<(Tag, usize)> {
    if data.is_empty() {
        return Err(Error::malformed_tag(0));
    }

    let (key, len) = decode_varint(data).map_err(|_| Error::malformed_tag(0))?;

    let field_number = key >> 3;
    if field_number == 0 || field_number > u64::from(MAX_FIELD_NUMBER) {
        return Err(Error::malformed_tag(0));
    }

    let bits = (key & 0x07) as u8;
    let wire_type = WireType::from_bits(bits).ok_or(Error::unsupported_wire_type(bits, 0))?;

    Ok((
        Tag {
            field_number: field_number as u32,
            wire_type,
        },
        len,
    ))
}

/// Consume a varint value
pub fn consume_varint(data: &[u8]) -> Result<(u64, usize)> {
    decode_varint(data)
}

/// Consume a little-endian 32-bit value
pub fn consume_fixed32(data: &[u8]) -> Result<(u32, usize)> {
    let bytes = fixed_bytes::<4>(data, 32)?;
    Ok((u32::from_le_bytes(bytes), 4))
}

/// Consume a little-endian 64-bit value
pub fn consume_fixed64(data: &[u8]) -> Result<(u64, usize)> {
    let bytes = fixed_bytes::<8>(data, 64)?;
    Ok((u64::from_le_bytes(bytes), 8))
}

fn fixed_bytes<const N: usize>(data: &[u8], width: u8) -> Result<[u8; N]> {
    data.get(..N)
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or(Error::TruncatedFixed {
            offset: 0,
            width,
            needed: N,
            available: data.len(),
        })
}

/// Consume a length-prefixed byte run.
///
/// Returns the payload and the total bytes consumed including the prefix.
pub fn consume_bytes(data: &[u8]) -> Result<(&[u8], usize)> {
    let (length, prefix_len) = decode_varint(data).map_err(|_| Error::TruncatedBytes {
        offset: 0,
        declared: 0,
        available: data.len(),
    })?;

    let available = data.len() - prefix_len;
    if length > available as u64 {
        return Err(Error::TruncatedBytes {
            offset: 0,
            declared: length,
            available,
        });
    }

    let end = prefix_len + length as usize;
    Ok((&data[prefix_len..end], end))
}

/// A read position over an immutable byte buffer.
///
/// The cursor only moves forward. A failed read leaves the position where it
/// was and reports an offset relative to the start of the buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current read position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns true once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Consume a field tag
    pub fn consume_tag(&mut self) -> Result<Tag> {
        self.step(consume_tag)
    }

    /// Consume a varint value
    pub fn consume_varint(&mut self) -> Result<u64> {
        self.step(consume_varint)
    }

    /// Consume a little-endian 32-bit value
    pub fn consume_fixed32(&mut self) -> Result<u32> {
        self.step(consume_fixed32)
    }

    /// Consume a little-endian 64-bit value
    pub fn consume_fixed64(&mut self) -> Result<u64> {
        self.step(consume_fixed64)
    }

    /// Consume a length-prefixed byte run
    pub fn consume_bytes(&mut self) -> Result<&'a [u8]> {
        self.step(consume_bytes)
    }

    fn step<T>(&mut self, read: impl FnOnce(&'a [u8]) -> Result<(T, usize)>) -> Result<T> {
        let start = self.pos;
        let (value, len) = read(&self.buf[start..]).map_err(|e| e.rebased(start))?;
        self.pos += len;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_varint_single_byte() {
        let data = [0x08];
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, 8);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        let (value, len) = decode_varint(&[0x96, 0x01]).unwrap();
        assert_eq!(value, 150);
        assert_eq!(len, 2);

        let (value, len) = decode_varint(&[0xAC, 0x02, 0xFF]).unwrap();
        assert_eq!(value, 300);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_decode_varint_max() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let (value, len) = decode_varint(&data).unwrap();
        assert_eq!(value, u64::MAX);
        assert_eq!(len, 10);
    }

    #[test]
    fn test_decode_varint_overflow() {
        // Tenth byte sets bits beyond 64
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert!(matches!(
            decode_varint(&data),
            Err(Error::TruncatedVarint { offset: 0 })
        ));

        // Eleven bytes
        let data = [0x80; 11];
        assert!(matches!(
            decode_varint(&data),
            Err(Error::TruncatedVarint { .. })
        ));
    }

    #[test]
    fn test_decode_varint_truncated() {
        assert!(matches!(
            decode_varint(&[0x96]),
            Err(Error::TruncatedVarint { .. })
        ));
        assert!(matches!(decode_varint(&[]), Err(Error::TruncatedVarint { .. })));
    }

    #[test]
    fn test_decode_varint_matches_prost() {
        for value in [0u64, 1, 127, 128, 150, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            prost::encoding::encode_varint(value, &mut buf);
            let (decoded, len) = decode_varint(&buf).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(len, buf.len());
        }
    }

    #[test]
    fn test_wire_type_conversion() {
        assert_eq!(WireType::try_from(0).unwrap(), WireType::Varint);
        assert_eq!(WireType::try_from(1).unwrap(), WireType::Fixed64);
        assert_eq!(WireType::try_from(2).unwrap(), WireType::Bytes);
        assert_eq!(WireType::try_from(5).unwrap(), WireType::Fixed32);
        assert!(WireType::try_from(6).is_err());
        assert_eq!(WireType::Fixed32.name(), "Fixed32");
        assert_eq!(WireType::StartGroup.to_string(), "StartGroup");
    }

    #[test]
    fn test_consume_tag() {
        // Field 1, wire type 0
        let (tag, len) = consume_tag(&[0x08, 0x96, 0x01]).unwrap();
        assert_eq!(tag.field_number, 1);
        assert_eq!(tag.wire_type, WireType::Varint);
        assert_eq!(len, 1);

        // Field 16 needs a two byte key
        let (tag, len) = consume_tag(&[0x82, 0x01]).unwrap();
        assert_eq!(tag.field_number, 16);
        assert_eq!(tag.wire_type, WireType::Bytes);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_consume_tag_failures() {
        assert!(matches!(consume_tag(&[]), Err(Error::MalformedTag { offset: 0 })));
        assert!(matches!(consume_tag(&[0x88]), Err(Error::MalformedTag { .. })));
        // Field 0 is invalid
        assert!(matches!(consume_tag(&[0x00, 0x01]), Err(Error::MalformedTag { .. })));
        // Field 1, wire types 6 and 7
        assert!(matches!(
            consume_tag(&[0x0E]),
            Err(Error::UnsupportedWireType { wire_type: 6, offset: 0 })
        ));
        assert!(matches!(
            consume_tag(&[0x0F]),
            Err(Error::UnsupportedWireType { wire_type: 7, offset: 0 })
        ));
    }

    #[test]
    fn test_consume_fixed() {
        let (value, len) = consume_fixed32(&[0x00, 0x00, 0x80, 0x3F]).unwrap();
        assert_eq!(f32::from_bits(value), 1.0);
        assert_eq!(len, 4);

        let (value, len) = consume_fixed64(&[1, 0, 0, 0, 0, 0, 0, 0, 9]).unwrap();
        assert_eq!(value, 1);
        assert_eq!(len, 8);

        assert!(matches!(
            consume_fixed32(&[0x00, 0x00, 0x80]),
            Err(Error::TruncatedFixed {
                width: 32,
                needed: 4,
                available: 3,
                ..
            })
        ));
        assert!(matches!(
            consume_fixed64(&[0; 7]),
            Err(Error::TruncatedFixed { width: 64, .. })
        ));
    }

    #[test]
    fn test_consume_bytes() {
        let data = [0x05, b'h', b'e', b'l', b'l', b'o', 0xAA];
        let (payload, len) = consume_bytes(&data).unwrap();
        assert_eq!(payload, b"hello");
        assert_eq!(len, 6);

        let (payload, len) = consume_bytes(&[0x00]).unwrap();
        assert!(payload.is_empty());
        assert_eq!(len, 1);
    }

    #[test]
    fn test_consume_bytes_truncated() {
        assert!(matches!(
            consume_bytes(&[0x05, b'h', b'i']),
            Err(Error::TruncatedBytes {
                offset: 0,
                declared: 5,
                available: 2
            })
        ));
        assert!(matches!(
            consume_bytes(&[0x80]),
            Err(Error::TruncatedBytes { declared: 0, .. })
        ));
    }

    #[test]
    fn test_cursor_advances_and_rebases_errors() {
        let data = [0x08, 0x96, 0x01, 0x0D, 0x00, 0x00];
        let mut cursor = ByteCursor::new(&data);

        let tag = cursor.consume_tag().unwrap();
        assert_eq!(tag.field_number, 1);
        assert_eq!(cursor.consume_varint().unwrap(), 150);
        assert_eq!(cursor.position(), 3);

        let tag = cursor.consume_tag().unwrap();
        assert_eq!(tag.wire_type, WireType::Fixed32);
        assert_eq!(cursor.position(), 4);

        let err = cursor.consume_fixed32().unwrap_err();
        assert_eq!(err.offset(), Some(4));
        // Failed reads leave the position untouched
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.remaining(), 2);
        assert!(!cursor.is_empty());
    }

    #[test]
    fn test_cursor_bytes_borrow_buffer() {
        let data = [0x0A, 0x02, 0x08, 0x01];
        let mut cursor = ByteCursor::new(&data);
        cursor.consume_tag().unwrap();
        let payload = cursor.consume_bytes().unwrap();
        assert_eq!(payload, &[0x08, 0x01]);
        assert!(cursor.is_empty());
    }
}
