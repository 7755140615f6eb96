//! Schema-less message decoding.
//!
//! This module turns a byte slice into an ordered tree of [`Field`]s.
//!
//! ## Algorithm Overview
//!
//! 1. Read a tag (field number + wire type)
//! 2. Read the value according to its wire type
//! 3. Offer every plausible scalar reading for varint and fixed values
//! 4. For length-delimited values, speculatively parse the payload as a
//!    nested message; keep that reading only if it succeeds and consumes the
//!    whole payload, otherwise fall back to UTF-8 text, then raw bytes
//!
//! Any read failure aborts the message being parsed. The speculative probe in
//! step 4 is the only place a failure is swallowed: there it just means the
//! payload is not a message.

mod interpret;

use crate::error::{Error, Result};
use crate::wire::{ByteCursor, WireType};
use tracing::{debug, trace};

pub use interpret::{
    interpret_fixed32, interpret_fixed64, interpret_varint, zigzag_decode32, zigzag_decode64,
    Candidates, Reading,
};

/// Default limit on nested message depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Decoded value of a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Varint or fixed-width scalar with every candidate reading
    Candidates(Candidates),
    /// Fixed32 value without interpretation
    Unsigned32(u32),
    /// Varint or fixed64 value without interpretation
    Unsigned64(u64),
    /// Length-delimited payload that is valid UTF-8
    Text(String),
    /// Length-delimited payload that is neither a message nor text
    Blob(Vec<u8>),
    /// Length-delimited payload that parsed as a nested message
    Message(Message),
}

impl FieldValue {
    /// Returns the raw integer for scalar values
    pub fn raw_scalar(&self) -> Option<u64> {
        match self {
            FieldValue::Candidates(c) => Some(c.raw),
            FieldValue::Unsigned32(v) => Some(u64::from(*v)),
            FieldValue::Unsigned64(v) => Some(*v),
            FieldValue::Text(_) | FieldValue::Blob(_) | FieldValue::Message(_) => None,
        }
    }

    /// Returns the nested message, if this value was classified as one
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            FieldValue::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the text, if this value was classified as a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this value was classified as a blob
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Blob(b) => Some(b),
            _ => None,
        }
    }
}

/// One decoded tag/value pair
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field number
    pub tag: u32,
    /// Wire type the value was encoded with
    pub wire_type: WireType,
    /// Interpreted value
    pub value: FieldValue,
}

/// Ordered fields of a message, in the order they appear on the wire
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: Vec<Field>,
}

impl Message {
    /// Creates a message from already decoded fields
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Returns the fields as a slice
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the message has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the fields in wire order
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Iterates over every occurrence of the given field number
    pub fn by_tag(&self, tag: u32) -> impl Iterator<Item = &Field> + '_ {
        self.fields.iter().filter(move |f| f.tag == tag)
    }

    /// Consumes the message and returns its fields
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Configuration for the decoder
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum depth of nested message probes
    pub max_depth: usize,
    /// Expand scalar values into candidate readings
    pub interpret_scalars: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            interpret_scalars: true,
        }
    }
}

impl DecoderConfig {
    /// Creates a new decoder config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets whether scalars are expanded into candidate readings
    pub fn interpret_scalars(mut self, interpret: bool) -> Self {
        self.interpret_scalars = interpret;
        self
    }
}

/// Schema-less protobuf decoder
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a new decoder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new decoder with custom configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a complete buffer into a message.
    ///
    /// Fails on the first malformed field; no partial message is returned.
    pub fn decode(&self, data: &[u8]) -> Result<Message> {
        let (message, consumed) = self.parse_message(data, 0)?;
        debug!(
            "Decoded {} top-level field(s) from {} bytes",
            message.len(),
            consumed
        );
        Ok(message)
    }

    /// Parse `data` as a message at the given nesting depth.
    ///
    /// Returns the message and the number of bytes consumed. Error offsets
    /// are relative to `data`.
    fn parse_message(&self, data: &[u8], depth: usize) -> Result<(Message, usize)> {
        if depth > self.config.max_depth {
            return Err(Error::NestingTooDeep {
                max_depth: self.config.max_depth,
                offset: 0,
            });
        }

        let mut cursor = ByteCursor::new(data);
        let mut fields = Vec::new();

        while !cursor.is_empty() {
            let field_start = cursor.position();
            let tag = cursor.consume_tag()?;

            let value = match tag.wire_type {
                WireType::Varint => {
                    let v = cursor.consume_varint()?;
                    self.scalar(v, interpret_varint)
                }
                WireType::Fixed32 => {
                    let v = cursor.consume_fixed32()?;
                    if self.config.interpret_scalars {
                        FieldValue::Candidates(interpret_fixed32(v))
                    } else {
                        FieldValue::Unsigned32(v)
                    }
                }
                WireType::Fixed64 => {
                    let v = cursor.consume_fixed64()?;
                    self.scalar(v, interpret_fixed64)
                }
                WireType::Bytes => {
                    let payload = cursor.consume_bytes()?;
                    self.classify_bytes(payload, depth)
                }
                WireType::StartGroup | WireType::EndGroup => {
                    return Err(Error::unsupported_wire_type(
                        tag.wire_type.bits(),
                        field_start,
                    ));
                }
            };

            trace!(
                "Field {} ({}) at offset {}, depth {}",
                tag.field_number,
                tag.wire_type,
                field_start,
                depth
            );

            fields.push(Field {
                tag: tag.field_number,
                wire_type: tag.wire_type,
                value,
            });
        }

        Ok((Message::from_fields(fields), cursor.position()))
    }

    fn scalar(&self, v: u64, interpret: fn(u64) -> Candidates) -> FieldValue {
        if self.config.interpret_scalars {
            FieldValue::Candidates(interpret(v))
        } else {
            FieldValue::Unsigned64(v)
        }
    }

    /// Classify a length-delimited payload as message, text, or blob
    fn classify_bytes(&self, payload: &[u8], depth: usize) -> FieldValue {
        if let Some(message) = self.probe_message(payload, depth + 1) {
            return FieldValue::Message(message);
        }

        match std::str::from_utf8(payload) {
            Ok(text) => FieldValue::Text(text.to_owned()),
            Err(_) => FieldValue::Blob(payload.to_vec()),
        }
    }

    /// Speculatively parse a payload as a nested message.
    ///
    /// Only a parse that succeeds and consumes every byte counts. Empty and
    /// single-field payloads are accepted as messages.
    fn probe_message(&self, payload: &[u8], depth: usize) -> Option<Message> {
        match self.parse_message(payload, depth) {
            Ok((message, consumed)) if consumed == payload.len() => Some(message),
            Ok((_, consumed)) => {
                trace!(
                    "Payload of {} bytes only parsed {} bytes",
                    payload.len(),
                    consumed
                );
                None
            }
            Err(e) => {
                trace!("Payload of {} bytes is not a message: {}", payload.len(), e);
                None
            }
        }
    }
}

/// Decode a buffer with the default configuration.
///
/// This is a convenience wrapper around [`Decoder::decode`].
pub fn decode(data: &[u8]) -> Result<Message> {
    Decoder::new().decode(data)
}
