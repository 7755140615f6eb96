//! Re-encoding of decoded messages.
//!
//! Writes a [`Message`] back to wire format with minimal encodings. Varints
//! that arrived padded come back shorter, so only the tag and wire type
//! sequence survives a round trip byte-for-byte in general.

use crate::decode::{Field, FieldValue, Message};
use crate::wire::WireType;
use bytes::BufMut;
use prost::encoding::{encode_key, encode_varint, WireType as ProstWireType};

/// Encode a message into a new buffer
pub fn encode_message(message: &Message) -> Vec<u8> {
    let mut buf = Vec::new();
    write_message(message, &mut buf);
    buf
}

/// Append the encoding of a message to `buf`
pub fn write_message(message: &Message, buf: &mut impl BufMut) {
    for field in message {
        write_field(field, buf);
    }
}

fn write_field(field: &Field, buf: &mut impl BufMut) {
    match &field.value {
        FieldValue::Candidates(_) | FieldValue::Unsigned32(_) | FieldValue::Unsigned64(_) => {
            let raw = field.value.raw_scalar().unwrap_or_default();
            match field.wire_type {
                WireType::Fixed32 => {
                    encode_key(field.tag, ProstWireType::ThirtyTwoBit, buf);
                    buf.put_u32_le(raw as u32);
                }
                WireType::Fixed64 => {
                    encode_key(field.tag, ProstWireType::SixtyFourBit, buf);
                    buf.put_u64_le(raw);
                }
                _ => {
                    encode_key(field.tag, ProstWireType::Varint, buf);
                    encode_varint(raw, buf);
                }
            }
        }
        FieldValue::Text(text) => write_len_delimited(field.tag, text.as_bytes(), buf),
        FieldValue::Blob(blob) => write_len_delimited(field.tag, blob, buf),
        FieldValue::Message(nested) => {
            let payload = encode_message(nested);
            write_len_delimited(field.tag, &payload, buf);
        }
    }
}

fn write_len_delimited(tag: u32, payload: &[u8], buf: &mut impl BufMut) {
    encode_key(tag, ProstWireType::LengthDelimited, buf);
    encode_varint(payload.len() as u64, buf);
    buf.put_slice(payload);
}
