//! Candidate readings for scalar wire values.
//!
//! The wire format alone cannot tell `int32` from `uint64`, `sint64`, `bool`
//! or `enum`, nor `fixed32` from `float`. Each raw value is therefore offered
//! under every scalar type that shares its wire type, in a fixed order.

use std::fmt;

/// One typed reading of a raw scalar value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Varint as `uint64`
    Uint64(u64),
    /// Varint truncated to `uint32`
    Uint32(u32),
    /// Varint bits as `int64`
    Int64(i64),
    /// Varint truncated to `int32`
    Int32(i32),
    /// Zig-zag decoded `sint64`
    Sint64(i64),
    /// Zig-zag decoded `sint32`
    Sint32(i32),
    /// Varint 0 or 1 as `bool`
    Bool(bool),
    /// Varint as an enum ordinal
    Enum(u64),
    /// I32 as `fixed32`
    Fixed32(u32),
    /// I32 bits as `float`
    Float(f32),
    /// I32 bits as `sfixed32`
    Sfixed32(i32),
    /// I64 as `fixed64`
    Fixed64(u64),
    /// I64 bits as `double`
    Double(f64),
    /// I64 bits as `sfixed64`
    Sfixed64(i64),
}

impl Reading {
    /// Protobuf scalar type name for this reading
    pub const fn label(&self) -> &'static str {
        match self {
            Reading::Uint64(_) => "uint64",
            Reading::Uint32(_) => "uint32",
            Reading::Int64(_) => "int64",
            Reading::Int32(_) => "int32",
            Reading::Sint64(_) => "sint64",
            Reading::Sint32(_) => "sint32",
            Reading::Bool(_) => "bool",
            Reading::Enum(_) => "enum",
            Reading::Fixed32(_) => "fixed32",
            Reading::Float(_) => "float",
            Reading::Sfixed32(_) => "sfixed32",
            Reading::Fixed64(_) => "fixed64",
            Reading::Double(_) => "double",
            Reading::Sfixed64(_) => "sfixed64",
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: ", self.label())?;
        match self {
            Reading::Uint64(v) | Reading::Enum(v) | Reading::Fixed64(v) => write!(f, "{}", v),
            Reading::Uint32(v) | Reading::Fixed32(v) => write!(f, "{}", v),
            Reading::Int64(v) | Reading::Sint64(v) | Reading::Sfixed64(v) => write!(f, "{}", v),
            Reading::Int32(v) | Reading::Sint32(v) | Reading::Sfixed32(v) => write!(f, "{}", v),
            Reading::Bool(v) => write!(f, "{}", v),
            Reading::Float(v) => write!(f, "{}", v),
            Reading::Double(v) => write!(f, "{}", v),
        }
    }
}

/// A raw scalar together with its candidate readings
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates {
    /// The raw value as read from the wire (fixed32 values are zero-extended)
    pub raw: u64,
    /// Readings in presentation order
    pub readings: Vec<Reading>,
}

impl Candidates {
    /// Returns the first reading with the given label
    pub fn get(&self, label: &str) -> Option<&Reading> {
        self.readings.iter().find(|r| r.label() == label)
    }
}

/// Decode a zig-zag encoded 64-bit value
pub const fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Decode a zig-zag encoded 32-bit value
pub const fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Readings for a varint: uint64, uint32, int64, int32, sint64, sint32,
/// bool (only for 0 and 1), enum
pub fn interpret_varint(v: u64) -> Candidates {
    let mut readings = Vec::with_capacity(8);

    readings.push(Reading::Uint64(v));
    readings.push(Reading::Uint32(v as u32));
    readings.push(Reading::Int64(v as i64));
    readings.push(Reading::Int32(v as i32));
    readings.push(Reading::Sint64(zigzag_decode64(v)));
    readings.push(Reading::Sint32(zigzag_decode32(v as u32)));

    match v {
        0 => readings.push(Reading::Bool(false)),
        1 => readings.push(Reading::Bool(true)),
        _ => {}
    }

    readings.push(Reading::Enum(v));

    Candidates { raw: v, readings }
}

/// Readings for a 32-bit fixed value: fixed32, float, sfixed32
pub fn interpret_fixed32(v: u32) -> Candidates {
    Candidates {
        raw: u64::from(v),
        readings: vec![
            Reading::Fixed32(v),
            Reading::Float(f32::from_bits(v)),
            Reading::Sfixed32(v as i32),
        ],
    }
}

/// Readings for a 64-bit fixed value: fixed64, double, sfixed64
pub fn interpret_fixed64(v: u64) -> Candidates {
    Candidates {
        raw: v,
        readings: vec![
            Reading::Fixed64(v),
            Reading::Double(f64::from_bits(v)),
            Reading::Sfixed64(v as i64),
        ],
    }
}
