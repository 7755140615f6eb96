//! Error types for the wirepeek-core library.
//!
//! Wire format failures carry the byte offset at which they were detected.
//! Offsets are relative to the start of the slice being parsed, so an error
//! raised while probing a nested payload points into that payload and not
//! into the top-level input.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wirepeek operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all wirepeek operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Input text is neither base64 nor hexadecimal
    #[error("failed to decode input as {expected}")]
    InvalidEncoding {
        /// Encoding(s) that were attempted
        expected: &'static str,
    },

    /// Tag varint is missing, truncated, or names an invalid field number
    #[error("invalid tag at offset {offset}")]
    MalformedTag {
        /// Byte offset where the tag starts
        offset: usize,
    },

    /// Varint runs past the end of the buffer or exceeds 10 bytes
    #[error("invalid varint at offset {offset}: truncated or longer than 10 bytes")]
    TruncatedVarint {
        /// Byte offset where the varint starts
        offset: usize,
    },

    /// Not enough bytes left for a fixed-width value
    #[error("invalid fixed{width} at offset {offset}: need {needed} bytes, have {available}")]
    TruncatedFixed {
        /// Byte offset where the value starts
        offset: usize,
        /// Width of the value in bits (32 or 64)
        width: u8,
        /// Bytes required
        needed: usize,
        /// Bytes remaining
        available: usize,
    },

    /// Declared length of a length-delimited value exceeds the buffer
    #[error("invalid bytes at offset {offset}: declared length {declared}, {available} available")]
    TruncatedBytes {
        /// Byte offset where the length prefix starts
        offset: usize,
        /// Declared payload length (0 when the prefix itself was unreadable)
        declared: u64,
        /// Bytes remaining after the length prefix
        available: usize,
    },

    /// Wire type is a group marker or outside the defined range
    #[error("unsupported wire type {wire_type} at offset {offset}")]
    UnsupportedWireType {
        /// The raw wire type bits
        wire_type: u8,
        /// Byte offset of the tag carrying the wire type
        offset: usize,
    },

    /// Nested payloads go deeper than the configured limit
    #[error("nesting exceeds maximum depth of {max_depth} at offset {offset}")]
    NestingTooDeep {
        /// Configured depth limit
        max_depth: usize,
        /// Byte offset of the payload that would exceed the limit
        offset: usize,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new input encoding error
    pub fn invalid_encoding(expected: &'static str) -> Self {
        Self::InvalidEncoding { expected }
    }

    /// Creates a new malformed tag error
    pub fn malformed_tag(offset: usize) -> Self {
        Self::MalformedTag { offset }
    }

    /// Creates a new truncated varint error
    pub fn truncated_varint(offset: usize) -> Self {
        Self::TruncatedVarint { offset }
    }

    /// Creates a new unsupported wire type error
    pub fn unsupported_wire_type(wire_type: u8, offset: usize) -> Self {
        Self::UnsupportedWireType { wire_type, offset }
    }

    /// Returns the byte offset for wire format errors
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::MalformedTag { offset }
            | Self::TruncatedVarint { offset }
            | Self::TruncatedFixed { offset, .. }
            | Self::TruncatedBytes { offset, .. }
            | Self::UnsupportedWireType { offset, .. }
            | Self::NestingTooDeep { offset, .. } => Some(*offset),
            Self::FileRead { .. } | Self::InvalidEncoding { .. } => None,
        }
    }

    /// Returns a copy of this error with its offset moved forward by `base`.
    ///
    /// The free functions in [`crate::wire`] report offsets relative to the
    /// slice they were handed; the cursor rebases them onto its own buffer.
    pub(crate) fn rebased(self, base: usize) -> Self {
        match self {
            Self::MalformedTag { offset } => Self::MalformedTag {
                offset: offset + base,
            },
            Self::TruncatedVarint { offset } => Self::TruncatedVarint {
                offset: offset + base,
            },
            Self::TruncatedFixed {
                offset,
                width,
                needed,
                available,
            } => Self::TruncatedFixed {
                offset: offset + base,
                width,
                needed,
                available,
            },
            Self::TruncatedBytes {
                offset,
                declared,
                available,
            } => Self::TruncatedBytes {
                offset: offset + base,
                declared,
                available,
            },
            Self::UnsupportedWireType { wire_type, offset } => Self::UnsupportedWireType {
                wire_type,
                offset: offset + base,
            },
            Self::NestingTooDeep { max_depth, offset } => Self::NestingTooDeep {
                max_depth,
                offset: offset + base,
            },
            other => other,
        }
    }

    /// Returns true if this error describes malformed wire format data
    pub fn is_wire_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedTag { .. }
                | Self::TruncatedVarint { .. }
                | Self::TruncatedFixed { .. }
                | Self::TruncatedBytes { .. }
                | Self::UnsupportedWireType { .. }
                | Self::NestingTooDeep { .. }
        )
    }
}
