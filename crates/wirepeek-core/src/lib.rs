//! # wirepeek-core
//!
//! A library for decoding Protocol Buffer wire format data without a schema.
//!
//! This crate provides the core functionality for:
//! - Reading wire format atoms (tags, varints, fixed values, length-delimited runs)
//! - Decoding a buffer into a tree of fields with every plausible scalar reading
//! - Telling nested messages, UTF-8 text and raw bytes apart heuristically
//! - Rendering the decoded tree as indented text
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`wire`]: Bounds-checked wire format reading and re-encoding
//! - [`decode`]: Message decoding and candidate readings
//! - [`render`]: Text rendering and tree traversal
//! - [`input`]: Base64/hex input and gRPC-Web frames
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use wirepeek_core::{decode, input, InputEncoding, TextRenderer};
//!
//! let bytes = input::decode_text("CJYBEgVoZWxsbw==", InputEncoding::Auto)?;
//! let message = decode(&bytes)?;
//!
//! assert_eq!(message.len(), 2);
//! assert_eq!(message.fields()[1].value.as_text(), Some("hello"));
//! println!("{}", TextRenderer::new().render(&message));
//! # Ok::<(), wirepeek_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`FieldVisitor`]: Walk a decoded tree for custom output formats
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod decode;
pub mod error;
pub mod input;
pub mod render;
pub mod wire;

// Re-export primary types for convenience
pub use decode::{decode, Decoder, DecoderConfig, Field, FieldValue, Message, Reading};
pub use error::{Error, Result};
pub use input::InputEncoding;
pub use render::{FieldVisitor, RenderConfig, StatsVisitor, TextRenderer};
pub use wire::{ByteCursor, WireType};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;
