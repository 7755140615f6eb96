//! Human-readable rendering of decoded messages.
//!
//! [`TextRenderer`] serializes a [`Message`] tree into indented text, one
//! line per field header. It makes no decisions of its own: every value is
//! printed according to the classification the decoder already made.
//!
//! ```
//! use wirepeek_core::{decode, TextRenderer};
//!
//! let message = decode(&[0x12, 0x03, b'h', b'e', b'y'])?;
//! let text = TextRenderer::new().render(&message);
//! assert_eq!(text, "Tag 2 (Bytes): string: \"hey\"\n");
//! # Ok::<(), wirepeek_core::Error>(())
//! ```
//!
//! The [`FieldVisitor`] trait offers a structured walk for other outputs.

mod visitor;

use crate::decode::{FieldValue, Message};
use std::fmt::Write as FmtWrite;

pub use visitor::{walk, FieldVisitor, NullVisitor, StatsVisitor};

/// Configuration for text rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Indentation string (default: 2 spaces)
    pub indent_str: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_str: "  ".to_string(),
        }
    }
}

impl RenderConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }
}

/// Renders decoded messages as an indented tree
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    config: RenderConfig,
}

impl TextRenderer {
    /// Creates a renderer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer with custom config
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Render the message as a string
    pub fn render(&self, message: &Message) -> String {
        let mut output = String::new();
        self.write_to(message, &mut output)
            .expect("String write cannot fail");
        output
    }

    /// Write the rendered message to a writer
    pub fn write_to(&self, message: &Message, w: &mut impl FmtWrite) -> std::fmt::Result {
        let mut writer = TreeWriter {
            writer: w,
            config: &self.config,
            indent_level: 0,
        };
        writer.write_message(message)
    }
}

struct TreeWriter<'a, W: FmtWrite> {
    writer: &'a mut W,
    config: &'a RenderConfig,
    indent_level: usize,
}

impl<W: FmtWrite> TreeWriter<'_, W> {
    fn write_indent(&mut self) -> std::fmt::Result {
        for _ in 0..self.indent_level {
            self.writer.write_str(&self.config.indent_str)?;
        }
        Ok(())
    }

    fn write_message(&mut self, message: &Message) -> std::fmt::Result {
        for field in message {
            self.write_indent()?;
            write!(self.writer, "Tag {} ({}): ", field.tag, field.wire_type)?;
            self.write_value(&field.value)?;
        }
        Ok(())
    }

    fn write_value(&mut self, value: &FieldValue) -> std::fmt::Result {
        match value {
            FieldValue::Candidates(candidates) => {
                writeln!(self.writer, "{{")?;
                self.indent_level += 1;
                self.write_indent()?;
                for (i, reading) in candidates.readings.iter().enumerate() {
                    if i > 0 {
                        self.writer.write_str(", ")?;
                    }
                    write!(self.writer, "{}", reading)?;
                }
                writeln!(self.writer)?;
                self.indent_level -= 1;
                self.write_indent()?;
                writeln!(self.writer, "}}")
            }
            FieldValue::Unsigned32(v) => writeln!(self.writer, "uint32: {} ({:#x})", v, v),
            FieldValue::Unsigned64(v) => writeln!(self.writer, "uint64: {} ({:#x})", v, v),
            FieldValue::Text(s) => writeln!(self.writer, "string: {:?}", s),
            FieldValue::Blob(b) => writeln!(self.writer, "bytes: {} (raw bytes)", hex::encode(b)),
            FieldValue::Message(nested) => {
                writeln!(self.writer, "Message {{")?;
                self.indent_level += 1;
                self.write_message(nested)?;
                self.indent_level -= 1;
                self.write_indent()?;
                writeln!(self.writer, "}}")
            }
        }
    }
}
