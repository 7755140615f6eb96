//! Structured traversal of decoded messages.
//!
//! This module provides the [`FieldVisitor`] trait for consuming a decoded
//! tree without going through the text renderer.

use crate::decode::{Candidates, Field, FieldValue, Message};
use std::fmt::Result;

/// Trait for visiting the fields of a decoded message.
///
/// Every hook has a no-op default, so implementors only override what they
/// need. [`walk`] calls the hooks in wire order, depth first.
///
/// # Example
///
/// ```
/// use wirepeek_core::render::{walk, FieldVisitor};
/// use wirepeek_core::decode::Field;
///
/// #[derive(Default)]
/// struct TagCollector(Vec<u32>);
///
/// impl FieldVisitor for TagCollector {
///     fn visit_field(&mut self, field: &Field, _depth: usize) -> std::fmt::Result {
///         self.0.push(field.tag);
///         Ok(())
///     }
/// }
///
/// let message = wirepeek_core::decode(&[0x08, 0x01, 0x10, 0x02])?;
/// let mut tags = TagCollector::default();
/// walk(&message, &mut tags).unwrap();
/// assert_eq!(tags.0, [1, 2]);
/// # Ok::<(), wirepeek_core::Error>(())
/// ```
pub trait FieldVisitor {
    /// Called for every field before its value
    fn visit_field(&mut self, field: &Field, depth: usize) -> Result {
        let _ = (field, depth);
        Ok(())
    }

    /// Called for scalar values with candidate readings
    fn visit_candidates(&mut self, candidates: &Candidates) -> Result {
        let _ = candidates;
        Ok(())
    }

    /// Called for uninterpreted scalar values
    fn visit_unsigned(&mut self, value: u64) -> Result {
        let _ = value;
        Ok(())
    }

    /// Called for payloads classified as text
    fn visit_text(&mut self, text: &str) -> Result {
        let _ = text;
        Ok(())
    }

    /// Called for payloads classified as raw bytes
    fn visit_blob(&mut self, blob: &[u8]) -> Result {
        let _ = blob;
        Ok(())
    }

    /// Called before the fields of a nested message
    fn enter_message(&mut self, message: &Message, depth: usize) -> Result {
        let _ = (message, depth);
        Ok(())
    }

    /// Called after the fields of a nested message
    fn leave_message(&mut self, message: &Message, depth: usize) -> Result {
        let _ = (message, depth);
        Ok(())
    }
}

/// Walk every field of `message`, depth first
pub fn walk(message: &Message, visitor: &mut impl FieldVisitor) -> Result {
    walk_at(message, visitor, 0)
}

fn walk_at(message: &Message, visitor: &mut impl FieldVisitor, depth: usize) -> Result {
    for field in message {
        visitor.visit_field(field, depth)?;
        match &field.value {
            FieldValue::Candidates(c) => visitor.visit_candidates(c)?,
            FieldValue::Unsigned32(v) => visitor.visit_unsigned(u64::from(*v))?,
            FieldValue::Unsigned64(v) => visitor.visit_unsigned(*v)?,
            FieldValue::Text(s) => visitor.visit_text(s)?,
            FieldValue::Blob(b) => visitor.visit_blob(b)?,
            FieldValue::Message(nested) => {
                visitor.enter_message(nested, depth + 1)?;
                walk_at(nested, visitor, depth + 1)?;
                visitor.leave_message(nested, depth + 1)?;
            }
        }
    }
    Ok(())
}

/// A visitor that ignores everything
pub struct NullVisitor;

impl FieldVisitor for NullVisitor {}

/// A visitor that collects statistics about a decoded tree
#[derive(Debug, Default)]
pub struct StatsVisitor {
    /// Number of fields at every depth
    pub field_count: usize,
    /// Number of nested messages
    pub message_count: usize,
    /// Number of scalar fields
    pub scalar_count: usize,
    /// Number of text payloads
    pub text_count: usize,
    /// Number of raw byte payloads
    pub blob_count: usize,
    /// Deepest nesting level reached
    pub max_depth: usize,
}

impl FieldVisitor for StatsVisitor {
    fn visit_field(&mut self, _field: &Field, _depth: usize) -> Result {
        self.field_count += 1;
        Ok(())
    }

    fn visit_candidates(&mut self, _candidates: &Candidates) -> Result {
        self.scalar_count += 1;
        Ok(())
    }

    fn visit_unsigned(&mut self, _value: u64) -> Result {
        self.scalar_count += 1;
        Ok(())
    }

    fn visit_text(&mut self, _text: &str) -> Result {
        self.text_count += 1;
        Ok(())
    }

    fn visit_blob(&mut self, _blob: &[u8]) -> Result {
        self.blob_count += 1;
        Ok(())
    }

    fn enter_message(&mut self, _message: &Message, depth: usize) -> Result {
        self.message_count += 1;
        self.max_depth = self.max_depth.max(depth);
        Ok(())
    }
}
