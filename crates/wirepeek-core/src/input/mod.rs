//! Input acceptance.
//!
//! Encoded messages usually arrive as text copied from logs, network
//! inspectors or HTTP bodies. This module turns that text into raw bytes and
//! optionally strips a gRPC-Web frame header.

mod grpc_web;

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::{debug, trace};

pub use grpc_web::{strip_grpc_web, unwrap_grpc_web, GRPC_WEB_HEADER_LEN};

/// How textual input is turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputEncoding {
    /// Try base64 first, then hexadecimal
    #[default]
    Auto,
    /// Standard base64 alphabet with padding
    Base64,
    /// Hexadecimal digits, either case
    Hex,
    /// Bytes are used as-is
    Raw,
}

/// Decode textual input into bytes.
///
/// Surrounding whitespace is ignored. [`InputEncoding::Raw`] returns the text
/// bytes unchanged.
pub fn decode_text(text: &str, encoding: InputEncoding) -> Result<Vec<u8>> {
    let text = text.trim();

    match encoding {
        InputEncoding::Base64 => decode_base64(text).ok_or(Error::invalid_encoding("base64")),
        InputEncoding::Hex => decode_hex(text).ok_or(Error::invalid_encoding("hex")),
        InputEncoding::Raw => Ok(text.as_bytes().to_vec()),
        InputEncoding::Auto => {
            if let Some(bytes) = decode_base64(text) {
                debug!("Input decoded as base64 ({} bytes)", bytes.len());
                return Ok(bytes);
            }
            if let Some(bytes) = decode_hex(text) {
                debug!("Input decoded as hex ({} bytes)", bytes.len());
                return Ok(bytes);
            }
            Err(Error::invalid_encoding("base64 or hex"))
        }
    }
}

/// Turn the contents of a file into message bytes.
///
/// With [`InputEncoding::Auto`], contents that are valid UTF-8 and decode as
/// base64 or hex are decoded; anything else is taken as a raw binary
/// message.
pub fn decode_file_contents(contents: &[u8], encoding: InputEncoding) -> Result<Vec<u8>> {
    match encoding {
        InputEncoding::Raw => Ok(contents.to_vec()),
        InputEncoding::Base64 | InputEncoding::Hex => {
            let text = std::str::from_utf8(contents).map_err(|_| {
                Error::invalid_encoding(match encoding {
                    InputEncoding::Base64 => "base64",
                    _ => "hex",
                })
            })?;
            decode_text(text, encoding)
        }
        InputEncoding::Auto => {
            let decoded = std::str::from_utf8(contents)
                .ok()
                .filter(|text| !text.trim().is_empty())
                .and_then(|text| decode_text(text, InputEncoding::Auto).ok());

            match decoded {
                Some(bytes) => Ok(bytes),
                None => {
                    trace!("Using {} bytes of file contents as raw input", contents.len());
                    Ok(contents.to_vec())
                }
            }
        }
    }
}

/// Read a file and decode its contents
pub fn read_input_file(path: impl AsRef<Path>, encoding: InputEncoding) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let contents = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    decode_file_contents(&contents, encoding)
}

fn decode_base64(text: &str) -> Option<Vec<u8>> {
    STANDARD.decode(text).ok()
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    hex::decode(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64() {
        assert_eq!(
            decode_text("CJYB", InputEncoding::Base64).unwrap(),
            [0x08, 0x96, 0x01]
        );
        assert!(matches!(
            decode_text("not base64!", InputEncoding::Base64),
            Err(Error::InvalidEncoding { expected: "base64" })
        ));
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(
            decode_text(" 089601\n", InputEncoding::Hex).unwrap(),
            [0x08, 0x96, 0x01]
        );
        assert_eq!(decode_text("0AFF", InputEncoding::Hex).unwrap(), [0x0A, 0xFF]);
        assert!(decode_text("0A F", InputEncoding::Hex).is_err());
    }

    #[test]
    fn test_auto_prefers_base64() {
        // "0801" is also valid base64; base64 wins in auto mode
        assert_eq!(
            decode_text("0801", InputEncoding::Auto).unwrap(),
            [0xD3, 0xCD, 0x35]
        );
        // Unpadded base64 is rejected, so hex applies
        assert_eq!(
            decode_text("089601", InputEncoding::Auto).unwrap(),
            [0x08, 0x96, 0x01]
        );
        assert_eq!(
            decode_text("0a0568656c6c6f", InputEncoding::Auto).unwrap(),
            b"\x0a\x05hello"
        );
        assert!(matches!(
            decode_text("zz!", InputEncoding::Auto),
            Err(Error::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn test_decode_file_contents() {
        let raw = [0x08, 0x96, 0x01];
        assert_eq!(decode_file_contents(&raw, InputEncoding::Auto).unwrap(), raw);
        assert_eq!(
            decode_file_contents(b"CJYB\n", InputEncoding::Auto).unwrap(),
            raw
        );
        assert_eq!(
            decode_file_contents(b"CJYB", InputEncoding::Raw).unwrap(),
            b"CJYB"
        );
        assert!(decode_file_contents(&[0xFF, 0xFE], InputEncoding::Hex).is_err());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_input_file("/nonexistent/wirepeek-input", InputEncoding::Auto).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
