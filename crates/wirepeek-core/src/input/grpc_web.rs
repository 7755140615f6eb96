//! gRPC-Web frame detection.
//!
//! A gRPC-Web data frame is a 1-byte flag, a 4-byte big-endian length, then
//! the message. Only uncompressed frames (flag 0) are unwrapped.

use bytes::Buf;
use tracing::{debug, trace};

/// Length of the frame header (flag + length)
pub const GRPC_WEB_HEADER_LEN: usize = 5;

/// Returns the embedded message if `data` starts with an uncompressed
/// gRPC-Web frame whose declared length fits in the buffer.
///
/// Bytes after the frame (such as a trailers frame) are ignored.
pub fn unwrap_grpc_web(data: &[u8]) -> Option<&[u8]> {
    if data.len() < GRPC_WEB_HEADER_LEN {
        return None;
    }

    let mut header = &data[..GRPC_WEB_HEADER_LEN];
    let flag = header.get_u8();
    if flag != 0 {
        trace!("Frame flag {:#04x} is not an uncompressed data frame", flag);
        return None;
    }

    let length = header.get_u32() as usize;
    let end = GRPC_WEB_HEADER_LEN.checked_add(length)?;
    let message = data.get(GRPC_WEB_HEADER_LEN..end)?;

    debug!("Recognized gRPC-Web frame carrying {} bytes", length);
    Some(message)
}

/// Like [`unwrap_grpc_web`], but returns `data` unchanged when it is not a
/// frame
pub fn strip_grpc_web(data: &[u8]) -> &[u8] {
    unwrap_grpc_web(data).unwrap_or(data)
}
