//! Envelope header parsing (panic-free).
//!
//! Parsing rules:
//! - Never index (`buf[0]`): read through `Buf` after a `remaining()` check.
//! - Checks run in a fixed order so every buffer gets exactly one diagnosis:
//!   length, magic, version, payload bounds.

use bytes::Buf;
use serde::Serialize;

use crate::error::{EnvelopeError, Result};

/// Format tag at offset 0.
pub const MAGIC: &[u8; 8] = b"FASTDOG1";

/// Magic + version + compressed length.
pub const HEADER_LEN: usize = 16;

/// Original length trailer after the payload.
pub const TRAILER_LEN: usize = 4;

/// Smallest well-formed envelope (empty payload).
pub const MIN_ENVELOPE_LEN: usize = HEADER_LEN + TRAILER_LEN;

/// Versions this decoder accepts. Version 1 carries a UTF-8 JSON document.
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Parsed envelope header and trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub version: u32,
    /// Payload length in bytes as declared at offset 12.
    pub compressed_len: u32,
    /// Inflated length as declared by the trailer.
    pub original_len: u32,
}

impl EnvelopeHeader {
    /// Bytes the envelope occupies, header through trailer.
    pub fn total_len(&self) -> usize {
        MIN_ENVELOPE_LEN + self.compressed_len as usize
    }
}

pub(crate) fn check_version(version: u32) -> Result<()> {
    if SUPPORTED_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(EnvelopeError::UnsupportedVersion(version))
    }
}

/// Read magic, version and compressed length from the first 16 bytes.
///
/// Used by the stream reassembler to fail fast before the payload arrives.
pub(crate) fn read_prefix(buf: &mut &[u8]) -> Result<(u32, u32)> {
    if buf.remaining() < HEADER_LEN {
        return Err(EnvelopeError::FormatTooShort {
            len: buf.remaining(),
            min: MIN_ENVELOPE_LEN,
        });
    }

    let mut magic = [0u8; 8];
    buf.copy_to_slice(&mut magic);
    if &magic != MAGIC {
        return Err(EnvelopeError::BadMagic { found: magic });
    }

    let version = buf.get_u32_le();
    check_version(version)?;

    let compressed_len = buf.get_u32_le();
    Ok((version, compressed_len))
}

/// Validate the envelope structure and split out the compressed payload.
///
/// Bytes after the trailer are ignored.
pub fn parse_header(data: &[u8]) -> Result<(EnvelopeHeader, &[u8])> {
    if data.len() < MIN_ENVELOPE_LEN {
        return Err(EnvelopeError::FormatTooShort {
            len: data.len(),
            min: MIN_ENVELOPE_LEN,
        });
    }

    let mut buf = data;
    let (version, compressed_len) = read_prefix(&mut buf)?;

    let available = buf.remaining().saturating_sub(TRAILER_LEN);
    let truncated = EnvelopeError::TruncatedPayload {
        declared: compressed_len,
        available,
    };
    if compressed_len as usize > available {
        return Err(truncated);
    }

    let payload = buf.get(..compressed_len as usize).ok_or(truncated)?;
    buf.advance(compressed_len as usize);
    let original_len = buf.get_u32_le();

    Ok((
        EnvelopeHeader {
            version,
            compressed_len,
            original_len,
        },
        payload,
    ))
}

/// Cheap check: magic matches and the version is supported.
///
/// Does not look at the payload; a `true` here can still fail to decode.
pub fn validate_format(data: &[u8]) -> bool {
    let mut buf = data;
    if buf.remaining() < 12 {
        return false;
    }
    let mut magic = [0u8; 8];
    buf.copy_to_slice(&mut magic);
    &magic == MAGIC && check_version(buf.get_u32_le()).is_ok()
}

/// Diagnostic summary of an arbitrary buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatInfo {
    pub valid: bool,
    pub magic: String,
    pub version: u32,
    pub compressed_size: u32,
    /// Zero when the trailer is not present.
    pub original_size: u32,
    pub total_size: usize,
}

/// Describe whatever header fields can be read from `data`. Never fails.
pub fn format_info(data: &[u8]) -> FormatInfo {
    let mut buf = data;
    if buf.remaining() < MIN_ENVELOPE_LEN {
        return FormatInfo {
            valid: false,
            magic: "N/A".to_string(),
            version: 0,
            compressed_size: 0,
            original_size: 0,
            total_size: data.len(),
        };
    }

    let mut magic = [0u8; 8];
    buf.copy_to_slice(&mut magic);
    let version = buf.get_u32_le();
    let compressed_size = buf.get_u32_le();

    let original_size = if buf.remaining() >= compressed_size as usize + TRAILER_LEN {
        buf.advance(compressed_size as usize);
        buf.get_u32_le()
    } else {
        0
    };

    FormatInfo {
        valid: &magic == MAGIC && check_version(version).is_ok(),
        magic: String::from_utf8_lossy(&magic).into_owned(),
        version,
        compressed_size,
        original_size,
        total_size: data.len(),
    }
}
