//! Envelope encoder.

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::Value;

use super::format::{check_version, MAGIC, MIN_ENVELOPE_LEN};
use crate::error::{EnvelopeError, Result};

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub version: u32,
    /// zlib level, 0 (store) to 9 (best).
    pub level: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { version: 1, level: 6 }
    }
}

/// Wrap already-serialized JSON bytes in an envelope.
pub fn encode(json: &[u8], opts: &EncodeOptions) -> Result<Bytes> {
    check_version(opts.version)?;
    if opts.level > 9 {
        return Err(EnvelopeError::Encode(format!(
            "compression level {} out of range 0..=9",
            opts.level
        )));
    }
    let original_len = u32::try_from(json.len())
        .map_err(|_| EnvelopeError::Encode(format!("payload of {} bytes exceeds u32", json.len())))?;

    let mut z = ZlibEncoder::new(Vec::with_capacity(json.len() / 2), Compression::new(opts.level));
    z.write_all(json)
        .map_err(|e| EnvelopeError::Encode(format!("deflate failed: {e}")))?;
    let compressed = z
        .finish()
        .map_err(|e| EnvelopeError::Encode(format!("deflate failed: {e}")))?;
    let compressed_len = u32::try_from(compressed.len())
        .map_err(|_| EnvelopeError::Encode("compressed payload exceeds u32".into()))?;

    let mut out = BytesMut::with_capacity(MIN_ENVELOPE_LEN + compressed.len());
    out.put_slice(MAGIC);
    out.put_u32_le(opts.version);
    out.put_u32_le(compressed_len);
    out.put_slice(&compressed);
    out.put_u32_le(original_len);

    tracing::trace!(original_len, compressed_len, level = opts.level, "envelope encoded");
    Ok(out.freeze())
}

/// Serialize `value` as compact JSON and wrap it.
pub fn encode_value(value: &Value, opts: &EncodeOptions) -> Result<Bytes> {
    let json = serde_json::to_vec(value)
        .map_err(|e| EnvelopeError::Encode(format!("json serialization failed: {e}")))?;
    encode(&json, opts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::envelope::format::parse_header;

    #[test]
    fn writes_header_payload_and_trailer() {
        let env = encode(br#"{"meshes":[]}"#, &EncodeOptions::default()).unwrap();
        assert_eq!(&env[..8], b"FASTDOG1");
        let (h, payload) = parse_header(&env).unwrap();
        assert_eq!(h.version, 1);
        assert_eq!(h.original_len, 13);
        assert_eq!(payload.len(), h.compressed_len as usize);
        assert_eq!(h.total_len(), env.len());
    }

    #[test]
    fn value_is_written_compact() {
        let v = serde_json::json!({ "a": [1, 2], "b": "x" });
        let env = encode_value(&v, &EncodeOptions::default()).unwrap();
        let (h, _) = parse_header(&env).unwrap();
        assert_eq!(h.original_len as usize, r#"{"a":[1,2],"b":"x"}"#.len());
    }

    #[test]
    fn rejects_bad_level_and_version() {
        let err = encode(b"{}", &EncodeOptions { version: 1, level: 10 }).unwrap_err();
        assert_eq!(err.code().as_str(), "ENCODE_FAILED");
        let err = encode(b"{}", &EncodeOptions { version: 3, level: 6 }).unwrap_err();
        assert_eq!(err, EnvelopeError::UnsupportedVersion(3));
    }
}
