//! Envelope decoding: validate, inflate, verify length, parse.
//!
//! [`DecoderContext`] is the handle callers own. It carries the inflate
//! backend chosen at construction and the decode limits. Each call is a pure
//! function of its input buffer, so one context can serve any number of
//! concurrent callers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;

use super::format::{parse_header, EnvelopeHeader};
use super::inflate::{BackendKind, InflateBackend};
use crate::error::{EnvelopeError, Result};

/// Resource limits applied to every decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Upper bound on the inflated payload, declared or actual.
    pub max_decoded_bytes: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_decoded_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Everything needed to build a [`DecoderContext`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    pub backend: BackendKind,
    pub limits: DecodeLimits,
}

/// Size and timing statistics for one successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecodeStats {
    pub original_size: u32,
    pub compressed_size: u32,
    /// `compressed_size / original_size`; 0.0 for an empty payload.
    pub compression_ratio: f32,
    #[serde(rename = "decode_time_ms", serialize_with = "duration_as_millis")]
    pub decode_time: Duration,
    pub format_version: u32,
}

impl DecodeStats {
    fn new(header: &EnvelopeHeader, decode_time: Duration) -> Self {
        let compression_ratio = if header.original_len == 0 {
            0.0
        } else {
            header.compressed_len as f32 / header.original_len as f32
        };
        Self {
            original_size: header.original_len,
            compressed_size: header.compressed_len,
            compression_ratio,
            decode_time,
            format_version: header.version,
        }
    }
}

fn duration_as_millis<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// A fully parsed envelope.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub value: Value,
    pub stats: DecodeStats,
}

/// Inflated payload exposed without another copy.
///
/// The buffer is reference counted, so the view stays valid for as long as
/// the caller holds it; `into_bytes` hands it to another consumer.
#[derive(Debug, Clone)]
pub struct EnvelopeView {
    data: Bytes,
    stats: DecodeStats,
}

impl EnvelopeView {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Payload as UTF-8 text.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.data)
            .map_err(|e| EnvelopeError::InvalidPayload(format!("payload is not utf-8: {e}")))
    }

    /// Validate the payload as JSON and borrow it as a `RawValue` (lazy parsing).
    pub fn raw_json(&self) -> Result<&RawValue> {
        let text = self.as_str()?;
        serde_json::from_str(text)
            .map_err(|e| EnvelopeError::InvalidPayload(format!("payload is not json: {e}")))
    }

    /// Deserialize the payload into a caller type.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.as_str()?;
        serde_json::from_str(text)
            .map_err(|e| EnvelopeError::InvalidPayload(format!("payload is not json: {e}")))
    }
}

/// Caller-owned decoder handle.
pub struct DecoderContext {
    backend: Box<dyn InflateBackend>,
    limits: DecodeLimits,
    decodes: AtomicU64,
}

impl std::fmt::Debug for DecoderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderContext")
            .field("backend", &self.backend.name())
            .field("limits", &self.limits)
            .field("decodes", &self.decode_count())
            .finish()
    }
}

impl Default for DecoderContext {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

impl DecoderContext {
    pub fn new(opts: DecoderOptions) -> Self {
        Self::with_backend(opts.backend.build(), opts.limits)
    }

    /// Build around a caller-supplied backend.
    pub fn with_backend(backend: Box<dyn InflateBackend>, limits: DecodeLimits) -> Self {
        tracing::debug!(backend = backend.name(), max_decoded_bytes = limits.max_decoded_bytes, "decoder context ready");
        Self {
            backend,
            limits,
            decodes: AtomicU64::new(0),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Number of decode attempts made through this context.
    pub fn decode_count(&self) -> u64 {
        self.decodes.load(Ordering::Relaxed)
    }

    /// Release the context, returning its decode count.
    pub fn dispose(self) -> u64 {
        self.decode_count()
    }

    /// Decode and parse an envelope.
    pub fn decode(&self, data: &[u8]) -> Result<Decoded> {
        let started = Instant::now();
        let (header, inflated) = self.inflate_checked(data)?;

        let text = std::str::from_utf8(&inflated)
            .map_err(|e| EnvelopeError::InvalidPayload(format!("payload is not utf-8: {e}")))?;
        let value: Value = serde_json::from_str(text)
            .map_err(|e| EnvelopeError::InvalidPayload(format!("payload is not json: {e}")))?;

        Ok(Decoded {
            value,
            stats: DecodeStats::new(&header, started.elapsed()),
        })
    }

    /// Decode without parsing; the view exposes the inflated buffer directly.
    pub fn decode_view(&self, data: &[u8]) -> Result<EnvelopeView> {
        let started = Instant::now();
        let (header, inflated) = self.inflate_checked(data)?;
        Ok(EnvelopeView {
            data: Bytes::from(inflated),
            stats: DecodeStats::new(&header, started.elapsed()),
        })
    }

    /// Full decode, keeping only the statistics.
    pub fn decode_stats(&self, data: &[u8]) -> Result<DecodeStats> {
        self.decode(data).map(|d| d.stats)
    }

    fn inflate_checked(&self, data: &[u8]) -> Result<(EnvelopeHeader, Vec<u8>)> {
        self.decodes.fetch_add(1, Ordering::Relaxed);

        let (header, payload) = parse_header(data)?;
        let limit = self.limits.max_decoded_bytes;
        if header.original_len as usize > limit {
            return Err(EnvelopeError::PayloadTooLarge { limit });
        }

        let inflated = self
            .backend
            .inflate(payload, header.original_len as usize, limit)?;

        if inflated.len() != header.original_len as usize {
            return Err(EnvelopeError::LengthMismatch {
                expected: header.original_len,
                actual: inflated.len(),
            });
        }

        tracing::trace!(
            backend = self.backend.name(),
            version = header.version,
            compressed = header.compressed_len,
            original = header.original_len,
            "envelope inflated"
        );
        Ok((header, inflated))
    }
}

impl Drop for DecoderContext {
    fn drop(&mut self) {
        tracing::debug!(backend = self.backend.name(), decodes = self.decode_count(), "decoder context released");
    }
}
