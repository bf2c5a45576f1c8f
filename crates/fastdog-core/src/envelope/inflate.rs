//! Inflate backends.
//!
//! Two interchangeable zlib implementations sit behind [`InflateBackend`]. A
//! [`DecoderContext`](super::DecoderContext) picks one when it is built and
//! keeps it for its whole life; calls never branch between them.

use std::io::Read;

use flate2::read::ZlibDecoder;
use flate2::{Decompress, FlushDecompress, Status};
use serde::Deserialize;

use crate::error::{EnvelopeError, Result};

/// Growth step once the declared size turns out to be too small.
const GROW_STEP: usize = 16 * 1024;

/// A zlib (RFC 1950) inflater.
pub trait InflateBackend: Send + Sync {
    /// Short name for logs and metric labels.
    fn name(&self) -> &'static str;

    /// Inflate `payload`.
    ///
    /// `size_hint` is the declared inflated length. Output beyond `limit` bytes
    /// fails with `PayloadTooLarge`. Input that ends before the zlib stream end
    /// (including the Adler-32 checksum) fails with `DecompressionFailed`.
    fn inflate(&self, payload: &[u8], size_hint: usize, limit: usize) -> Result<Vec<u8>>;
}

/// Backend selector, as written in config files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Streaming,
    Preallocated,
}

impl BackendKind {
    pub fn build(self) -> Box<dyn InflateBackend> {
        match self {
            BackendKind::Streaming => Box::new(StreamingInflate),
            BackendKind::Preallocated => Box::new(PreallocatedInflate),
        }
    }
}

/// `Read`-based inflater (`flate2::read::ZlibDecoder`).
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamingInflate;

impl InflateBackend for StreamingInflate {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn inflate(&self, payload: &[u8], size_hint: usize, limit: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(size_hint.min(limit));
        // One byte past the limit is enough to tell "too large" from "exact".
        let mut reader = ZlibDecoder::new(payload).take((limit as u64).saturating_add(1));
        reader
            .read_to_end(&mut out)
            .map_err(|e| EnvelopeError::DecompressionFailed(e.to_string()))?;

        if out.len() > limit {
            return Err(EnvelopeError::PayloadTooLarge { limit });
        }
        Ok(out)
    }
}

/// One-shot inflater (`flate2::Decompress`) writing into a buffer sized from
/// the declared length. Correct envelopes finish in a single call.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreallocatedInflate;

impl InflateBackend for PreallocatedInflate {
    fn name(&self) -> &'static str {
        "preallocated"
    }

    fn inflate(&self, payload: &[u8], size_hint: usize, limit: usize) -> Result<Vec<u8>> {
        let mut inflater = Decompress::new(true);
        let mut out = Vec::with_capacity(size_hint.min(limit).max(1));

        loop {
            if out.len() == out.capacity() {
                if out.len() > limit {
                    return Err(EnvelopeError::PayloadTooLarge { limit });
                }
                out.reserve(GROW_STEP.min(limit.saturating_add(1) - out.len()));
            }

            let consumed = inflater.total_in() as usize;
            let produced = inflater.total_out();
            let input = payload.get(consumed..).unwrap_or_default();

            let status = inflater
                .decompress_vec(input, &mut out, FlushDecompress::Finish)
                .map_err(|e| EnvelopeError::DecompressionFailed(e.to_string()))?;

            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    let stalled = inflater.total_in() as usize == consumed
                        && inflater.total_out() == produced;
                    // No progress with room to write: the input ended before the
                    // stream end marker (cut payload or missing checksum).
                    if stalled && out.len() < out.capacity() {
                        return Err(EnvelopeError::DecompressionFailed(
                            "incomplete zlib stream".to_string(),
                        ));
                    }
                }
            }
        }

        if out.len() > limit {
            return Err(EnvelopeError::PayloadTooLarge { limit });
        }
        Ok(out)
    }
}
