//! Chunked reassembly of one envelope.
//!
//! Transports that deliver an envelope in pieces push each chunk here. The
//! header is checked as soon as its 16 bytes arrive, so a wrong magic or
//! version fails before the payload is downloaded. Once the declared length
//! is buffered the envelope goes through the owning [`DecoderContext`].

use bytes::BytesMut;

use super::decode::{Decoded, DecoderContext};
use super::format::{read_prefix, HEADER_LEN, MIN_ENVELOPE_LEN};
use crate::error::Result;

/// Outcome of one [`StreamDecoder::push`].
#[derive(Debug)]
pub enum StreamStatus {
    /// More bytes are needed.
    Pending {
        /// 0.0 until the header is known, then buffered / expected.
        progress: f32,
        received: u64,
        chunks: u32,
    },
    /// The envelope is complete and decoded. The decoder has reset itself.
    Complete(Decoded),
}

pub struct StreamDecoder<'a> {
    ctx: &'a DecoderContext,
    buf: BytesMut,
    expected: Option<usize>,
    received: u64,
    chunks: u32,
}

impl<'a> StreamDecoder<'a> {
    pub fn new(ctx: &'a DecoderContext) -> Self {
        Self {
            ctx,
            buf: BytesMut::new(),
            expected: None,
            received: 0,
            chunks: 0,
        }
    }

    /// Append a chunk.
    ///
    /// Errors are the one-shot decoder's error kinds. Any error leaves the
    /// decoder empty, ready for the next envelope. Bytes past the end of a
    /// completed envelope are discarded.
    pub fn push(&mut self, chunk: &[u8]) -> Result<StreamStatus> {
        self.buf.extend_from_slice(chunk);
        self.received += chunk.len() as u64;
        self.chunks += 1;

        if self.expected.is_none() && self.buf.len() >= HEADER_LEN {
            let mut prefix: &[u8] = &self.buf;
            let (version, compressed_len) = match read_prefix(&mut prefix) {
                Ok(fields) => fields,
                Err(e) => {
                    self.reset();
                    return Err(e);
                }
            };
            let expected = MIN_ENVELOPE_LEN + compressed_len as usize;
            tracing::debug!(version, expected, "stream header parsed");
            self.expected = Some(expected);
        }

        match self.expected {
            Some(expected) if self.buf.len() >= expected => {
                let envelope = self.buf.split_to(expected).freeze();
                self.reset();
                let decoded = self.ctx.decode(&envelope);
                decoded.map(StreamStatus::Complete)
            }
            _ => Ok(StreamStatus::Pending {
                progress: self.progress(),
                received: self.received,
                chunks: self.chunks,
            }),
        }
    }

    /// Signal end of input. An incomplete envelope yields the error the
    /// one-shot decoder gives for the buffered bytes.
    pub fn finish(&mut self) -> Result<Decoded> {
        let decoded = self.ctx.decode(&self.buf);
        self.reset();
        decoded
    }

    pub fn progress(&self) -> f32 {
        match self.expected {
            Some(expected) if expected > 0 => (self.buf.len() as f32 / expected as f32).min(1.0),
            _ => 0.0,
        }
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn expected_size(&self) -> Option<usize> {
        self.expected
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.expected = None;
        self.received = 0;
        self.chunks = 0;
    }
}
