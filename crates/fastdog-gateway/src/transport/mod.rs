//! HTTP delivery of envelopes: byte ranges and chunked bodies.

pub mod range;

use std::convert::Infallible;

use axum::body::Body;
use bytes::Bytes;
use futures_util::stream;

pub use range::{parse_range, ByteRange};

/// Stream `data` as a body in `chunk` sized pieces. Slices share `data`'s
/// allocation.
pub fn chunked_body(data: Bytes, chunk: usize) -> Body {
    let chunk = chunk.max(1);
    let pieces: Vec<Bytes> = (0..data.len())
        .step_by(chunk)
        .map(|start| data.slice(start..(start + chunk).min(data.len())))
        .collect();
    Body::from_stream(stream::iter(pieces.into_iter().map(Ok::<_, Infallible>)))
}
