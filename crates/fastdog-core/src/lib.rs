//! FastDog core: the envelope wire format, its decoder strategies, the encoder
//! and chunked stream reassembly.
//!
//! An envelope is a fixed 16-byte header (`FASTDOG1` magic, version, compressed
//! length), a zlib payload and a 4-byte trailer carrying the inflated length.
//! The payload is a JSON scene description. This crate carries no transport or
//! runtime dependencies so the same decoder serves the HTTP gateway, tools and
//! tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every malformed
//! buffer surfaces as exactly one [`EnvelopeError`] kind.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod envelope;
pub mod error;

/// Shared result type.
pub use error::{EnvelopeError, ErrorCode, Result};
