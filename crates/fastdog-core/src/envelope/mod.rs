//! FastDog envelope: header layout, inflate backends, decoding, encoding and
//! stream reassembly.
//!
//! Layout (little-endian):
//!
//! ```text
//! offset 0    : 8 bytes  magic "FASTDOG1"
//! offset 8    : 4 bytes  u32 version
//! offset 12   : 4 bytes  u32 compressed length (N)
//! offset 16   : N bytes  zlib payload
//! offset 16+N : 4 bytes  u32 original (inflated) length
//! ```
//!
//! All parsers are panic-free: malformed buffers are reported as
//! `EnvelopeError` instead of panicking or indexing past the end.

pub mod bench;
pub mod decode;
pub mod encode;
pub mod format;
pub mod inflate;
pub mod stream;

pub use bench::BenchmarkReport;
pub use decode::{DecodeLimits, DecodeStats, Decoded, DecoderContext, DecoderOptions, EnvelopeView};
pub use encode::{encode, encode_value, EncodeOptions};
pub use format::{format_info, parse_header, validate_format, EnvelopeHeader, FormatInfo, MAGIC};
pub use inflate::{BackendKind, InflateBackend, PreallocatedInflate, StreamingInflate};
pub use stream::{StreamDecoder, StreamStatus};
