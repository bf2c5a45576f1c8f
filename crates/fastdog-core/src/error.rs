//! Envelope error taxonomy.

use thiserror::Error;

/// Stable error codes surfaced to callers (HTTP bodies, logs, metrics labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FormatTooShort,
    BadMagic,
    UnsupportedVersion,
    TruncatedPayload,
    PayloadTooLarge,
    DecompressionFailed,
    LengthMismatch,
    InvalidPayload,
    EncodeFailed,
}

impl ErrorCode {
    /// String representation used in JSON responses and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::FormatTooShort => "FORMAT_TOO_SHORT",
            ErrorCode::BadMagic => "BAD_MAGIC",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::TruncatedPayload => "TRUNCATED_PAYLOAD",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::DecompressionFailed => "DECOMPRESSION_FAILED",
            ErrorCode::LengthMismatch => "LENGTH_MISMATCH",
            ErrorCode::InvalidPayload => "INVALID_PAYLOAD",
            ErrorCode::EncodeFailed => "ENCODE_FAILED",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Every way an envelope can fail to decode or encode.
///
/// Decode failures are terminal: the input buffer is immutable, so a retry
/// would reproduce the same diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("envelope too short: {len} bytes, need at least {min}")]
    FormatTooShort { len: usize, min: usize },
    #[error("bad magic: found {:?}", String::from_utf8_lossy(.found))]
    BadMagic { found: [u8; 8] },
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u32),
    #[error("truncated payload: header declares {declared} compressed bytes, {available} available")]
    TruncatedPayload { declared: u32, available: usize },
    #[error("payload too large: exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),
    #[error("length mismatch: expected {expected} bytes, inflated {actual}")]
    LengthMismatch { expected: u32, actual: usize },
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

impl EnvelopeError {
    /// Map to the stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            EnvelopeError::FormatTooShort { .. } => ErrorCode::FormatTooShort,
            EnvelopeError::BadMagic { .. } => ErrorCode::BadMagic,
            EnvelopeError::UnsupportedVersion(_) => ErrorCode::UnsupportedVersion,
            EnvelopeError::TruncatedPayload { .. } => ErrorCode::TruncatedPayload,
            EnvelopeError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            EnvelopeError::DecompressionFailed(_) => ErrorCode::DecompressionFailed,
            EnvelopeError::LengthMismatch { .. } => ErrorCode::LengthMismatch,
            EnvelopeError::InvalidPayload(_) => ErrorCode::InvalidPayload,
            EnvelopeError::Encode(_) => ErrorCode::EncodeFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_magic_message_shows_found_tag() {
        let e = EnvelopeError::BadMagic { found: *b"FASTDOG2" };
        assert!(e.to_string().contains("FASTDOG2"));
        assert_eq!(e.code().as_str(), "BAD_MAGIC");
    }
}
