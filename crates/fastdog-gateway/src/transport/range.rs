//! Single `Range: bytes=...` header parsing.
//!
//! Multi-range requests are not supported; only the first range is honored.

use crate::error::{GatewayError, Result};

/// Inclusive byte range within a resource of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

#[allow(clippy::len_without_is_empty)]
impl ByteRange {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn content_range(&self, total: usize) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

/// Parse a `Range` header value against a resource of `len` bytes.
///
/// `Ok(None)` means serve the whole resource: the header is absent or uses a
/// unit other than bytes.
pub fn parse_range(header: Option<&str>, len: usize) -> Result<Option<ByteRange>> {
    let Some(value) = header else {
        return Ok(None);
    };
    let Some(set) = value.trim().strip_prefix("bytes=") else {
        return Ok(None);
    };
    let first = set.split(',').next().unwrap_or_default().trim();
    let unsatisfiable = || GatewayError::RangeNotSatisfiable { len };
    let malformed = || GatewayError::BadRequest(format!("malformed range: {value}"));

    let (start_s, end_s) = first.split_once('-').ok_or_else(malformed)?;
    let (start_s, end_s) = (start_s.trim(), end_s.trim());

    let range = match (start_s.is_empty(), end_s.is_empty()) {
        // bytes=-N : last N bytes
        (true, false) => {
            let n: usize = end_s.parse().map_err(|_| malformed())?;
            if n == 0 || len == 0 {
                return Err(unsatisfiable());
            }
            ByteRange {
                start: len.saturating_sub(n),
                end: len - 1,
            }
        }
        // bytes=A- or bytes=A-B
        (false, open_end) => {
            let start: usize = start_s.parse().map_err(|_| malformed())?;
            if start >= len {
                return Err(unsatisfiable());
            }
            let end = if open_end {
                len - 1
            } else {
                let end: usize = end_s.parse().map_err(|_| malformed())?;
                if end < start {
                    return Err(malformed());
                }
                end.min(len - 1)
            };
            ByteRange { start, end }
        }
        (true, true) => return Err(malformed()),
    };
    Ok(Some(range))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_foreign_unit_means_full_body() {
        assert_eq!(parse_range(None, 10).unwrap(), None);
        assert_eq!(parse_range(Some("items=0-1"), 10).unwrap(), None);
    }

    #[test]
    fn closed_open_and_suffix_ranges() {
        assert_eq!(parse_range(Some("bytes=2-5"), 10).unwrap(), Some(ByteRange { start: 2, end: 5 }));
        assert_eq!(parse_range(Some("bytes=4-"), 10).unwrap(), Some(ByteRange { start: 4, end: 9 }));
        assert_eq!(parse_range(Some("bytes=-3"), 10).unwrap(), Some(ByteRange { start: 7, end: 9 }));
        assert_eq!(parse_range(Some("bytes=-30"), 10).unwrap(), Some(ByteRange { start: 0, end: 9 }));
        assert_eq!(parse_range(Some("bytes=8-100"), 10).unwrap(), Some(ByteRange { start: 8, end: 9 }));
    }

    #[test]
    fn start_past_end_is_unsatisfiable() {
        let err = parse_range(Some("bytes=10-"), 10).unwrap_err();
        assert_eq!(err.code(), "RANGE_NOT_SATISFIABLE");
    }

    #[test]
    fn garbage_is_bad_request() {
        for bad in ["bytes=x-1", "bytes=5-2", "bytes=-", "bytes=12"] {
            assert_eq!(parse_range(Some(bad), 10).unwrap_err().code(), "BAD_REQUEST", "{bad}");
        }
    }

    #[test]
    fn content_range_header() {
        let r = ByteRange { start: 0, end: 4 };
        assert_eq!(r.len(), 5);
        assert_eq!(r.content_range(20), "bytes 0-4/20");
    }
}
