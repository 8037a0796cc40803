//! Base64URL decoding per RFC 4648
//!
//! This module provides a thin wrapper around the `base64` crate with
//! size limit validation for security.

use crate::error::{Error, Result, Segment};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Decode Base64URL string to bytes with maximum size limit
///
/// The error is a bare description so callers can attach their own context
/// (token segment or key field).
pub(crate) fn decode_bytes(input: &str, max_size: usize) -> std::result::Result<Vec<u8>, String> {
    let result = URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| format!("Base64URL decode failed: {e}"))?;

    // Validate decoded size to prevent DoS attacks
    if result.len() > max_size {
        return Err(format!(
            "Decoded size exceeds limit: {} bytes (max: {})",
            result.len(),
            max_size
        ));
    }

    Ok(result)
}

/// Decode one token segment, tagging failures with the segment
pub(crate) fn decode_segment(input: &str, max_size: usize, segment: Segment) -> Result<Vec<u8>> {
    decode_bytes(input, max_size).map_err(|reason| Error::FormatInvalidBase64 { segment, reason })
}

/// Decode one token segment to a UTF-8 string
pub(crate) fn decode_segment_string(
    input: &str,
    max_size: usize,
    segment: Segment,
) -> Result<String> {
    decode_segment(input, max_size, segment).and_then(|bytes| {
        String::from_utf8(bytes).map_err(|e| Error::FormatInvalidBase64 {
            segment,
            reason: format!("Invalid UTF-8: {e}"),
        })
    })
}
