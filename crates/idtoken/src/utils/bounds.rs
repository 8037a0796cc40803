//! Bounds validation utilities
//!
//! Field size limits for header fields and claim strings, and cache key
//! validation.

use crate::error::{Error, Result};
use crate::limits::{MAX_CLAIM_STRING_LENGTH, MAX_ENDPOINT_URL_LENGTH};

/// Validate header field size
pub(crate) fn validate_field_size(field: &str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::HeaderFieldTooLong {
            field: field.into(),
            length: value.len(),
            max,
        });
    }
    Ok(())
}

/// Validate a single claim string length
pub(crate) fn validate_claim_string(claim: &str, value: &str) -> Result<()> {
    if value.len() > MAX_CLAIM_STRING_LENGTH {
        return Err(Error::ClaimStringTooLong {
            claim: claim.into(),
            length: value.len(),
            max: MAX_CLAIM_STRING_LENGTH,
        });
    }
    Ok(())
}

/// Check if cache key length is valid to prevent DoS attacks
pub(crate) fn is_valid_cache_key(key: &str) -> bool {
    key.len() <= MAX_ENDPOINT_URL_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_field_size() {
        assert!(validate_field_size("kid", "abc", 3).is_ok());
        assert!(matches!(
            validate_field_size("kid", "abcd", 3),
            Err(Error::HeaderFieldTooLong { length: 4, max: 3, .. })
        ));
    }

    #[test]
    fn test_validate_claim_string() {
        assert!(validate_claim_string("iss", "https://issuer.example").is_ok());
        let long = "a".repeat(MAX_CLAIM_STRING_LENGTH + 1);
        assert!(matches!(
            validate_claim_string("iss", &long),
            Err(Error::ClaimStringTooLong { claim, .. }) if claim == "iss"
        ));
    }

    #[test]
    fn test_is_valid_cache_key() {
        assert!(is_valid_cache_key("https://www.googleapis.com/oauth2/v3/certs"));
        assert!(!is_valid_cache_key(&"a".repeat(MAX_ENDPOINT_URL_LENGTH + 1)));
    }
}
