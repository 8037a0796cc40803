//! Key distribution endpoints
//!
//! Each supported algorithm has its own key set endpoint. URLs are validated
//! when the configuration is built, so a validator never issues a request to
//! a malformed or unexpected scheme.

use crate::algorithm::AlgorithmType;
use crate::error::{Error, Result};
use crate::limits::MAX_ENDPOINT_URL_LENGTH;

/// Google's key set for RS256-signed ID tokens
pub const GOOGLE_RS256_KEYS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Google's key set for ES256-signed (IAP) tokens
pub const GOOGLE_ES256_KEYS_URL: &str = "https://www.gstatic.com/iap/verify/public_key-jwk";

/// Key set endpoints, one per supported algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEndpoints {
    rs256: String,
    es256: String,
}

impl KeyEndpoints {
    /// Create endpoints from explicit URLs
    pub fn new(rs256: impl Into<String>, es256: impl Into<String>) -> Result<Self> {
        let rs256 = rs256.into();
        let es256 = es256.into();
        validate_endpoint_url(&rs256)?;
        validate_endpoint_url(&es256)?;
        Ok(Self { rs256, es256 })
    }

    /// Google's published endpoints
    pub fn google() -> Self {
        Self {
            rs256: GOOGLE_RS256_KEYS_URL.to_string(),
            es256: GOOGLE_ES256_KEYS_URL.to_string(),
        }
    }

    /// Endpoint serving keys for the given algorithm
    pub fn for_algorithm(&self, algorithm: AlgorithmType) -> &str {
        match algorithm {
            AlgorithmType::RS256 => &self.rs256,
            AlgorithmType::ES256 => &self.es256,
        }
    }
}

impl Default for KeyEndpoints {
    fn default() -> Self {
        Self::google()
    }
}

/// Validate endpoint URL format and size
pub(crate) fn validate_endpoint_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(Error::ConfigurationInvalid(
            "key endpoint URL cannot be empty".into(),
        ));
    }

    if url.len() > MAX_ENDPOINT_URL_LENGTH {
        return Err(Error::RemoteUrlTooLong {
            length: url.len(),
            max: MAX_ENDPOINT_URL_LENGTH,
        });
    }

    let parsed = url
        .parse::<url::Url>()
        .map_err(|e| Error::ConfigurationInvalid(format!("invalid key endpoint URL: {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::ConfigurationInvalid(
            "key endpoint URL must use http or https scheme".into(),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(Error::ConfigurationInvalid(
            "key endpoint URL must have a valid host".into(),
        ));
    }

    Ok(())
}
