//! Errors for idtoken

use thiserror::Error;

/// Token segment a decoding failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Payload,
    Signature,
}

impl Segment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Segment::Header => "header",
            Segment::Payload => "payload",
            Segment::Signature => "signature",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// idtoken Errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Token too large: {size} bytes (maximum: {max} bytes)")]
    TokenTooLarge { size: usize, max: usize },

    // ============================================================================
    // Format Errors
    // ============================================================================
    #[error("Invalid JWT format: expected 3 segments separated by '.', found {segments}")]
    FormatInvalid { segments: usize },

    #[error("Base64URL decoding of {segment} failed: {reason}")]
    FormatInvalidBase64 { segment: Segment, reason: String },

    #[error("JSON parsing of {segment} failed: {reason}")]
    FormatInvalidJson { segment: Segment, reason: String },

    #[error("Signature Base64URL string too large: {size} bytes (maximum: {max} bytes)")]
    SignatureB64TooLarge { size: usize, max: usize },

    #[error("Header field '{field}' too long: {length} bytes (maximum: {max} bytes)")]
    HeaderFieldTooLong {
        field: String,
        length: usize,
        max: usize,
    },

    #[error("Claim '{claim}' too long: {length} bytes (maximum: {max} bytes)")]
    ClaimStringTooLong {
        claim: String,
        length: usize,
        max: usize,
    },

    // ============================================================================
    // Algorithm Errors
    // ============================================================================
    #[error("Expected JWT signed with RS256 or ES256 but found '{0}'")]
    AlgorithmUnsupported(String),

    // ============================================================================
    // Claim Errors
    // ============================================================================
    #[error("Token audience mismatch: expected '{expected}', found '{found}'")]
    TokenAudienceMismatch { expected: String, found: String },

    #[error("Token expired at {expired_at} (now: {now})")]
    TokenExpired { expired_at: i64, now: i64 },

    // ============================================================================
    // Key Errors
    // ============================================================================
    #[error("Key retrieval failed: {0}")]
    KeyRetrievalFailed(String),

    #[error("Remote URL too long: {length} characters (maximum: {max} characters)")]
    RemoteUrlTooLong { length: usize, max: usize },

    #[error("Remote response too large: {size} bytes (maximum: {max} bytes)")]
    RemoteResponseTooLarge { size: usize, max: usize },

    #[error("Remote JWK set too large: {key_count} keys (maximum: {max} keys)")]
    RemoteJwkSetTooLarge { key_count: usize, max: usize },

    #[error("No key found for kid '{kid}'")]
    KeyNotFound { kid: String },

    #[error("Multiple keys found with kid '{kid}' ({count} matches)")]
    MultipleKeysFound { kid: String, count: usize },

    #[error("Key record unusable: {0}")]
    KeyInvalid(String),

    // ============================================================================
    // Signature Errors
    // ============================================================================
    #[error("Signature length mismatch: expected {expected} bytes, found {found}")]
    SignatureLengthMismatch { expected: usize, found: usize },

    #[error("Signature verification failed")]
    SignatureInvalid,

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

impl Error {
    /// The token segment a decode failure refers to, if any
    pub fn segment(&self) -> Option<Segment> {
        match self {
            Error::FormatInvalidBase64 { segment, .. } | Error::FormatInvalidJson { segment, .. } => {
                Some(*segment)
            }
            _ => None,
        }
    }
}

/// Result type alias for idtoken operations
pub type Result<T> = std::result::Result<T, Error>;
