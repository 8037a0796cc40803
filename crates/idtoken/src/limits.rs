//! Size limit constants for input validation

/// Maximum length for a JWT token string (64KB)
pub(crate) const MAX_TOKEN_LENGTH: usize = 64 * 1024;

/// Maximum length for key distribution endpoint URLs (2048 characters)
pub(crate) const MAX_ENDPOINT_URL_LENGTH: usize = 2048;

/// Maximum size for JWKS response (512KB)
pub(crate) const MAX_JWKS_RESPONSE_SIZE: usize = 512 * 1024;

/// Maximum number of keys in a JWK set (100 keys)
pub(crate) const MAX_JWK_SET_SIZE: usize = 100;

// ============================================================================
// Decoded segment size limits
// ============================================================================

/// Maximum size for decoded JWT header JSON (8KB)
/// Headers are typically small (< 1KB), but we allow reasonable margin
pub(crate) const MAX_DECODED_HEADER_SIZE: usize = 8 * 1024;

/// Maximum size for decoded JWT payload JSON (64KB)
pub(crate) const MAX_DECODED_PAYLOAD_SIZE: usize = 64 * 1024;

/// Maximum size for decoded signature bytes (1KB)
/// RSA signatures are typically 256-512 bytes, but we allow margin for larger keys
pub(crate) const MAX_DECODED_SIGNATURE_SIZE: usize = 1024;

/// Maximum size for Base64URL-encoded signature string (1.5KB)
pub(crate) const MAX_SIGNATURE_B64_SIZE: usize = 1536;

/// Fixed width of an ES256 signature: 32-byte r followed by 32-byte s
pub(crate) const ES256_SIGNATURE_SIZE: usize = 64;

/// Width of a P-256 field element (x, y, r, s)
pub(crate) const P256_COORDINATE_SIZE: usize = 32;

// ============================================================================
// JWK field size limits
// ============================================================================

/// Maximum size for Base64URL-encoded RSA modulus (n) field (12KB)
/// 8192-byte modulus (65536 bits) encodes to ~10.9KB Base64URL
pub(crate) const MAX_JWK_N_SIZE: usize = 12 * 1024;

/// Maximum size for Base64URL-encoded RSA exponent (e) field (64 bytes)
pub(crate) const MAX_JWK_E_SIZE: usize = 64;

/// Maximum size for Base64URL-encoded EC coordinates (x, y)
pub(crate) const MAX_JWK_COORDINATE_SIZE: usize = 64;

/// Maximum size for JWK key ID (kid) field (256 bytes)
pub(crate) const MAX_JWK_KID_SIZE: usize = 256;

/// Maximum size for JWK algorithm (alg) and curve (crv) fields (16 bytes)
pub(crate) const MAX_JWK_ALG_SIZE: usize = 16;

// ============================================================================
// Claim string length limits
// ============================================================================

/// Maximum length for claim string values (2048 bytes)
/// Applies to iss, sub, aud claims
pub(crate) const MAX_CLAIM_STRING_LENGTH: usize = 2048;

// ============================================================================
// Header field size limits
// ============================================================================

/// Maximum length for algorithm (alg) field in JWT header (16 bytes)
pub(crate) const MAX_ALG_LENGTH: usize = 16;

/// Maximum length for key ID (kid) field in JWT header (256 bytes)
pub(crate) const MAX_KID_LENGTH: usize = 256;
