//! Algorithm support for identity token verification
use crate::error::{Error, Result};
use crate::limits::{ES256_SIGNATURE_SIZE, MAX_ALG_LENGTH};

use aws_lc_rs::signature::{self, UnparsedPublicKey};

/// Algorithm identifier from the token header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmType {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,
    /// ECDSA on P-256 with SHA-256
    ES256,
}

impl AlgorithmType {
    pub(crate) fn from_str(s: &str) -> Result<Self> {
        if s.len() > MAX_ALG_LENGTH {
            return Err(Error::AlgorithmUnsupported(format!(
                "Algorithm string too long: {} bytes (maximum: {} bytes)",
                s.len(),
                MAX_ALG_LENGTH
            )));
        }

        match s {
            "RS256" => Ok(AlgorithmType::RS256),
            "ES256" => Ok(AlgorithmType::ES256),
            _ => Err(Error::AlgorithmUnsupported(s.into())),
        }
    }

    /// Convert to string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlgorithmType::RS256 => "RS256",
            AlgorithmType::ES256 => "ES256",
        }
    }

    /// JWK key type (`kty`) expected for this algorithm
    pub(crate) const fn key_type(&self) -> &'static str {
        match self {
            AlgorithmType::RS256 => "RSA",
            AlgorithmType::ES256 => "EC",
        }
    }

    /// Get the verification algorithm for signature verification
    ///
    /// Note: JWT ECDSA signatures use IEEE P1363 format (fixed-length R||S),
    /// not ASN.1 DER encoding, as per RFC 7518 Section 3.4.
    fn verification_algorithm(&self) -> &'static dyn signature::VerificationAlgorithm {
        match self {
            AlgorithmType::RS256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            AlgorithmType::ES256 => &signature::ECDSA_P256_SHA256_FIXED,
        }
    }

    /// Verify a signature using the algorithm
    ///
    /// # Arguments
    /// * `signing_input` - The data that was signed (`header_b64.payload_b64`)
    /// * `signature` - The decoded signature bytes
    /// * `key` - SubjectPublicKeyInfo DER for RS256, uncompressed SEC1 point for ES256
    pub(crate) fn verify_signature(
        &self,
        signing_input: &str,
        signature: &[u8],
        key: &[u8],
    ) -> Result<()> {
        if *self == AlgorithmType::ES256 {
            check_es256_signature_length(signature)?;
        }

        let public_key = UnparsedPublicKey::new(self.verification_algorithm(), key);

        public_key
            .verify(signing_input.as_bytes(), signature)
            .map_err(|_| Error::SignatureInvalid)
    }
}

/// ES256 signatures are `r || s`, each a 32-byte big-endian integer
fn check_es256_signature_length(signature: &[u8]) -> Result<()> {
    if signature.len() != ES256_SIGNATURE_SIZE {
        return Err(Error::SignatureLengthMismatch {
            expected: ES256_SIGNATURE_SIZE,
            found: signature.len(),
        });
    }
    Ok(())
}

impl std::fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for AlgorithmType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
