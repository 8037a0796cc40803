//! JWK (JSON Web Key) record and conversion to verification key bytes

use crate::algorithm::AlgorithmType;
use crate::error::{Error, Result};
use crate::limits::{
    MAX_JWK_ALG_SIZE, MAX_JWK_COORDINATE_SIZE, MAX_JWK_E_SIZE, MAX_JWK_KID_SIZE, MAX_JWK_N_SIZE,
};
use crate::utils::base64url;
use crate::utils::der::{p256_point_from_xy, rsa_spki_from_n_e};
use miniserde::Deserialize;

/// JSON Web Key (JWK) structure
///
/// Only the fields published by identity provider key endpoints are kept.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Jwk {
    /// Key type ("RSA" or "EC")
    pub kty: Option<String>,
    /// Key ID
    pub kid: Option<String>,
    /// Algorithm the key is meant for
    pub alg: Option<String>,
    /// Key use (RFC 7517 Section 4.2); "sig" or absent for signing keys
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    // RSA fields
    /// RSA modulus (Base64URL-encoded, big-endian)
    pub n: Option<String>,
    /// RSA exponent (Base64URL-encoded, big-endian)
    pub e: Option<String>,
    // ECDSA fields
    /// Elliptic curve name ("P-256")
    pub crv: Option<String>,
    /// ECDSA x-coordinate (Base64URL-encoded)
    pub x: Option<String>,
    /// ECDSA y-coordinate (Base64URL-encoded)
    pub y: Option<String>,
}

impl Jwk {
    /// Convert the JWK into key bytes accepted by [`AlgorithmType::verify_signature`]
    ///
    /// RS256 yields a DER SubjectPublicKeyInfo, ES256 an uncompressed SEC1 point.
    pub(crate) fn to_key(&self, algorithm: AlgorithmType) -> Result<Vec<u8>> {
        self.validate_structure(algorithm)?;
        match algorithm {
            AlgorithmType::RS256 => self.to_rsa_key(),
            AlgorithmType::ES256 => self.to_p256_key(),
        }
    }

    /// Validate key type, key use, advertised algorithm and field sizes
    fn validate_structure(&self, algorithm: AlgorithmType) -> Result<()> {
        let expected_kty = algorithm.key_type();
        match &self.kty {
            Some(kty) if kty == expected_kty => {}
            Some(kty) => {
                return Err(Error::KeyInvalid(format!(
                    "key type mismatch: expected {expected_kty}, found {kty}"
                )));
            }
            None => return Err(Error::KeyInvalid("missing key type (kty)".into())),
        }

        if let Some(use_val) = &self.key_use {
            if use_val != "sig" {
                return Err(Error::KeyInvalid(format!(
                    "key use mismatch: expected 'sig', found '{use_val}'"
                )));
            }
        }

        if let Some(kid) = &self.kid {
            check_field_size("kid", kid, MAX_JWK_KID_SIZE)?;
        }

        if let Some(alg) = &self.alg {
            check_field_size("alg", alg, MAX_JWK_ALG_SIZE)?;
            if alg != algorithm.as_str() {
                return Err(Error::KeyInvalid(format!(
                    "algorithm mismatch: key is for {alg}, token uses {algorithm}"
                )));
            }
        }

        Ok(())
    }

    /// Convert JWK to DER-encoded RSA public key
    fn to_rsa_key(&self) -> Result<Vec<u8>> {
        // Base64URL: 4 chars -> 3 bytes
        const MAX_DECODED_JWK_N: usize = (MAX_JWK_N_SIZE * 3) / 4;
        const MAX_DECODED_JWK_E: usize = (MAX_JWK_E_SIZE * 3) / 4;

        let n = required_field("n", self.n.as_deref(), MAX_JWK_N_SIZE)?;
        let e = required_field("e", self.e.as_deref(), MAX_JWK_E_SIZE)?;

        let n_bytes = decode_field("n", n, MAX_DECODED_JWK_N)?;
        let e_bytes = decode_field("e", e, MAX_DECODED_JWK_E)?;

        rsa_spki_from_n_e(&n_bytes, &e_bytes)
    }

    /// Convert JWK to an uncompressed P-256 point
    fn to_p256_key(&self) -> Result<Vec<u8>> {
        const MAX_DECODED_JWK_COORDINATE: usize = (MAX_JWK_COORDINATE_SIZE * 3) / 4;

        match self.crv.as_deref() {
            Some("P-256") => {}
            Some(crv) => {
                check_field_size("crv", crv, MAX_JWK_ALG_SIZE)?;
                return Err(Error::KeyInvalid(format!(
                    "curve mismatch: ES256 requires P-256, found {crv}"
                )));
            }
            None => return Err(Error::KeyInvalid("missing curve (crv)".into())),
        }

        let x = required_field("x", self.x.as_deref(), MAX_JWK_COORDINATE_SIZE)?;
        let y = required_field("y", self.y.as_deref(), MAX_JWK_COORDINATE_SIZE)?;

        let x_bytes = decode_field("x", x, MAX_DECODED_JWK_COORDINATE)?;
        let y_bytes = decode_field("y", y, MAX_DECODED_JWK_COORDINATE)?;

        p256_point_from_xy(&x_bytes, &y_bytes)
    }
}

fn check_field_size(field: &str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::KeyInvalid(format!(
            "field '{field}' too large: {} bytes (maximum: {max} bytes)",
            value.len()
        )));
    }
    Ok(())
}

fn required_field<'a>(field: &str, value: Option<&'a str>, max: usize) -> Result<&'a str> {
    let value = value.ok_or_else(|| Error::KeyInvalid(format!("missing '{field}'")))?;
    check_field_size(field, value, max)?;
    Ok(value)
}

fn decode_field(field: &str, value: &str, max: usize) -> Result<Vec<u8>> {
    base64url::decode_bytes(value, max)
        .map_err(|e| Error::KeyInvalid(format!("failed to decode '{field}': {e}")))
}
