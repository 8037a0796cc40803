//! Public key encodings accepted by aws-lc-rs
//!
//! RSA keys are wrapped in a DER SubjectPublicKeyInfo using the RustCrypto
//! `spki` and `der` crates. P-256 keys use the uncompressed SEC1 point.

use crate::error::{Error, Result};
use crate::limits::P256_COORDINATE_SIZE;
use der::{Encode, Sequence, asn1::UintRef};
use spki::{AlgorithmIdentifierOwned, ObjectIdentifier, SubjectPublicKeyInfoOwned};

/// Create error message for key encoding failures
fn key_error(operation: &str, details: impl std::fmt::Display) -> Error {
    Error::KeyInvalid(format!("{operation}: {details}"))
}

/// RSA public key structure for DER encoding
///
/// Represents RSAPublicKey as defined in RFC 3447:
/// RSAPublicKey ::= SEQUENCE {
///     modulus           INTEGER,  -- n
///     publicExponent    INTEGER   -- e
/// }
#[derive(Sequence)]
struct RsaPublicKey<'a> {
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
}

/// Build DER-encoded RSA public key from big-endian modulus (n) and exponent (e) bytes
pub(crate) fn rsa_spki_from_n_e(n: &[u8], e: &[u8]) -> Result<Vec<u8>> {
    use der::asn1::BitString;

    if n.is_empty() || e.is_empty() {
        return Err(key_error("rsa key missing n or e", "empty value"));
    }

    // 8192-byte modulus (65536 bits) is far beyond anything a provider publishes
    const MAX_RSA_MODULUS_SIZE: usize = 8192;
    if n.len() > MAX_RSA_MODULUS_SIZE {
        return Err(key_error(
            "RSA modulus too large",
            format!(
                "{} bytes (maximum: {} bytes)",
                n.len(),
                MAX_RSA_MODULUS_SIZE
            ),
        ));
    }

    // UintRef handles INTEGER encoding including leading zero for positive values
    let n_uint = UintRef::new(n).map_err(|e| key_error("failed to encode RSA modulus", e))?;
    let e_uint = UintRef::new(e).map_err(|e| key_error("failed to encode RSA exponent", e))?;

    let rsa_pubkey_der = RsaPublicKey {
        modulus: n_uint,
        public_exponent: e_uint,
    }
    .to_der()
    .map_err(|e| key_error("failed to encode RSA public key", e))?;

    const RSA_ENCRYPTION_OID: ObjectIdentifier =
        ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

    let algorithm = AlgorithmIdentifierOwned {
        oid: RSA_ENCRYPTION_OID,
        parameters: Some(der::asn1::AnyRef::NULL.into()),
    };

    let subject_public_key = BitString::new(0, rsa_pubkey_der)
        .map_err(|e| key_error("failed to create bit string", e))?;

    let spki = SubjectPublicKeyInfoOwned {
        algorithm,
        subject_public_key,
    };

    spki.to_der()
        .map_err(|e| key_error("failed to encode SPKI", e))
}

/// Build the uncompressed SEC1 point `0x04 || x || y` for a P-256 key
///
/// Coordinates shorter than 32 bytes are left-padded with zeros; longer
/// coordinates are rejected.
pub(crate) fn p256_point_from_xy(x: &[u8], y: &[u8]) -> Result<Vec<u8>> {
    let mut point = Vec::with_capacity(1 + 2 * P256_COORDINATE_SIZE);
    point.push(0x04);
    for (name, coordinate) in [("x", x), ("y", y)] {
        if coordinate.is_empty() || coordinate.len() > P256_COORDINATE_SIZE {
            return Err(key_error(
                "invalid P-256 coordinate",
                format!(
                    "{name} is {} bytes (expected 1 to {P256_COORDINATE_SIZE})",
                    coordinate.len()
                ),
            ));
        }
        point.resize(point.len() + P256_COORDINATE_SIZE - coordinate.len(), 0);
        point.extend_from_slice(coordinate);
    }
    Ok(point)
}
