//! Claims decoding and validation for identity tokens
//!
//! The payload is decoded once into a generic JSON object. Standard claims
//! are pulled out of that object by explicit lookups and are required to be
//! well-formed; everything else stays in the [`ClaimBag`] and is read
//! best-effort through typed accessors that fall back to `None` (or to the
//! empty/false defaults of [`IdentityClaims`]).

use crate::error::{Error, Result, Segment};
use crate::utils::bounds::validate_claim_string;
use miniserde::json::{Number, Object, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Standard claims every accepted token carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardClaims {
    /// Issuer (iss)
    pub issuer: String,
    /// Audience (aud)
    pub audience: String,
    /// Expiration Time (exp), seconds since Unix epoch
    pub expiration: i64,
    /// Issued At (iat), seconds since Unix epoch
    pub issued_at: Option<i64>,
    /// Subject (sub)
    pub subject: Option<String>,
}

impl StandardClaims {
    fn from_object(object: &Object) -> Result<Self> {
        let issuer = required_str(object, "iss")?;
        let audience = required_str(object, "aud")?;
        let expiration = optional_i64(object, "exp")?.ok_or_else(|| missing("exp"))?;
        let issued_at = optional_i64(object, "iat")?;
        let subject = match object.get("sub") {
            None | Some(Value::Null) => None,
            Some(Value::String(sub)) => Some(sub.clone()),
            Some(_) => return Err(invalid("sub")),
        };

        validate_claim_string("iss", &issuer)?;
        validate_claim_string("aud", &audience)?;
        if let Some(sub) = &subject {
            validate_claim_string("sub", sub)?;
        }

        Ok(Self {
            issuer,
            audience,
            expiration,
            issued_at,
            subject,
        })
    }
}

fn missing(claim: &str) -> Error {
    Error::FormatInvalidJson {
        segment: Segment::Payload,
        reason: format!("missing required claim '{claim}'"),
    }
}

fn invalid(claim: &str) -> Error {
    Error::FormatInvalidJson {
        segment: Segment::Payload,
        reason: format!("claim '{claim}' has an unexpected type"),
    }
}

fn required_str(object: &Object, claim: &str) -> Result<String> {
    match object.get(claim) {
        Some(Value::String(value)) => Ok(value.clone()),
        None | Some(Value::Null) => Err(missing(claim)),
        Some(_) => Err(invalid(claim)),
    }
}

fn optional_i64(object: &Object, claim: &str) -> Result<Option<i64>> {
    match object.get(claim) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number_to_i64(number).map(Some).ok_or_else(|| invalid(claim)),
        Some(_) => Err(invalid(claim)),
    }
}

/// NumericDate values may be fractional; whole seconds are kept
fn number_to_i64(number: &Number) -> Option<i64> {
    match *number {
        Number::U64(value) => i64::try_from(value).ok(),
        Number::I64(value) => Some(value),
        Number::F64(value) => {
            if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
                Some(value.trunc() as i64)
            } else {
                None
            }
        }
    }
}

/// Open mapping of every claim in the payload
#[derive(Debug, Clone, Default)]
pub struct ClaimBag {
    object: Object,
}

impl ClaimBag {
    /// Raw JSON value of a claim
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.object.get(name)
    }

    /// String claim, `None` when absent or not a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.object.get(name) {
            Some(Value::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Boolean claim, `None` when absent or not a boolean
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.object.get(name) {
            Some(Value::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Integer claim, `None` when absent, not a number or out of range
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.object.get(name) {
            Some(Value::Number(number)) => number_to_i64(number),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.object.contains_key(name)
    }

    /// Claim names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.object.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_empty()
    }

    /// Provider identity fields, defaulting to empty/false
    pub fn identity(&self) -> IdentityClaims {
        let text = |name: &str| self.get_str(name).unwrap_or_default().to_string();
        IdentityClaims {
            email: text("email"),
            email_verified: self.get_bool("email_verified").unwrap_or(false),
            id: text("sub"),
            name: text("name"),
            given_name: text("given_name"),
            family_name: text("family_name"),
            picture: text("picture"),
        }
    }
}

/// Identity fields published by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityClaims {
    pub email: String,
    pub email_verified: bool,
    /// Provider subject identifier (`sub`)
    pub id: String,
    pub name: String,
    pub given_name: String,
    pub family_name: String,
    /// Profile picture URL
    pub picture: String,
}

/// Claims of a decoded token
#[derive(Debug, Clone)]
pub struct Claims {
    standard: StandardClaims,
    bag: ClaimBag,
}

impl Claims {
    /// Decode payload JSON into standard claims plus the claim bag
    pub(crate) fn from_payload_json(json: &str) -> Result<Self> {
        let value: Value =
            miniserde::json::from_str(json).map_err(|e| Error::FormatInvalidJson {
                segment: Segment::Payload,
                reason: format!("Failed to parse payload: {e}"),
            })?;

        let Value::Object(object) = value else {
            return Err(Error::FormatInvalidJson {
                segment: Segment::Payload,
                reason: "payload is not a JSON object".into(),
            });
        };

        let standard = StandardClaims::from_object(&object)?;
        Ok(Self {
            standard,
            bag: ClaimBag { object },
        })
    }

    pub fn standard(&self) -> &StandardClaims {
        &self.standard
    }

    pub fn bag(&self) -> &ClaimBag {
        &self.bag
    }

    /// Shorthand for `self.bag().identity()`
    pub fn identity(&self) -> IdentityClaims {
        self.bag.identity()
    }

    pub fn issuer(&self) -> &str {
        &self.standard.issuer
    }

    pub fn audience(&self) -> &str {
        &self.standard.audience
    }

    pub fn expiration(&self) -> i64 {
        self.standard.expiration
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.standard.issued_at
    }

    pub fn subject(&self) -> Option<&str> {
        self.standard.subject.as_deref()
    }

    pub fn into_parts(self) -> (StandardClaims, ClaimBag) {
        (self.standard, self.bag)
    }
}

/// Check audience and expiry
///
/// An empty `expected_audience` skips the audience check. The token is
/// expired once `now` reaches `exp`.
pub(crate) fn validate_claims(
    claims: &StandardClaims,
    expected_audience: &str,
    now: i64,
) -> Result<()> {
    if !expected_audience.is_empty() && claims.audience != expected_audience {
        return Err(Error::TokenAudienceMismatch {
            expected: expected_audience.to_string(),
            found: claims.audience.clone(),
        });
    }

    if now >= claims.expiration {
        return Err(Error::TokenExpired {
            expired_at: claims.expiration,
            now,
        });
    }

    Ok(())
}

/// Get current Unix timestamp
pub(crate) fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0))
        .as_secs() as i64
}
