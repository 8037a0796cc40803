//! Sign-in with a third-party identity token
//!
//! [`IdentityAuthenticator`] is the service-facing wrapper around
//! [`IdTokenValidator`]. It requires a configured client id, uses it as the
//! expected audience and reports every verification failure as
//! [`AuthError::InvalidIdentityToken`]. The underlying [`Error`] is logged and
//! never returned to the caller.

use crate::algorithm::AlgorithmType;
use crate::claims::{Claims, IdentityClaims};
use crate::endpoints::KeyEndpoints;
use crate::error::{Error, Result};
use crate::validator::IdTokenValidator;
use std::time::Duration;
use tracing::{debug, warn};

/// Expected audience (the OAuth client id)
pub const CLIENT_ID_VAR: &str = "GOOGLE_CLIENT_ID";
/// Override for the RS256 key set endpoint
pub const RS256_KEYS_URL_VAR: &str = "IDTOKEN_RS256_KEYS_URL";
/// Override for the ES256 key set endpoint
pub const ES256_KEYS_URL_VAR: &str = "IDTOKEN_ES256_KEYS_URL";
/// Key fetch deadline in whole seconds
pub const FETCH_TIMEOUT_VAR: &str = "IDTOKEN_FETCH_TIMEOUT_SECS";

/// Errors surfaced to callers of [`IdentityAuthenticator`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("identity provider client id not configured")]
    ClientIdNotSet,

    #[error("invalid identity token")]
    InvalidIdentityToken,
}

/// Configuration for [`IdentityAuthenticator`]
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityConfig {
    /// OAuth client id, used as the expected audience
    pub client_id: String,
    /// Key set endpoints
    pub endpoints: KeyEndpoints,
    /// Optional key fetch deadline
    pub fetch_timeout: Option<Duration>,
}

impl IdentityConfig {
    /// Configuration for Google with the given client id
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            endpoints: KeyEndpoints::google(),
            fetch_timeout: None,
        }
    }

    /// Read configuration from the process environment
    ///
    /// A missing `GOOGLE_CLIENT_ID` yields an empty client id, which
    /// [`IdentityAuthenticator::authenticate`] reports as
    /// [`AuthError::ClientIdNotSet`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup(CLIENT_ID_VAR).unwrap_or_default();

        let rs256 = lookup(RS256_KEYS_URL_VAR);
        let es256 = lookup(ES256_KEYS_URL_VAR);
        let endpoints = if rs256.is_none() && es256.is_none() {
            KeyEndpoints::google()
        } else {
            let defaults = KeyEndpoints::google();
            KeyEndpoints::new(
                rs256.unwrap_or_else(|| defaults.for_algorithm(AlgorithmType::RS256).to_string()),
                es256.unwrap_or_else(|| defaults.for_algorithm(AlgorithmType::ES256).to_string()),
            )?
        };

        let fetch_timeout = match lookup(FETCH_TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    Error::ConfigurationInvalid(format!("{FETCH_TIMEOUT_VAR}={raw:?}: {e}"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            client_id,
            endpoints,
            fetch_timeout,
        })
    }
}

/// Result of a successful sign-in
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Identity fields published by the provider
    pub identity: IdentityClaims,
    /// Full verified claims
    pub claims: Claims,
}

/// Verifies identity tokens for one client id
#[derive(Debug, Clone)]
pub struct IdentityAuthenticator {
    client_id: String,
    validator: IdTokenValidator,
}

impl IdentityAuthenticator {
    /// Build an authenticator and its validator from configuration
    pub fn new(config: IdentityConfig) -> Self {
        let mut validator = IdTokenValidator::new();
        validator.endpoints(config.endpoints);
        if let Some(timeout) = config.fetch_timeout {
            validator.fetch_timeout(timeout);
        }
        Self::with_validator(config.client_id, validator)
    }

    /// Use an already configured validator
    pub fn with_validator(client_id: impl Into<String>, validator: IdTokenValidator) -> Self {
        Self {
            client_id: client_id.into(),
            validator,
        }
    }

    /// Verify `token` against the configured client id
    pub async fn authenticate(
        &self,
        token: &str,
    ) -> std::result::Result<VerifiedIdentity, AuthError> {
        if self.client_id.is_empty() {
            warn!("identity provider client id not configured");
            return Err(AuthError::ClientIdNotSet);
        }

        let claims = self
            .validator
            .validate(token, &self.client_id)
            .await
            .map_err(|error| {
                warn!(%error, "identity token validation failed");
                AuthError::InvalidIdentityToken
            })?;

        let identity = claims.identity();
        debug!(
            id = %identity.id,
            email = %identity.email,
            email_verified = identity.email_verified,
            "identity token accepted"
        );

        Ok(VerifiedIdentity { identity, claims })
    }
}
