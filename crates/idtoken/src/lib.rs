//! Verification of third-party OIDC identity tokens.
//!
//! Tokens are compact JWTs signed with RS256 or ES256. Public keys are
//! fetched from the provider's key set endpoints (Google's by default).
//!
//! ```no_run
//! # async fn run(token: &str) -> idtoken::Result<()> {
//! let validator = idtoken::IdTokenValidator::new().build();
//! let claims = validator.validate(token, "client-123").await?;
//! println!("signed in: {}", claims.identity().email);
//! # Ok(())
//! # }
//! ```

mod error;
mod jwks;

// Internal modules
pub(crate) mod algorithm;
pub(crate) mod claims;
pub(crate) mod endpoints;
pub(crate) mod header;
pub(crate) mod limits;
pub(crate) mod utils;
pub(crate) mod validator;

pub mod auth;

// Public Interface
pub use algorithm::AlgorithmType;
pub use claims::{ClaimBag, Claims, IdentityClaims, StandardClaims};
pub use endpoints::{GOOGLE_ES256_KEYS_URL, GOOGLE_RS256_KEYS_URL, KeyEndpoints};
pub use error::{Error, Result, Segment};
pub use jwks::caching::RemoteCacheKey;
pub use jwks::{FetchFuture, KeyFetcher};
pub use validator::IdTokenValidator;

pub use miniserde::json::Value;
