use crate::algorithm::AlgorithmType;
use crate::claims::{Claims, current_timestamp, validate_claims};
use crate::endpoints::KeyEndpoints;
use crate::error::{Error, Result, Segment};
use crate::header::TokenHeader;
use crate::jwks::KeyFetcher;
use crate::jwks::caching::{RemoteCacheKey, resolve_key};
use crate::limits::{
    MAX_DECODED_HEADER_SIZE, MAX_DECODED_PAYLOAD_SIZE, MAX_DECODED_SIGNATURE_SIZE,
    MAX_KID_LENGTH, MAX_SIGNATURE_B64_SIZE, MAX_TOKEN_LENGTH,
};
use crate::utils::base64url;
use crate::utils::bounds::validate_field_size;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Identity token validator
///
/// The validator is configured once and can be reused for any number of
/// tokens. Clones share the fetcher and the key cache.
#[derive(Clone)]
pub struct IdTokenValidator {
    config_endpoints: KeyEndpoints,
    config_fetcher: Arc<dyn KeyFetcher>,
    config_cache: Option<Arc<Cache<RemoteCacheKey, Vec<u8>>>>,
    config_timeout: Option<Duration>,
}

/// A token split into its segments with header and payload decoded
struct ParsedToken<'a> {
    signing_input: &'a str,
    signature_b64: &'a str,
    header: TokenHeader,
    algorithm: AlgorithmType,
    claims: Claims,
}

impl IdTokenValidator {
    /// Create a validator for Google's endpoints, fetching with a default
    /// `reqwest` client and no cache or deadline
    pub fn new() -> Self {
        Self {
            config_endpoints: KeyEndpoints::google(),
            config_fetcher: Arc::new(reqwest::Client::new()),
            config_cache: None,
            config_timeout: None,
        }
    }

    /// Configure the key set endpoints
    pub fn endpoints(&mut self, endpoints: KeyEndpoints) -> &mut Self {
        self.config_endpoints = endpoints;
        self
    }

    /// Fetch key sets with the given `reqwest` client
    pub fn client(&mut self, client: reqwest::Client) -> &mut Self {
        self.config_fetcher = Arc::new(client);
        self
    }

    /// Fetch key sets with a custom [`KeyFetcher`]
    pub fn fetcher<F>(&mut self, fetcher: F) -> &mut Self
    where
        F: KeyFetcher + 'static,
    {
        self.config_fetcher = Arc::new(fetcher);
        self
    }

    /// Configure the verification key cache
    ///
    /// The cache is wrapped internally in `Arc` to allow sharing across validator clones.
    pub fn cache(&mut self, cache: Cache<RemoteCacheKey, Vec<u8>>) -> &mut Self {
        self.config_cache = Some(Arc::new(cache));
        self
    }

    /// Bound the time spent resolving the verification key
    pub fn fetch_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.config_timeout = Some(timeout);
        self
    }

    /// Return the configured validator
    pub fn build(&mut self) -> Self {
        self.clone()
    }

    /// Configured key set endpoints
    pub fn key_endpoints(&self) -> &KeyEndpoints {
        &self.config_endpoints
    }
}

impl IdTokenValidator {
    /// Verify an identity token
    ///
    /// Returns the claims once the structure, audience, expiry and signature
    /// have been checked. An empty `expected_audience` skips the audience
    /// check. Key resolution honours the configured fetch timeout, if any.
    pub async fn validate(&self, token: &str, expected_audience: &str) -> Result<Claims> {
        self.validate_inner(token, expected_audience, self.config_timeout)
            .await
    }

    /// Verify an identity token, failing if key resolution takes longer than
    /// `deadline`
    pub async fn validate_within(
        &self,
        token: &str,
        expected_audience: &str,
        deadline: Duration,
    ) -> Result<Claims> {
        self.validate_inner(token, expected_audience, Some(deadline))
            .await
    }

    /// Decode the claims of a token without verifying anything
    ///
    /// Only the segment structure and the payload are checked. The result
    /// must not be trusted; it is meant for inspecting a token that failed
    /// validation.
    pub fn decode_unverified(token: &str) -> Result<Claims> {
        let [_, payload_b64, _] = split_token(token)?;
        decode_payload(payload_b64)
    }

    async fn validate_inner(
        &self,
        token: &str,
        expected_audience: &str,
        deadline: Option<Duration>,
    ) -> Result<Claims> {
        // 1-3. Split, decode header and payload, check algorithm
        let parsed = parse_token(token)?;
        let kid = parsed.header.key_id.as_deref().unwrap_or_default();

        // 4. Decode signature
        let signature = decode_signature(parsed.signature_b64)?;

        // 5. Audience, then expiry, before any network access
        validate_claims(parsed.claims.standard(), expected_audience, current_timestamp())?;
        trace!(
            iss = parsed.claims.issuer(),
            exp = parsed.claims.expiration(),
            "claims accepted"
        );

        // 6. Resolve verification key
        let endpoint = self.config_endpoints.for_algorithm(parsed.algorithm);
        debug!(%endpoint, kid, algorithm = %parsed.algorithm, "resolving verification key");
        let resolve = resolve_key(
            &*self.config_fetcher,
            endpoint,
            parsed.algorithm,
            kid,
            self.config_cache.as_deref(),
        );
        let key = match deadline {
            Some(limit) => tokio::time::timeout(limit, resolve).await.map_err(|_| {
                Error::KeyRetrievalFailed(format!("key fetch timed out after {limit:?}"))
            })??,
            None => resolve.await?,
        };

        // 7. Verify signature
        parsed
            .algorithm
            .verify_signature(parsed.signing_input, &signature, &key)?;
        debug!(kid, algorithm = %parsed.algorithm, "token signature verified");

        Ok(parsed.claims)
    }
}

impl Default for IdTokenValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenValidator")
            .field("endpoints", &self.config_endpoints)
            .field("cache", &self.config_cache.is_some())
            .field("timeout", &self.config_timeout)
            .finish_non_exhaustive()
    }
}

/// Split a token into exactly three segments
///
/// The segment count is checked before the overall size, so any input
/// without exactly two dots is reported as `FormatInvalid`.
fn split_token(token: &str) -> Result<[&str; 3]> {
    let mut parts = token.splitn(4, '.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::FormatInvalid {
            segments: token.split('.').count(),
        });
    };

    if token.len() > MAX_TOKEN_LENGTH {
        return Err(Error::TokenTooLarge {
            size: token.len(),
            max: MAX_TOKEN_LENGTH,
        });
    }

    Ok([header, payload, signature])
}

/// Parse token into component parts with validation
///
/// Splits into parts, validates token length, decodes the header and
/// checks the algorithm before the payload is decoded.
fn parse_token(token: &str) -> Result<ParsedToken<'_>> {
    let [header_b64, payload_b64, signature_b64] = split_token(token)?;

    let header_json =
        base64url::decode_segment_string(header_b64, MAX_DECODED_HEADER_SIZE, Segment::Header)?;
    let header: TokenHeader =
        miniserde::json::from_str(&header_json).map_err(|e| Error::FormatInvalidJson {
            segment: Segment::Header,
            reason: format!("Failed to parse header: {e}"),
        })?;

    if let Some(kid) = &header.key_id {
        validate_field_size("kid", kid, MAX_KID_LENGTH)?;
    }

    let algorithm = AlgorithmType::from_str(&header.algorithm)?;
    trace!(
        %algorithm,
        kid = header.key_id.as_deref(),
        typ = header.token_type.as_deref(),
        "token header decoded"
    );

    let claims = decode_payload(payload_b64)?;

    Ok(ParsedToken {
        signing_input: &token[..header_b64.len() + 1 + payload_b64.len()],
        signature_b64,
        header,
        algorithm,
        claims,
    })
}

fn decode_payload(payload_b64: &str) -> Result<Claims> {
    let payload_json =
        base64url::decode_segment_string(payload_b64, MAX_DECODED_PAYLOAD_SIZE, Segment::Payload)?;
    Claims::from_payload_json(&payload_json)
}

fn decode_signature(signature_b64: &str) -> Result<Vec<u8>> {
    if signature_b64.len() > MAX_SIGNATURE_B64_SIZE {
        return Err(Error::SignatureB64TooLarge {
            size: signature_b64.len(),
            max: MAX_SIGNATURE_B64_SIZE,
        });
    }
    base64url::decode_segment(
        signature_b64,
        MAX_DECODED_SIGNATURE_SIZE,
        Segment::Signature,
    )
}
