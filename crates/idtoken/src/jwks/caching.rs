//! Resolving verification keys from key set endpoints

use crate::algorithm::AlgorithmType;
use crate::error::Result;
use crate::jwks::{KeyFetcher, fetch_key_set, find_key_by_kid};
use crate::utils::bounds::is_valid_cache_key;
use moka::future::Cache;
use tracing::trace;

/// Cache key for resolved public keys: (endpoint, algorithm, kid)
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RemoteCacheKey {
    endpoint: String,
    algorithm: AlgorithmType,
    kid: String,
}

impl RemoteCacheKey {
    pub(crate) fn new(endpoint: &str, algorithm: AlgorithmType, kid: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            algorithm,
            kid: kid.to_string(),
        }
    }

    /// Key set endpoint the key was fetched from
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Algorithm the key verifies
    pub fn algorithm(&self) -> AlgorithmType {
        self.algorithm
    }

    /// Key ID
    pub fn kid(&self) -> &str {
        &self.kid
    }
}

/// Resolve the verification key for `kid` from `endpoint`
///
/// Only successfully converted keys are cached. Any failure leaves the cache
/// untouched so the next call fetches again.
pub(crate) async fn resolve_key(
    fetcher: &dyn KeyFetcher,
    endpoint: &str,
    algorithm: AlgorithmType,
    kid: &str,
    cache: Option<&Cache<RemoteCacheKey, Vec<u8>>>,
) -> Result<Vec<u8>> {
    let cache_key = match cache {
        Some(_) if is_valid_cache_key(endpoint) => {
            Some(RemoteCacheKey::new(endpoint, algorithm, kid))
        }
        _ => None,
    };

    if let (Some(cache), Some(key)) = (cache, &cache_key) {
        if let Some(cached) = cache.get(key).await {
            trace!(kid, %algorithm, "verification key served from cache");
            return Ok(cached);
        }
    }

    let set = fetch_key_set(fetcher, endpoint).await?;
    let jwk = find_key_by_kid(&set, kid)?;
    let key = jwk.to_key(algorithm)?;

    if let (Some(cache), Some(cache_key)) = (cache, cache_key) {
        cache.insert(cache_key, key.clone()).await;
    }

    Ok(key)
}
