//! JSON Web Key Set (JWKS) fetching and key selection
pub(crate) mod caching;
pub(crate) mod jwk;

use crate::error::{Error, Result};
use crate::jwks::jwk::Jwk;
use crate::limits::{MAX_JWK_SET_SIZE, MAX_JWKS_RESPONSE_SIZE};
use miniserde::Deserialize;
use std::future::Future;
use std::pin::Pin;

/// Future returned by [`KeyFetcher::fetch`]
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

/// Source of raw key set documents
///
/// Implemented for [`reqwest::Client`]. Other implementations can serve
/// key sets from memory or a custom transport. Failures should be reported
/// as [`Error::KeyRetrievalFailed`] with a `"component: description"` message
/// (e.g. `"network: connection refused"`, `"http: status 404"`).
pub trait KeyFetcher: Send + Sync {
    /// Fetch the body served at `url`
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

impl KeyFetcher for reqwest::Client {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(fetch_url(self, url))
    }
}

/// Fetch data from a URL using reqwest
async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::KeyRetrievalFailed(format!("network: {e}")))?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(Error::KeyRetrievalFailed(format!(
            "http: status {}",
            response.status()
        )));
    }

    if let Some(length) = response.content_length() {
        if length > MAX_JWKS_RESPONSE_SIZE as u64 {
            return Err(Error::RemoteResponseTooLarge {
                size: usize::try_from(length).unwrap_or(usize::MAX),
                max: MAX_JWKS_RESPONSE_SIZE,
            });
        }
    }

    // Bodies without Content-Length are capped while streaming
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::KeyRetrievalFailed(format!("network: {e}")))?
    {
        let size = body.len() + chunk.len();
        if size > MAX_JWKS_RESPONSE_SIZE {
            return Err(Error::RemoteResponseTooLarge {
                size,
                max: MAX_JWKS_RESPONSE_SIZE,
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// JSON Web Key Set (JWKS)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct KeySet {
    /// The keys in the set
    pub keys: Vec<Jwk>,
}

/// Fetch and parse the key set served at `url`
pub(crate) async fn fetch_key_set(fetcher: &dyn KeyFetcher, url: &str) -> Result<KeySet> {
    let bytes = fetcher.fetch(url).await?;
    parse_key_set(&bytes)
}

/// Parse a key set document, enforcing size and key count limits
pub(crate) fn parse_key_set(bytes: &[u8]) -> Result<KeySet> {
    if bytes.len() > MAX_JWKS_RESPONSE_SIZE {
        return Err(Error::RemoteResponseTooLarge {
            size: bytes.len(),
            max: MAX_JWKS_RESPONSE_SIZE,
        });
    }

    let body = std::str::from_utf8(bytes)
        .map_err(|e| Error::KeyRetrievalFailed(format!("jwks: utf8 decode failed: {e}")))?;

    let set: KeySet = miniserde::json::from_str(body)
        .map_err(|_| Error::KeyRetrievalFailed("jwks: invalid key set json".to_string()))?;

    if set.keys.len() > MAX_JWK_SET_SIZE {
        return Err(Error::RemoteJwkSetTooLarge {
            key_count: set.keys.len(),
            max: MAX_JWK_SET_SIZE,
        });
    }

    Ok(set)
}

/// Find the single key whose `kid` equals `kid`
///
/// Keys without a `kid` never match. Zero matches is [`Error::KeyNotFound`],
/// more than one is [`Error::MultipleKeysFound`].
pub(crate) fn find_key_by_kid<'a>(set: &'a KeySet, kid: &str) -> Result<&'a Jwk> {
    let mut matches = set.keys.iter().filter(|k| k.kid.as_deref() == Some(kid));

    let first = matches.next().ok_or_else(|| Error::KeyNotFound {
        kid: kid.to_string(),
    })?;

    let extra = matches.count();
    if extra > 0 {
        return Err(Error::MultipleKeysFound {
            kid: kid.to_string(),
            count: extra + 1,
        });
    }

    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rsa_jwk(kid: Option<&str>, n: &str) -> Jwk {
        Jwk {
            kty: Some("RSA".to_string()),
            kid: kid.map(ToString::to_string),
            alg: None,
            key_use: None,
            n: Some(n.to_string()),
            e: Some("AQAB".to_string()),
            crv: None,
            x: None,
            y: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_key_set() {
        let mut server = mockito::Server::new_async().await;
        let jwks_json = r#"{
            "keys": [
                {"kty":"RSA","kid":"k1","use":"sig","alg":"RS256","n":"abc","e":"AQAB"},
                {"kty":"EC","kid":"k2","crv":"P-256","x":"xx","y":"yy"}
            ]
        }"#;
        let _mock = server
            .mock("GET", "/certs")
            .with_status(200)
            .with_body(jwks_json)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/certs", server.url());

        let set = fetch_key_set(&client, &url).await.expect("key set parse");
        assert_eq!(set.keys.len(), 2);
        assert_eq!(set.keys[0].kid.as_deref(), Some("k1"));
        assert_eq!(set.keys[0].key_use.as_deref(), Some("sig"));
        assert_eq!(set.keys[1].kid.as_deref(), Some("k2"));
        assert_eq!(set.keys[1].crv.as_deref(), Some("P-256"));
    }

    #[tokio::test]
    async fn test_fetch_key_set_non_200() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/certs")
            .with_status(503)
            .with_body(r#"{"keys":[]}"#)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/certs", server.url());

        let result = fetch_key_set(&client, &url).await;
        assert!(
            matches!(result, Err(Error::KeyRetrievalFailed(msg)) if msg.contains("status 503"))
        );
    }

    #[tokio::test]
    async fn test_fetch_key_set_no_content_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/certs")
            .with_status(204)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/certs", server.url());

        let result = fetch_key_set(&client, &url).await;
        assert!(matches!(result, Err(Error::KeyRetrievalFailed(_))));
    }

    #[tokio::test]
    async fn test_fetch_key_set_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/certs")
            .with_status(200)
            .with_body(b"{ invalid json }")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/certs", server.url());

        let result = fetch_key_set(&client, &url).await;
        assert!(
            matches!(result, Err(Error::KeyRetrievalFailed(msg)) if msg.contains("invalid key set json"))
        );
    }

    #[tokio::test]
    async fn test_fetch_key_set_oversized_chunked_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/certs")
            .with_status(200)
            .with_chunked_body(|w| {
                let chunk = [b' '; 64 * 1024];
                for _ in 0..16 {
                    w.write_all(&chunk)?;
                }
                Ok(())
            })
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/certs", server.url());

        let result = fetch_key_set(&client, &url).await;
        assert!(matches!(
            result,
            Err(Error::RemoteResponseTooLarge { size, max })
                if size > max && max == MAX_JWKS_RESPONSE_SIZE && size <= 2 * MAX_JWKS_RESPONSE_SIZE
        ));
    }

    #[tokio::test]
    async fn test_fetch_key_set_oversized_declared_length() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/certs")
            .with_status(200)
            .with_body(vec![b' '; MAX_JWKS_RESPONSE_SIZE + 1])
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/certs", server.url());

        assert!(matches!(
            fetch_key_set(&client, &url).await,
            Err(Error::RemoteResponseTooLarge { size, .. }) if size == MAX_JWKS_RESPONSE_SIZE + 1
        ));
    }

    #[tokio::test]
    async fn test_fetch_key_set_unreachable() {
        let client = reqwest::Client::new();
        let result = fetch_key_set(&client, "http://127.0.0.1:1/certs").await;
        assert!(
            matches!(result, Err(Error::KeyRetrievalFailed(msg)) if msg.starts_with("network:"))
        );
    }

    #[test]
    fn test_parse_key_set_optional_fields() {
        let set = parse_key_set(br#"{"keys": [{"kty":"RSA"}]}"#).expect("parse");
        assert_eq!(set.keys.len(), 1);
        assert_eq!(set.keys[0].kty.as_deref(), Some("RSA"));
        assert_eq!(set.keys[0].kid, None);
        assert_eq!(set.keys[0].n, None);
    }

    #[test]
    fn test_parse_key_set_missing_keys() {
        assert!(matches!(
            parse_key_set(br#"{"other": []}"#),
            Err(Error::KeyRetrievalFailed(_))
        ));
    }

    #[test]
    fn test_parse_key_set_oversized_response() {
        let oversized = vec![b'a'; MAX_JWKS_RESPONSE_SIZE + 1];
        assert!(matches!(
            parse_key_set(&oversized),
            Err(Error::RemoteResponseTooLarge { size, max }) if size > max && max == MAX_JWKS_RESPONSE_SIZE
        ));
    }

    #[test]
    fn test_parse_key_set_too_many_keys() {
        let key = r#"{"kty":"RSA","kid":"k","n":"AQAB","e":"AQAB"}"#;
        let keys = vec![key; MAX_JWK_SET_SIZE + 1].join(",");
        let body = format!(r#"{{"keys":[{keys}]}}"#);

        assert!(matches!(
            parse_key_set(body.as_bytes()),
            Err(Error::RemoteJwkSetTooLarge { key_count, max })
                if key_count == MAX_JWK_SET_SIZE + 1 && max == MAX_JWK_SET_SIZE
        ));
    }

    #[test]
    fn test_find_key_by_kid() {
        let set = KeySet {
            keys: vec![rsa_jwk(Some("key1"), "n1"), rsa_jwk(Some("key2"), "n2")],
        };

        let found = find_key_by_kid(&set, "key1").unwrap();
        assert_eq!(found.n.as_deref(), Some("n1"));

        let found = find_key_by_kid(&set, "key2").unwrap();
        assert_eq!(found.n.as_deref(), Some("n2"));

        assert_eq!(
            find_key_by_kid(&set, "key3").unwrap_err(),
            Error::KeyNotFound {
                kid: "key3".to_string()
            }
        );
    }

    #[test]
    fn test_find_key_by_kid_empty_set() {
        let set = KeySet { keys: vec![] };
        assert!(matches!(
            find_key_by_kid(&set, "key1"),
            Err(Error::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_find_key_by_kid_ignores_keys_without_kid() {
        let set = KeySet {
            keys: vec![rsa_jwk(None, "n1")],
        };
        assert!(matches!(
            find_key_by_kid(&set, ""),
            Err(Error::KeyNotFound { kid }) if kid.is_empty()
        ));
    }

    #[test]
    fn test_find_key_by_kid_multiple_matches() {
        let set = KeySet {
            keys: vec![
                rsa_jwk(Some("same"), "n1"),
                rsa_jwk(Some("other"), "n2"),
                rsa_jwk(Some("same"), "n3"),
            ],
        };

        assert!(matches!(
            find_key_by_kid(&set, "same"),
            Err(Error::MultipleKeysFound { kid, count: 2 }) if kid == "same"
        ));
    }
}
