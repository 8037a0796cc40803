//! Local token signing and key set fixtures
//!
//! Keys are generated once per test binary. Tokens are signed locally with
//! aws-lc-rs and the matching public keys are published as key set JSON for
//! mockito servers to serve.

#![allow(dead_code)]

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{
    ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair, RSA_PKCS1_SHA256, RsaKeyPair,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use idtoken::{IdTokenValidator, KeyEndpoints};
use rsa::pkcs8::EncodePrivateKey;
use rsa::traits::PublicKeyParts;
use serde_json::{Value, json};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

pub const RSA_PATH: &str = "/oauth2/v3/certs";
pub const EC_PATH: &str = "/iap/verify/public_key-jwk";

/// RSA signing key plus its public JWK parameters
pub struct RsaFixture {
    pub keypair: RsaKeyPair,
    pub n: Vec<u8>,
    pub e: Vec<u8>,
}

/// ES256 signing key plus its public point coordinates
pub struct EcFixture {
    pub keypair: EcdsaKeyPair,
    pub x: Vec<u8>,
    pub y: Vec<u8>,
}

pub fn rsa_key() -> &'static RsaFixture {
    static KEY: OnceLock<RsaFixture> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let private_key =
            rsa::RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate RSA key");
        let pkcs8 = private_key
            .to_pkcs8_der()
            .expect("Failed to serialize to PKCS#8");
        let keypair = RsaKeyPair::from_pkcs8(pkcs8.as_bytes()).expect("Failed to load RSA key");
        RsaFixture {
            keypair,
            n: private_key.n().to_bytes_be(),
            e: private_key.e().to_bytes_be(),
        }
    })
}

pub fn ec_key() -> &'static EcFixture {
    static KEY: OnceLock<EcFixture> = OnceLock::new();
    KEY.get_or_init(|| {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
            .expect("Failed to generate EC key");
        let keypair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref())
            .expect("Failed to load EC key");
        let point = keypair.public_key().as_ref().to_vec();
        EcFixture {
            x: point[1..33].to_vec(),
            y: point[33..65].to_vec(),
            keypair,
        }
    })
}

pub fn b64(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Public RSA key record as published by the provider
pub fn rsa_jwk(kid: &str) -> Value {
    let key = rsa_key();
    json!({
        "kty": "RSA",
        "kid": kid,
        "alg": "RS256",
        "use": "sig",
        "n": b64(&key.n),
        "e": b64(&key.e),
    })
}

/// Public P-256 key record as published by the provider
pub fn ec_jwk(kid: &str) -> Value {
    let key = ec_key();
    json!({
        "kty": "EC",
        "kid": kid,
        "alg": "ES256",
        "crv": "P-256",
        "x": b64(&key.x),
        "y": b64(&key.y),
    })
}

pub fn key_set(keys: &[Value]) -> String {
    json!({ "keys": keys }).to_string()
}

/// Claims of a valid sign-in for `client-123`
pub fn standard_claims() -> Value {
    let now = now();
    json!({
        "iss": "https://accounts.google.com",
        "aud": "client-123",
        "sub": "110169484474386276334",
        "email": "a@b.com",
        "email_verified": true,
        "name": "Ada Lovelace",
        "given_name": "Ada",
        "family_name": "Lovelace",
        "picture": "https://example.com/ada.png",
        "iat": now - 60,
        "exp": now + 3600,
    })
}

/// Algorithm a token is signed with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signer {
    RS256,
    ES256,
}

/// Builder for locally signed tokens
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    header: Value,
    claims: Value,
    signer: Signer,
}

impl TokenBuilder {
    pub fn new(signer: Signer, kid: &str) -> Self {
        let alg = match signer {
            Signer::RS256 => "RS256",
            Signer::ES256 => "ES256",
        };
        Self {
            header: json!({ "alg": alg, "kid": kid, "typ": "JWT" }),
            claims: standard_claims(),
            signer,
        }
    }

    pub fn header(mut self, key: &str, value: Value) -> Self {
        self.header[key] = value;
        self
    }

    pub fn without_header(mut self, key: &str) -> Self {
        if let Some(object) = self.header.as_object_mut() {
            object.remove(key);
        }
        self
    }

    pub fn claim(mut self, key: &str, value: Value) -> Self {
        self.claims[key] = value;
        self
    }

    pub fn without_claim(mut self, key: &str) -> Self {
        if let Some(object) = self.claims.as_object_mut() {
            object.remove(key);
        }
        self
    }

    /// Signing input and raw signature bytes
    pub fn sign_parts(&self) -> (String, Vec<u8>) {
        let signing_input = format!(
            "{}.{}",
            b64(self.header.to_string()),
            b64(self.claims.to_string())
        );
        let rng = SystemRandom::new();
        let signature = match self.signer {
            Signer::RS256 => {
                let keypair = &rsa_key().keypair;
                let mut signature = vec![0u8; keypair.public_modulus_len()];
                keypair
                    .sign(
                        &RSA_PKCS1_SHA256,
                        &rng,
                        signing_input.as_bytes(),
                        &mut signature,
                    )
                    .expect("Failed to sign");
                signature
            }
            Signer::ES256 => ec_key()
                .keypair
                .sign(&rng, signing_input.as_bytes())
                .expect("Failed to sign")
                .as_ref()
                .to_vec(),
        };
        (signing_input, signature)
    }

    pub fn build(&self) -> String {
        let (signing_input, signature) = self.sign_parts();
        format!("{signing_input}.{}", b64(signature))
    }

    /// Token whose decoded signature has one byte flipped
    pub fn build_tampered(&self) -> String {
        let (signing_input, mut signature) = self.sign_parts();
        signature[0] ^= 0x01;
        format!("{signing_input}.{}", b64(signature))
    }

    /// Token carrying an arbitrary signature
    pub fn build_with_signature(&self, signature: &[u8]) -> String {
        let (signing_input, _) = self.sign_parts();
        format!("{signing_input}.{}", b64(signature))
    }
}

pub fn endpoints(server: &mockito::Server) -> KeyEndpoints {
    KeyEndpoints::new(
        format!("{}{RSA_PATH}", server.url()),
        format!("{}{EC_PATH}", server.url()),
    )
    .expect("valid endpoints")
}

pub fn validator(server: &mockito::Server) -> IdTokenValidator {
    IdTokenValidator::new().endpoints(endpoints(server)).build()
}

/// Serve `body` at `path` with status 200, expecting exactly `hits` requests
pub async fn serve_keys(
    server: &mut mockito::Server,
    path: &str,
    body: String,
    hits: usize,
) -> mockito::Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}
