use crate::types::Claims;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::Deserialize;
use std::collections::HashSet;
use uuid::Uuid;

/// Issuer claim stamped on every access token.
pub const TOKEN_ISSUER: &str = "chirpy";

/// Why an access token was rejected, in the order the checks run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unexpected signing algorithm: {0}")]
    AlgorithmMismatch(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("invalid subject: {0}")]
    InvalidSubject(String),

    #[error("failed to sign token: {0}")]
    Encoding(String),
}

/// Only the field we need before trusting anything else in the header.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Issues and validates HS256 access tokens.
///
/// Stateless: the secret is supplied per call, so one signer can serve any
/// number of keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSigner;

impl TokenSigner {
    pub fn new() -> Self {
        Self
    }

    /// Signs a token for `subject` that expires `ttl` from now.
    ///
    /// Timestamps are whole epoch seconds. A sub-second TTL normally
    /// truncates `exp` down to `iat`, which makes the token already expired.
    pub fn issue(&self, subject: Uuid, secret: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            sub: subject.to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validates a token and returns its subject.
    ///
    /// Checks run strictly in order: structure, algorithm family, signature,
    /// expiry, subject.
    pub fn validate(&self, token: &str, secret: &str) -> Result<Uuid, TokenError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(TokenError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(parts[0])
            .map_err(|e| TokenError::MalformedToken(format!("header encoding: {}", e)))?;
        let header: RawHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| TokenError::MalformedToken(format!("header json: {}", e)))?;

        // Must reject non-HMAC algorithms before the secret is used as a key.
        let algorithm = match header.alg.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => return Err(TokenError::AlgorithmMismatch(other.to_string())),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::MalformedToken(e.to_string()),
        })?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| TokenError::InvalidSubject(claims.sub))
    }
}
