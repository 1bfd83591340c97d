//! Authorization header parsing.
//!
//! Grammar: `<scheme> <credential>`, surrounding whitespace ignored, scheme
//! compared case-insensitively, exactly two whitespace-separated parts.

use axum::http::{header, HeaderMap};

pub const BEARER_SCHEME: &str = "Bearer";
pub const API_KEY_SCHEME: &str = "ApiKey";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("authorization header missing")]
    MissingHeader,

    #[error("authorization header must be \"<scheme> <token>\"")]
    MalformedHeader,

    #[error("authorization scheme must be {expected}, got {got:?}")]
    WrongScheme { expected: &'static str, got: String },

    #[error("authorization token is empty")]
    EmptyToken,
}

/// Extracts the credential for `scheme` from a raw header value.
///
/// An absent, empty or all-whitespace value is `MissingHeader`. A value that
/// is only the scheme word (`"Bearer"`, `"Bearer   "`) is `EmptyToken`.
pub fn extract_credential<'a>(
    value: Option<&'a str>,
    scheme: &'static str,
) -> Result<&'a str, BearerError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(BearerError::MissingHeader);
    }

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [only] if only.eq_ignore_ascii_case(scheme) => Err(BearerError::EmptyToken),
        [given, token] => {
            if !given.eq_ignore_ascii_case(scheme) {
                return Err(BearerError::WrongScheme {
                    expected: scheme,
                    got: (*given).to_string(),
                });
            }
            if token.is_empty() {
                return Err(BearerError::EmptyToken);
            }
            Ok(*token)
        }
        _ => Err(BearerError::MalformedHeader),
    }
}

/// `Authorization: Bearer <token>`
pub fn extract_bearer(value: Option<&str>) -> Result<&str, BearerError> {
    extract_credential(value, BEARER_SCHEME)
}

/// `Authorization: ApiKey <key>`
pub fn extract_api_key(value: Option<&str>) -> Result<&str, BearerError> {
    extract_credential(value, API_KEY_SCHEME)
}

fn authorization(headers: &HeaderMap) -> Result<Option<&str>, BearerError> {
    headers
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().map_err(|_| BearerError::MalformedHeader))
        .transpose()
}

/// Bearer token from request headers.
pub fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, BearerError> {
    extract_bearer(authorization(headers)?)
}

/// API key from request headers.
pub fn api_key_from_headers(headers: &HeaderMap) -> Result<&str, BearerError> {
    extract_api_key(authorization(headers)?)
}
