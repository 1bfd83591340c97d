//! Login, refresh, revoke and per-request authorization.
//!
//! [`AuthGate`] ties the primitives together with the store. Every failure
//! an unauthenticated caller can trigger comes back as a generic
//! `AppError::Unauthorized`; the precise reason only goes to the log.

use super::bearer::{api_key_from_headers, bearer_from_headers};
use super::jwt::TokenSigner;
use super::password::{PasswordError, PasswordHasher};
use super::refresh::RefreshTokenIssuer;
use crate::db::{AuthStore, Chirp, RevocationStatus, User};
use crate::types::{AppError, Result};
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Upper bound, and default, for access tokens issued at login.
pub const MAX_LOGIN_TOKEN_SECS: i64 = 60;
/// Lifetime of access tokens minted from a refresh token.
pub const REFRESHED_TOKEN_SECS: i64 = 60 * 60;
/// Lifetime of refresh tokens.
pub const REFRESH_TOKEN_DAYS: i64 = 60;

const BAD_LOGIN: &str = "Incorrect email or password";
const BAD_ACCESS_TOKEN: &str = "Invalid or missing access token";
const BAD_REFRESH_TOKEN: &str = "Invalid or missing refresh token";
const BAD_API_KEY: &str = "Invalid or missing API key";

/// Verified in place of a real hash when the email is unknown, so both
/// login failures cost one Argon2 run. Uses the default cost parameters.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$GQ672uS0lq2mnXOUP7A+CQ$kDy3AcALKFWUwe1A/a4S1kbS3myUOJIYdTh9kW6Eee8";

/// Something with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Chirp {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub access_ttl: Duration,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Compares two secrets through their SHA-256 digests without an early exit.
fn secrets_match(expected: &str, given: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let given = Sha256::digest(given.as_bytes());
    expected
        .iter()
        .zip(given.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Clamps a requested login TTL into `1..=60` seconds. Anything absent or
/// out of range gets the maximum.
pub fn login_token_ttl(requested: Option<i64>) -> Duration {
    match requested {
        Some(secs) if (1..=MAX_LOGIN_TOKEN_SECS).contains(&secs) => Duration::seconds(secs),
        _ => Duration::seconds(MAX_LOGIN_TOKEN_SECS),
    }
}

#[derive(Clone)]
pub struct AuthGate {
    hasher: PasswordHasher,
    signer: TokenSigner,
    refresh_issuer: RefreshTokenIssuer,
    store: Arc<dyn AuthStore>,
    secret: String,
}

impl AuthGate {
    pub fn new(
        hasher: PasswordHasher,
        signer: TokenSigner,
        refresh_issuer: RefreshTokenIssuer,
        store: Arc<dyn AuthStore>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            hasher,
            signer,
            refresh_issuer,
            store,
            secret: secret.into(),
        }
    }

    /// OS-backed hashing and token generation over `store`.
    pub fn with_store(store: Arc<dyn AuthStore>, secret: impl Into<String>) -> Self {
        Self::new(
            PasswordHasher::default(),
            TokenSigner::new(),
            RefreshTokenIssuer::default(),
            store,
            secret,
        )
    }

    /// Hashes a new password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        self.hasher
            .hash(password)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Resolves the caller from an `Authorization: Bearer <jwt>` header.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid> {
        let token = bearer_from_headers(headers).map_err(|e| {
            debug!(reason = %e, "rejected authorization header");
            AppError::Unauthorized(BAD_ACCESS_TOKEN.to_string())
        })?;

        self.signer.validate(token, &self.secret).map_err(|e| {
            debug!(reason = %e, "rejected access token");
            AppError::Unauthorized(BAD_ACCESS_TOKEN.to_string())
        })
    }

    /// Checks an `Authorization: ApiKey <key>` header against `expected`.
    /// With no key configured every request is refused.
    pub fn authenticate_api_key(&self, headers: &HeaderMap, expected: Option<&str>) -> Result<()> {
        let given = api_key_from_headers(headers).map_err(|e| {
            debug!(reason = %e, "rejected api key header");
            AppError::Unauthorized(BAD_API_KEY.to_string())
        })?;

        match expected {
            Some(key) if !key.is_empty() && secrets_match(key, given) => Ok(()),
            Some(_) => {
                debug!("api key mismatch");
                Err(AppError::Unauthorized(BAD_API_KEY.to_string()))
            }
            None => {
                debug!("no api key configured");
                Err(AppError::Unauthorized(BAD_API_KEY.to_string()))
            }
        }
    }

    pub fn authorize_ownership(&self, owner_id: Uuid, user_id: Uuid) -> Result<()> {
        if owner_id != user_id {
            debug!(%owner_id, %user_id, "ownership check failed");
            return Err(AppError::Forbidden(
                "You can't modify another user's resource".to_string(),
            ));
        }
        Ok(())
    }

    /// Existence first, then ownership: a missing resource is `NotFound` no
    /// matter who asks.
    pub fn authorize_resource<T: Owned>(&self, resource: Option<T>, user_id: Uuid) -> Result<T> {
        let resource = resource.ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;
        self.authorize_ownership(resource.owner_id(), user_id)?;
        Ok(resource)
    }

    /// Verifies credentials and issues an access/refresh token pair.
    ///
    /// The refresh token is persisted last; if that write fails the caller
    /// gets the error and no tokens, and nothing can fail after it.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl: Option<i64>,
    ) -> Result<LoginOutcome> {
        let credential = match self.store.lookup_credential(email).await? {
            Some(credential) => credential,
            None => {
                let _ = self.hasher.verify(password, DUMMY_PASSWORD_HASH);
                debug!("login for unknown email");
                return Err(AppError::Unauthorized(BAD_LOGIN.to_string()));
            }
        };

        match self.hasher.verify(password, &credential.hashed_password) {
            Ok(true) => {}
            Ok(false) => {
                debug!(user_id = %credential.user_id, "login with wrong password");
                return Err(AppError::Unauthorized(BAD_LOGIN.to_string()));
            }
            Err(PasswordError::Format(e)) => {
                return Err(AppError::Internal(format!(
                    "Stored password hash for {} is unreadable: {}",
                    credential.user_id, e
                )));
            }
            Err(e) => return Err(AppError::Internal(e.to_string())),
        }

        let access_ttl = login_token_ttl(requested_ttl);
        let access_token = self
            .signer
            .issue(credential.user_id, &self.secret, access_ttl)
            .map_err(|e| AppError::Internal(format!("Failed to issue access token: {}", e)))?;

        let refresh_token = self
            .refresh_issuer
            .generate()
            .map_err(|e| AppError::Internal(format!("Failed to generate refresh token: {}", e)))?;
        let refresh_expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_DAYS);

        self.store
            .create_refresh_token(&refresh_token, credential.user_id, refresh_expires_at)
            .await
            .map_err(|e| match e {
                // Account removed since the lookup.
                AppError::NotFound(_) => AppError::Unauthorized(BAD_LOGIN.to_string()),
                other => other,
            })?;

        info!(user_id = %credential.user_id, "user logged in");

        Ok(LoginOutcome {
            user: credential.into(),
            access_token,
            access_ttl,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Trades a live refresh token for a one-hour access token. The refresh
    /// token itself is left as is.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String> {
        let token = bearer_from_headers(headers).map_err(|e| {
            debug!(reason = %e, "rejected refresh header");
            AppError::Unauthorized(BAD_REFRESH_TOKEN.to_string())
        })?;

        let record = match self.store.lookup_refresh_token(token).await? {
            Some(record) => record,
            None => {
                debug!("unknown refresh token");
                return Err(AppError::Unauthorized(BAD_REFRESH_TOKEN.to_string()));
            }
        };

        if !record.is_usable(Utc::now()) {
            debug!(
                user_id = %record.user_id,
                revoked = record.revoked_at.is_some(),
                "refresh token no longer usable"
            );
            return Err(AppError::Unauthorized(BAD_REFRESH_TOKEN.to_string()));
        }

        self.signer
            .issue(
                record.user_id,
                &self.secret,
                Duration::seconds(REFRESHED_TOKEN_SECS),
            )
            .map_err(|e| AppError::Internal(format!("Failed to issue access token: {}", e)))
    }

    /// Revokes the refresh token in the header. Revoking an already revoked
    /// or unknown token is not an error.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<RevocationStatus> {
        let token = bearer_from_headers(headers).map_err(|e| {
            debug!(reason = %e, "rejected revoke header");
            AppError::Unauthorized(BAD_REFRESH_TOKEN.to_string())
        })?;

        let status = self.store.revoke_refresh_token(token).await?;
        debug!(?status, "refresh token revocation");
        Ok(status)
    }
}
