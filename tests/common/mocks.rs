//! Mock stores for testing.
//!
//! Stand-ins for the libsql client that let tests drive the dependency
//! failure paths without a broken database.

use async_trait::async_trait;
use chirpy::db::{
    AuthStore, Chirp, ChirpyStore, Credential, RefreshTokenRecord, RevocationStatus, TursoClient,
    User,
};
use chirpy::types::{AppError, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Store where every operation fails as if the database were unreachable.
///
/// The error text is deliberately distinctive so tests can check it never
/// reaches a response body.
#[derive(Clone, Default)]
pub struct FailingStore;

pub const FAILURE_DETAIL: &str = "connection refused on /var/lib/chirpy.db";

fn unavailable<T>() -> Result<T> {
    Err(AppError::Database(FAILURE_DETAIL.to_string()))
}

#[async_trait]
impl AuthStore for FailingStore {
    async fn lookup_credential(&self, _email: &str) -> Result<Option<Credential>> {
        unavailable()
    }

    async fn create_refresh_token(
        &self,
        _token: &str,
        _user_id: Uuid,
        _expires_at: DateTime<Utc>,
    ) -> Result<()> {
        unavailable()
    }

    async fn lookup_refresh_token(&self, _token: &str) -> Result<Option<RefreshTokenRecord>> {
        unavailable()
    }

    async fn revoke_refresh_token(&self, _token: &str) -> Result<RevocationStatus> {
        unavailable()
    }
}

#[async_trait]
impl ChirpyStore for FailingStore {
    async fn create_user(&self, _email: &str, _hashed_password: &str) -> Result<User> {
        unavailable()
    }

    async fn get_user_by_id(&self, _id: Uuid) -> Result<Option<User>> {
        unavailable()
    }

    async fn update_user(
        &self,
        _id: Uuid,
        _email: &str,
        _hashed_password: &str,
    ) -> Result<Option<User>> {
        unavailable()
    }

    async fn upgrade_user(&self, _id: Uuid) -> Result<bool> {
        unavailable()
    }

    async fn delete_all_users(&self) -> Result<u64> {
        unavailable()
    }

    async fn create_chirp(&self, _user_id: Uuid, _body: &str) -> Result<Chirp> {
        unavailable()
    }

    async fn list_chirps(&self, _author_id: Option<Uuid>) -> Result<Vec<Chirp>> {
        unavailable()
    }

    async fn get_chirp(&self, _id: Uuid) -> Result<Option<Chirp>> {
        unavailable()
    }

    async fn delete_chirp(&self, _id: Uuid, _user_id: Uuid) -> Result<bool> {
        unavailable()
    }
}

/// Real database whose user-by-id reads always fail.
pub struct UnreadableUsersStore {
    pub inner: TursoClient,
}

impl UnreadableUsersStore {
    pub async fn new() -> Self {
        Self {
            inner: TursoClient::new_memory()
                .await
                .expect("Failed to create in-memory database"),
        }
    }
}

#[async_trait]
impl AuthStore for UnreadableUsersStore {
    async fn lookup_credential(&self, email: &str) -> Result<Option<Credential>> {
        self.inner.lookup_credential(email).await
    }

    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.inner
            .create_refresh_token(token, user_id, expires_at)
            .await
    }

    async fn lookup_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        self.inner.lookup_refresh_token(token).await
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<RevocationStatus> {
        self.inner.revoke_refresh_token(token).await
    }
}

#[async_trait]
impl ChirpyStore for UnreadableUsersStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User> {
        self.inner.create_user(email, hashed_password).await
    }

    async fn get_user_by_id(&self, _id: Uuid) -> Result<Option<User>> {
        unavailable()
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>> {
        self.inner.update_user(id, email, hashed_password).await
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<bool> {
        self.inner.upgrade_user(id).await
    }

    async fn delete_all_users(&self) -> Result<u64> {
        self.inner.delete_all_users().await
    }

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp> {
        self.inner.create_chirp(user_id, body).await
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>> {
        self.inner.list_chirps(author_id).await
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>> {
        self.inner.get_chirp(id).await
    }

    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        self.inner.delete_chirp(id, user_id).await
    }
}
