//! Database abstraction traits
//!
//! Two capability traits are defined here:
//!
//! - [`AuthStore`] is the narrow contract the authentication core consumes:
//!   credential lookup plus refresh token create/lookup/revoke.
//! - [`ChirpyStore`] extends it with the user and chirp operations used by
//!   the HTTP handlers.
//!
//! # Example
//!
//! ```rust,ignore
//! use chirpy::db::DatabaseProvider;
//!
//! // In-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // File-based SQLite
//! let db = DatabaseProvider::SQLite { path: "chirpy.db".into() }.create_client().await?;
//! ```

use crate::types::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
}

impl DatabaseProvider {
    /// Pick a provider from a configured path. `:memory:` and the empty
    /// string select the in-memory database.
    pub fn from_path(path: &str) -> Self {
        if path.is_empty() || path == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: path.to_string(),
            }
        }
    }

    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> Result<super::turso::TursoClient> {
        match self {
            DatabaseProvider::Memory => super::turso::TursoClient::new_memory().await,
            DatabaseProvider::SQLite { path } => super::turso::TursoClient::new_local(path).await,
        }
    }
}

/// Login material for one account. The hash is a PHC string.
///
/// Carries the whole profile so a login can answer without a second read.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Credential> for User {
    fn from(credential: Credential) -> Self {
        User {
            id: credential.user_id,
            email: credential.email,
            hashed_password: credential.hashed_password,
            is_chirpy_red: credential.is_chirpy_red,
            created_at: credential.created_at,
            updated_at: credential.updated_at,
        }
    }
}

/// Stored state of a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Neither revoked nor past its expiry at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// Result of a revoke request. Callers see success either way; the variant
/// exists so the server can log what actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationStatus {
    /// The token was active and is now revoked.
    Revoked,
    /// The token had been revoked before; `revoked_at` was left untouched.
    AlreadyRevoked,
    /// No such token.
    Unknown,
}

/// User record from the database
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chirp record from the database
#[derive(Debug, Clone)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store operations the authentication core depends on.
///
/// Every mutation is a single atomic statement, so dropping the returned
/// future never leaves a half-applied write.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Look up login material by email.
    async fn lookup_credential(&self, email: &str) -> Result<Option<Credential>>;

    /// Persist a newly issued refresh token.
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Fetch a refresh token's state, whether or not it is still usable.
    async fn lookup_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Set `revoked_at` if it is not already set.
    async fn revoke_refresh_token(&self, token: &str) -> Result<RevocationStatus>;
}

/// Abstract trait for database operations
///
/// Everything the HTTP layer needs on top of [`AuthStore`].
#[async_trait]
pub trait ChirpyStore: AuthStore {
    // ============== User Operations ==============

    /// Create a new user. A duplicate email is `AppError::Conflict`.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User>;

    /// Get a user by ID
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Replace a user's email and password hash. `None` if the user is gone.
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>>;

    /// Mark a user as Chirpy Red. Returns false if the user does not exist.
    async fn upgrade_user(&self, id: Uuid) -> Result<bool>;

    /// Delete every user; chirps and refresh tokens go with them.
    async fn delete_all_users(&self) -> Result<u64>;

    // ============== Chirp Operations ==============

    /// Create a chirp owned by `user_id`
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp>;

    /// All chirps oldest first, optionally restricted to one author
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>>;

    /// Get a chirp by ID
    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>>;

    /// Delete a chirp if it belongs to `user_id`. Returns whether a row went.
    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
}
