use super::traits::{
    AuthStore, Chirp, ChirpyStore, Credential, RefreshTokenRecord, RevocationStatus, User,
};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// SQLite store backed by libsql.
///
/// Holds a single connection for its whole life: an in-memory database only
/// exists for as long as the connection that opened it.
pub struct TursoClient {
    _db: Database,
    conn: Connection,
}

impl TursoClient {
    /// Ephemeral in-memory database, schema included.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    /// File-backed database at `path`, created if missing.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Result<Connection> {
        Ok(self.conn.clone())
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to enable foreign keys: {}", e)))?;

        // Users table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                hashed_password TEXT NOT NULL,
                is_chirpy_red INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        // Chirps table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS chirps (
                id TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create chirps table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_chirps_user_id ON chirps(user_id)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create chirps index: {}", e)))?;

        // Refresh tokens are stored as SHA-256 digests, never in the clear.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS refresh_tokens (
                token_hash TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                revoked_at INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to create refresh_tokens table: {}", e))
        })?;

        Ok(())
    }

    async fn refresh_token_exists(&self, token_hash: &str) -> Result<bool> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT 1 FROM refresh_tokens WHERE token_hash = ?",
                [token_hash],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query refresh token: {}", e)))?;

        Ok(rows.next().await.map_err(db_err)?.is_some())
    }
}

fn db_err(e: libsql::Error) -> AppError {
    AppError::Database(e.to_string())
}

/// Maps a failed write, turning unique-constraint violations into conflicts.
fn write_err(e: libsql::Error, what: &str) -> AppError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        AppError::Conflict(format!("{} already exists", what))
    } else if message.contains("FOREIGN KEY constraint failed") {
        AppError::NotFound("User not found".to_string())
    } else {
        AppError::Database(format!("Failed to write {}: {}", what, message))
    }
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::Database(format!("Timestamp out of range: {}", secs)))
}

fn uuid_column(value: String) -> Result<Uuid> {
    Uuid::parse_str(&value).map_err(|e| AppError::Database(format!("Bad id {:?}: {}", value, e)))
}

const USER_COLUMNS: &str = "id, email, hashed_password, is_chirpy_red, created_at, updated_at";
const CHIRP_COLUMNS: &str = "id, body, user_id, created_at, updated_at";

fn user_from_row(row: &Row) -> Result<User> {
    Ok(User {
        id: uuid_column(row.get(0).map_err(db_err)?)?,
        email: row.get(1).map_err(db_err)?,
        hashed_password: row.get(2).map_err(db_err)?,
        is_chirpy_red: row.get::<i64>(3).map_err(db_err)? != 0,
        created_at: timestamp(row.get(4).map_err(db_err)?)?,
        updated_at: timestamp(row.get(5).map_err(db_err)?)?,
    })
}

fn chirp_from_row(row: &Row) -> Result<Chirp> {
    Ok(Chirp {
        id: uuid_column(row.get(0).map_err(db_err)?)?,
        body: row.get(1).map_err(db_err)?,
        user_id: uuid_column(row.get(2).map_err(db_err)?)?,
        created_at: timestamp(row.get(3).map_err(db_err)?)?,
        updated_at: timestamp(row.get(4).map_err(db_err)?)?,
    })
}

#[async_trait]
impl AuthStore for TursoClient {
    async fn lookup_credential(&self, email: &str) -> Result<Option<Credential>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                [email],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => {
                let user = user_from_row(&row)?;
                Ok(Some(Credential {
                    user_id: user.id,
                    email: user.email,
                    hashed_password: user.hashed_password,
                    is_chirpy_red: user.is_chirpy_red,
                    created_at: user.created_at,
                    updated_at: user.updated_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO refresh_tokens (token_hash, user_id, expires_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                hash_token(token),
                user_id.to_string(),
                expires_at.timestamp(),
                now,
                now,
            ),
        )
        .await
        .map_err(|e| write_err(e, "refresh token"))?;

        Ok(())
    }

    async fn lookup_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT user_id, expires_at, revoked_at FROM refresh_tokens WHERE token_hash = ?",
                [hash_token(token)],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query refresh token: {}", e)))?;

        let Some(row) = rows.next().await.map_err(db_err)? else {
            return Ok(None);
        };

        let revoked_at = match row.get::<Option<i64>>(2).map_err(db_err)? {
            Some(secs) => Some(timestamp(secs)?),
            None => None,
        };

        Ok(Some(RefreshTokenRecord {
            user_id: uuid_column(row.get(0).map_err(db_err)?)?,
            expires_at: timestamp(row.get(1).map_err(db_err)?)?,
            revoked_at,
        }))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<RevocationStatus> {
        let conn = self.connection()?;
        let token_hash = hash_token(token);
        let now = Utc::now().timestamp();

        // Only the first revocation stamps revoked_at.
        let changed = conn
            .execute(
                "UPDATE refresh_tokens SET revoked_at = ?, updated_at = ?
                 WHERE token_hash = ? AND revoked_at IS NULL",
                (now, now, token_hash.as_str()),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to revoke refresh token: {}", e)))?;

        if changed > 0 {
            return Ok(RevocationStatus::Revoked);
        }

        if self.refresh_token_exists(&token_hash).await? {
            Ok(RevocationStatus::AlreadyRevoked)
        } else {
            Ok(RevocationStatus::Unknown)
        }
    }
}

#[async_trait]
impl ChirpyStore for TursoClient {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();
        let id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO users (id, email, hashed_password, is_chirpy_red, created_at, updated_at)
             VALUES (?, ?, ?, 0, ?, ?)",
            (id.to_string(), email, hashed_password, now, now),
        )
        .await
        .map_err(|e| write_err(e, "user"))?;

        Ok(User {
            id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
            created_at: timestamp(now)?,
            updated_at: timestamp(now)?,
        })
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                [id.to_string()],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        let changed = conn
            .execute(
                "UPDATE users SET email = ?, hashed_password = ?, updated_at = ? WHERE id = ?",
                (email, hashed_password, now, id.to_string()),
            )
            .await
            .map_err(|e| write_err(e, "user"))?;

        if changed == 0 {
            return Ok(None);
        }

        self.get_user_by_id(id).await
    }

    async fn upgrade_user(&self, id: Uuid) -> Result<bool> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        let changed = conn
            .execute(
                "UPDATE users SET is_chirpy_red = 1, updated_at = ? WHERE id = ?",
                (now, id.to_string()),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to upgrade user: {}", e)))?;

        Ok(changed > 0)
    }

    async fn delete_all_users(&self) -> Result<u64> {
        let conn = self.connection()?;

        conn.execute("DELETE FROM users", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete users: {}", e)))
    }

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();
        let id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO chirps (id, body, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (id.to_string(), body, user_id.to_string(), now, now),
        )
        .await
        .map_err(|e| write_err(e, "chirp"))?;

        Ok(Chirp {
            id,
            body: body.to_string(),
            user_id,
            created_at: timestamp(now)?,
            updated_at: timestamp(now)?,
        })
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>> {
        let conn = self.connection()?;

        // rowid breaks ties between chirps created within the same second.
        let mut rows = match author_id {
            Some(author) => conn
                .query(
                    &format!(
                        "SELECT {} FROM chirps WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
                        CHIRP_COLUMNS
                    ),
                    [author.to_string()],
                )
                .await,
            None => conn
                .query(
                    &format!(
                        "SELECT {} FROM chirps ORDER BY created_at ASC, rowid ASC",
                        CHIRP_COLUMNS
                    ),
                    (),
                )
                .await,
        }
        .map_err(|e| AppError::Database(format!("Failed to query chirps: {}", e)))?;

        let mut chirps = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            chirps.push(chirp_from_row(&row)?);
        }

        Ok(chirps)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!("SELECT {} FROM chirps WHERE id = ?", CHIRP_COLUMNS),
                [id.to_string()],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query chirp: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(chirp_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let conn = self.connection()?;

        let changed = conn
            .execute(
                "DELETE FROM chirps WHERE id = ? AND user_id = ?",
                (id.to_string(), user_id.to_string()),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete chirp: {}", e)))?;

        Ok(changed > 0)
    }
}
