//! Persistence for users, chirps and refresh tokens.
//!
//! [`TursoClient`] is the only backend: libsql in local mode, either on disk
//! or in memory. Everything above it talks to the [`AuthStore`] and
//! [`ChirpyStore`] traits.

#![allow(missing_docs)]

pub mod traits;
pub mod turso;

pub use traits::{
    AuthStore, Chirp, ChirpyStore, Credential, DatabaseProvider, RefreshTokenRecord,
    RevocationStatus, User,
};
pub use turso::TursoClient;
