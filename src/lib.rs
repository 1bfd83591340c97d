//! # Chirpy
//!
//! A small microblogging backend: users register, log in, post short
//! "chirps" and manage their own content.
//!
//! ## Overview
//!
//! Chirpy can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `chirpy-server` binary
//! 2. **As a library** - Build the router yourself around any [`ChirpyStore`]
//!
//! ```rust,ignore
//! use chirpy::{api::routes::build_router, utils::config::Config, AppState, TursoClient};
//! use std::sync::Arc;
//!
//! let db = Arc::new(TursoClient::new_memory().await?);
//! let state = AppState::new(Config::new("a-long-random-secret"), db);
//! let app = build_router(state);
//! ```
//!
//! ## Sessions
//!
//! Logging in yields a short-lived access token (at most 60 seconds) and a
//! 60-day refresh token. The refresh token buys one-hour access tokens until
//! it expires or is revoked.
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Password hashing, tokens and the authorization gate
//! - [`db`] - Store traits and the libsql client
//! - [`metrics`] - Fileserver hit counter
//! - [`types`] - Request/response types and error handling
//! - [`utils`] - Configuration

/// HTTP API handlers and routes.
pub mod api;
/// Authentication and session lifecycle.
pub mod auth;
/// Database clients.
pub mod db;
/// Request counters.
pub mod metrics;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use auth::{AuthGate, AuthUser};
pub use db::{AuthStore, ChirpyStore, TursoClient};
pub use metrics::Metrics;
pub use types::{AppError, Result};

use crate::utils::config::Config;
use axum::extract::FromRef;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Users and chirps
    pub db: Arc<dyn ChirpyStore>,
    /// Login, tokens and authorization
    pub gate: Arc<AuthGate>,
    /// Fileserver hit counter
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires the gate to the same store the handlers use.
    pub fn new<S>(config: Config, store: Arc<S>) -> Self
    where
        S: ChirpyStore + 'static,
    {
        let gate = AuthGate::with_store(store.clone(), config.jwt_secret.clone());

        Self {
            config: Arc::new(config),
            db: store,
            gate: Arc::new(gate),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
