//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Health, metrics and reset.
pub mod admin;
/// Login, refresh and revoke.
pub mod auth;
/// Chirp CRUD handlers.
pub mod chirps;
/// Registration and account updates.
pub mod users;
/// Payment provider callbacks.
pub mod webhooks;
