/// CLI and environment configuration.
pub mod config;
