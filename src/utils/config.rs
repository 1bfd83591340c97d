//! Server configuration
//!
//! Every setting is a CLI flag with an environment variable fallback.
//! `main` loads a `.env` file first, so either source works.

use clap::Parser;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

/// Shortest secret accepted without a warning.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must not be empty")]
    EmptySecret,
}

/// Chirpy - a small microblogging backend
#[derive(Parser, Clone)]
#[command(name = "chirpy-server")]
#[command(about = "Chirpy API server")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// SQLite database file, or `:memory:`
    #[arg(long, env = "DATABASE_PATH", default_value = "chirpy.db")]
    pub database_path: String,

    /// Deployment platform; `dev` enables the reset endpoint
    #[arg(long, env = "PLATFORM", default_value = "prod")]
    pub platform: String,

    /// HMAC key for access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// API key expected on payment provider webhooks
    #[arg(long, env = "POLKA_KEY", hide_env_values = true)]
    pub polka_key: Option<String>,

    /// Directory served under /app
    #[arg(long, env = "FILESERVER_ROOT", default_value = ".")]
    pub fileserver_root: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,
}

impl Config {
    /// Defaults for everything but the secret, with an in-memory database.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: ":memory:".to_string(),
            platform: "prod".to_string(),
            jwt_secret: jwt_secret.into(),
            polka_key: None,
            fileserver_root: PathBuf::from("."),
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    pub fn is_dev(&self) -> bool {
        self.platform.eq_ignore_ascii_case("dev")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.jwt_secret.len() < MIN_SECRET_BYTES {
            warn!(
                len = self.jwt_secret.len(),
                min = MIN_SECRET_BYTES,
                "JWT_SECRET is shorter than recommended"
            );
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen", &self.listen)
            .field("database_path", &self.database_path)
            .field("platform", &self.platform)
            .field("jwt_secret", &"<redacted>")
            .field("polka_key", &self.polka_key.as_ref().map(|_| "<redacted>"))
            .field("fileserver_root", &self.fileserver_root)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}
