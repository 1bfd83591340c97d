//! Authentication and session lifecycle
//!
//! # Module Structure
//!
//! - [`password`] - Argon2id hashing in PHC format
//! - [`jwt`] - HS256 access token issue/validate
//! - [`refresh`] - Opaque refresh token generation
//! - [`bearer`] - `Authorization` header parsing
//! - [`gate`] - Login, refresh, revoke and ownership checks over a store
//! - [`middleware`] - The [`AuthUser`](middleware::AuthUser) extractor
//!
//! # Token model
//!
//! Access tokens are short-lived signed JWTs whose only meaningful claim is
//! the user id in `sub`. Refresh tokens are 64 hex characters with no
//! embedded meaning; the store records who owns each one, when it expires
//! and whether it has been revoked.
//!
//! ```ignore
//! async fn handler(AuthUser(user_id): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user_id)
//! }
//! ```

pub mod bearer;
pub mod gate;
pub mod jwt;
/// Extractors for protected routes.
pub mod middleware;
pub mod password;
pub mod refresh;

pub use bearer::BearerError;
pub use gate::{AuthGate, LoginOutcome, Owned};
pub use jwt::{TokenError, TokenSigner};
pub use middleware::AuthUser;
pub use password::{PasswordError, PasswordHasher};
pub use refresh::{EntropyError, EntropySource, OsEntropy, RefreshTokenIssuer};
