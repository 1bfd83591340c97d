use crate::auth::gate::AuthGate;
use crate::types::AppError;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::sync::Arc;
use uuid::Uuid;

/// The authenticated caller of a request.
///
/// Extracting it validates the bearer token; a handler that takes `AuthUser`
/// never runs for an unauthenticated request. The resolved user is also
/// stored in the request extensions so later extractors can reuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let gate = Arc::<AuthGate>::from_ref(state);
        let user = AuthUser(gate.authenticate(&parts.headers)?);
        parts.extensions.insert(user);

        Ok(user)
    }
}
