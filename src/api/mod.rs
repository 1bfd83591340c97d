//! HTTP API Handlers and Routes
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Users and sessions (`/api`)
//! - `POST /api/users` - Register
//! - `PUT /api/users` - Change own email and password
//! - `POST /api/login` - Receive an access token and a refresh token
//! - `POST /api/refresh` - Trade a refresh token for a fresh access token
//! - `POST /api/revoke` - Revoke a refresh token
//!
//! ## Chirps (`/api/chirps`)
//! - `POST /api/chirps` - Post a chirp
//! - `GET /api/chirps` - List chirps, optionally `?author_id=`
//! - `GET /api/chirps/{chirp_id}` - Fetch one chirp
//! - `DELETE /api/chirps/{chirp_id}` - Delete one of your chirps
//!
//! ## Other
//! - `POST /api/polka/webhooks` - Payment provider callback (`ApiKey` auth)
//! - `GET /api/healthz` - Health check
//! - `GET /api/openapi.json` - This API as an OpenAPI document
//! - `GET /admin/metrics`, `POST /admin/reset` - Admin
//! - `GET /app/*` - Static files
//!
//! # Authentication
//!
//! Protected endpoints take a JWT access token; refresh and revoke take the
//! refresh token in the same header:
//! ```text
//! Authorization: Bearer <token>
//! ```

use crate::types::{
    ChirpResponse, CreateChirpRequest, CreateUserRequest, LoginRequest, LoginResponse,
    PolkaWebhook, PolkaWebhookData, RefreshResponse, UpdateUserRequest, UserResponse,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

#[derive(OpenApi)]
#[openapi(
    info(title = "Chirpy API"),
    paths(
        handlers::admin::health,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::revoke,
        handlers::chirps::create_chirp,
        handlers::chirps::list_chirps,
        handlers::chirps::get_chirp,
        handlers::chirps::delete_chirp,
        handlers::webhooks::polka,
    ),
    components(schemas(
        CreateUserRequest,
        UpdateUserRequest,
        UserResponse,
        LoginRequest,
        LoginResponse,
        RefreshResponse,
        CreateChirpRequest,
        ChirpResponse,
        PolkaWebhook,
        PolkaWebhookData,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Sessions and tokens"),
        (name = "users", description = "Accounts"),
        (name = "chirps", description = "Chirps"),
        (name = "webhooks", description = "Third-party callbacks"),
        (name = "admin", description = "Operations"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_auth_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/login",
            "/api/refresh",
            "/api/revoke",
            "/api/users",
            "/api/chirps/{chirp_id}",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer")));
    }
}
