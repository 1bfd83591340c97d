use crate::{
    types::{LoginRequest, LoginResponse, RefreshResponse, Result},
    AppState,
};
use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use tracing::info;

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Incorrect email or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let outcome = state
        .gate
        .login(
            &payload.email,
            &payload.password,
            payload.expires_in_seconds,
        )
        .await?;

    Ok(Json(LoginResponse {
        user: outcome.user.into(),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Refresh token missing, unknown, revoked or expired")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>> {
    let token = state.gate.refresh(&headers).await?;
    Ok(Json(RefreshResponse { token }))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/revoke",
    responses(
        (status = 204, description = "Token revoked (or was never valid)"),
        (status = 401, description = "Authorization header missing or malformed")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn revoke(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    let status = state.gate.revoke(&headers).await?;
    info!(?status, "revoke requested");
    Ok(StatusCode::NO_CONTENT)
}
