use crate::{
    types::{AppError, PolkaWebhook, Result},
    AppState,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::{debug, info};

/// The only payment event acted upon.
pub const USER_UPGRADED: &str = "user.upgraded";

/// Payment provider callback
#[utoipa::path(
    post,
    path = "/api/polka/webhooks",
    request_body = PolkaWebhook,
    responses(
        (status = 204, description = "Event accepted"),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "Missing or wrong API key"),
        (status = 404, description = "User not found")
    ),
    security(("api_key" = [])),
    tag = "webhooks"
)]
pub async fn polka(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    state
        .gate
        .authenticate_api_key(&headers, state.config.polka_key.as_deref())?;

    // Decoded only once the caller is known.
    let payload: PolkaWebhook = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))?;

    if payload.event != USER_UPGRADED {
        debug!(event = %payload.event, "ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    if !state.db.upgrade_user(payload.data.user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    info!(user_id = %payload.data.user_id, "user upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
