use crate::{
    auth::AuthUser,
    types::{AppError, ChirpQuery, ChirpResponse, CreateChirpRequest, Result},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

/// Longest chirp body accepted, in characters.
pub const MAX_CHIRP_LENGTH: usize = 140;

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(format!("Invalid {}", what)))
}

/// Post a chirp as the caller
#[utoipa::path(
    post,
    path = "/api/chirps",
    request_body = CreateChirpRequest,
    responses(
        (status = 201, description = "Chirp created", body = ChirpResponse),
        (status = 400, description = "Chirp is too long"),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer" = [])),
    tag = "chirps"
)]
pub async fn create_chirp(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<(StatusCode, Json<ChirpResponse>)> {
    if payload.body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(AppError::InvalidInput("Chirp is too long".to_string()));
    }

    let chirp = state.db.create_chirp(user_id, &payload.body).await?;
    Ok((StatusCode::CREATED, Json(chirp.into())))
}

/// List chirps oldest first
#[utoipa::path(
    get,
    path = "/api/chirps",
    params(("author_id" = Option<String>, Query, description = "Only chirps by this user")),
    responses(
        (status = 200, description = "Chirps", body = Vec<ChirpResponse>),
        (status = 400, description = "Invalid author id")
    ),
    tag = "chirps"
)]
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpQuery>,
) -> Result<Json<Vec<ChirpResponse>>> {
    let author_id = match query.author_id.as_deref() {
        Some(raw) if !raw.is_empty() => Some(parse_id(raw, "author id")?),
        _ => None,
    };

    let chirps = state.db.list_chirps(author_id).await?;
    Ok(Json(chirps.into_iter().map(Into::into).collect()))
}

/// Fetch one chirp
#[utoipa::path(
    get,
    path = "/api/chirps/{chirp_id}",
    params(("chirp_id" = String, Path, description = "Chirp id")),
    responses(
        (status = 200, description = "Chirp", body = ChirpResponse),
        (status = 400, description = "Invalid chirp id"),
        (status = 404, description = "Chirp not found")
    ),
    tag = "chirps"
)]
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<ChirpResponse>> {
    let chirp_id = parse_id(&chirp_id, "chirp id")?;

    let chirp = state
        .db
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    Ok(Json(chirp.into()))
}

/// Delete one of the caller's chirps
#[utoipa::path(
    delete,
    path = "/api/chirps/{chirp_id}",
    params(("chirp_id" = String, Path, description = "Chirp id")),
    responses(
        (status = 204, description = "Chirp deleted"),
        (status = 400, description = "Invalid chirp id"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Chirp belongs to another user"),
        (status = 404, description = "Chirp not found")
    ),
    security(("bearer" = [])),
    tag = "chirps"
)]
pub async fn delete_chirp(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<StatusCode> {
    let chirp_id = parse_id(&chirp_id, "chirp id")?;

    let chirp = state.db.get_chirp(chirp_id).await?;
    let chirp = state.gate.authorize_resource(chirp, user_id)?;

    if !state.db.delete_chirp(chirp.id, user_id).await? {
        return Err(AppError::NotFound("Chirp not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
