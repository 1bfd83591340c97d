use crate::{
    auth::AuthUser,
    types::{AppError, CreateUserRequest, Result, UpdateUserRequest, UserResponse},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("A valid email is required".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::InvalidInput("Password is required".to_string()));
    }
    Ok(())
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    validate_credentials(&payload.email, &payload.password)?;

    let hashed_password = state.gate.hash_password(&payload.password)?;
    let user = state.db.create_user(&payload.email, &hashed_password).await?;

    info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Change the caller's email and password
#[utoipa::path(
    put,
    path = "/api/users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_user(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    validate_credentials(&payload.email, &payload.password)?;

    let hashed_password = state.gate.hash_password(&payload.password)?;
    let user = state
        .db
        .update_user(user_id, &payload.email, &hashed_password)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw")]
    #[case("   ", "pw")]
    #[case("no-at-sign", "pw")]
    #[case("a@b.c", "")]
    fn test_validate_credentials_rejects(#[case] email: &str, #[case] password: &str) {
        assert!(matches!(
            validate_credentials(email, password),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_credentials_accepts() {
        assert!(validate_credentials("walt@breakingbad.com", "123456").is_ok());
    }
}
