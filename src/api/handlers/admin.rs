use crate::{
    types::{AppError, Result},
    AppState,
};
use axum::{extract::State, response::Html};
use tracing::warn;

/// Health check
#[utoipa::path(
    get,
    path = "/api/healthz",
    responses((status = 200, description = "Server is up", body = String)),
    tag = "admin"
)]
pub async fn health() -> &'static str {
    "OK"
}

/// Fileserver hit count as an HTML page
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>",
        state.metrics.hits()
    ))
}

/// Wipe all users and reset the hit counter. Development platform only.
pub async fn reset(State(state): State<AppState>) -> Result<&'static str> {
    if !state.config.is_dev() {
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    let deleted = state.db.delete_all_users().await?;
    state.metrics.reset();
    warn!(deleted, "database reset");

    Ok("Hits reset to 0 and database reset to initial state.")
}
