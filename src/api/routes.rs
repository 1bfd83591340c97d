use crate::api::{handlers, ApiDoc};
use crate::metrics::count_hits;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Routes mounted under `/api`. Protected handlers authenticate through the
/// `AuthUser` extractor, so public and protected methods can share a path.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(handlers::admin::health))
        .route(
            "/users",
            post(handlers::users::create_user).put(handlers::users::update_user),
        )
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/revoke", post(handlers::auth::revoke))
        .route(
            "/chirps",
            get(handlers::chirps::list_chirps).post(handlers::chirps::create_chirp),
        )
        .route(
            "/chirps/{chirp_id}",
            get(handlers::chirps::get_chirp).delete(handlers::chirps::delete_chirp),
        )
        .route("/polka/webhooks", post(handlers::webhooks::polka))
        .route("/openapi.json", get(openapi_json))
}

/// Routes mounted under `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(handlers::admin::metrics))
        .route("/reset", post(handlers::admin::reset))
}

/// The whole application: API, admin, counted static files and tracing.
pub fn build_router(state: AppState) -> Router {
    let fileserver = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.fileserver_root))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            count_hits,
        ));

    Router::new()
        .nest("/api", create_router())
        .nest("/admin", admin_router())
        .merge(fileserver)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{utils::config::Config, TursoClient};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let db = TursoClient::new_memory().await.unwrap();
        build_router(AppState::new(
            Config::new("router-test-secret"),
            Arc::new(db),
        ))
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = app()
            .await
            .oneshot(Request::get("/api/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn test_protected_route_rejects_anonymous() {
        let request = Request::post("/api/chirps")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"body":"hi"}"#))
            .unwrap();

        let response = app().await.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_reset_forbidden_outside_dev() {
        let response = app()
            .await
            .oneshot(Request::post("/admin/reset").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
