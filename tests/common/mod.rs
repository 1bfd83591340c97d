//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

pub use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum_test::TestServer;
use chirpy::{
    api::routes::build_router,
    types::{LoginResponse, UserResponse},
    utils::config::Config,
    AppState, ChirpyStore, TursoClient,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub fn test_config() -> Config {
    let mut config = Config::new(TEST_SECRET);
    config.platform = "dev".to_string();
    config.polka_key = Some(POLKA_KEY.to_string());
    config
}

pub fn server_for<S: ChirpyStore + 'static>(config: Config, store: Arc<S>) -> TestServer {
    let app = build_router(AppState::new(config, store));
    TestServer::new(app).expect("Failed to create test server")
}

/// Server over a fresh in-memory database.
pub async fn create_test_server() -> TestServer {
    create_test_server_with(test_config()).await
}

pub async fn create_test_server_with(config: Config) -> TestServer {
    let db = TursoClient::new_memory()
        .await
        .expect("Failed to create in-memory database");
    server_for(config, Arc::new(db))
}

pub async fn create_server_serving(root: &Path) -> TestServer {
    let mut config = test_config();
    config.fileserver_root = root.to_path_buf();
    create_test_server_with(config).await
}

/// Value for an `Authorization` header.
pub fn authorization(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).expect("valid header value")
}

pub fn bearer(token: &str) -> HeaderValue {
    authorization(&format!("Bearer {}", token))
}

pub async fn register(server: &TestServer, email: &str, password: &str) -> UserResponse {
    let response = server
        .post("/api/users")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<UserResponse>()
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> LoginResponse {
    let response = server
        .post("/api/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<LoginResponse>()
}

/// Registers and logs in, returning the login response.
pub async fn sign_up(server: &TestServer, email: &str, password: &str) -> LoginResponse {
    register(server, email, password).await;
    login(server, email, password).await
}
