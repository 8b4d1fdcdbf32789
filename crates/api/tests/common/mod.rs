#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use todo_core::types::OwnerId;
use tower::ServiceExt;

use todo_api::auth::jwt::{generate_access_token, JwtConfig};
use todo_api::config::ServerConfig;
use todo_api::router::build_app_router;
use todo_api::state::AppState;

pub const OWNER: OwnerId = 1;
pub const OTHER_OWNER: OwnerId = 2;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        default_page_size: 10,
        max_page_size: 100,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router, middleware included, over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config()))
}

/// A valid Bearer token for `owner`.
pub fn token_for(owner: OwnerId) -> String {
    generate_access_token(owner, &test_config().jwt).expect("token generation should succeed")
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// GET without credentials.
pub async fn get_public(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

/// GET as `owner`.
pub async fn get(app: &Router, uri: &str, owner: OwnerId) -> Response {
    send(app, Method::GET, uri, Some(&token_for(owner)), None).await
}

/// POST a JSON body as `owner`.
pub async fn post_json(app: &Router, uri: &str, owner: OwnerId, json: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(&token_for(owner)), Some(json)).await
}

/// POST with an empty body as `owner`.
pub async fn post_empty(app: &Router, uri: &str, owner: OwnerId) -> Response {
    send(app, Method::POST, uri, Some(&token_for(owner)), None).await
}

/// PUT a JSON body as `owner`.
pub async fn put_json(app: &Router, uri: &str, owner: OwnerId, json: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(&token_for(owner)), Some(json)).await
}

/// DELETE as `owner`.
pub async fn delete(app: &Router, uri: &str, owner: OwnerId) -> Response {
    send(app, Method::DELETE, uri, Some(&token_for(owner)), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a todo as `owner` and return its id.
pub async fn create_todo(app: &Router, owner: OwnerId, json: serde_json::Value) -> i64 {
    let response = post_json(app, "/api/v1/todos", owner, json).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a category as `owner` and return its id.
pub async fn create_category(app: &Router, owner: OwnerId, name: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/categories",
        owner,
        serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
