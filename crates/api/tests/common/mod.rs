#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use guide_api::config::{LogFormat, ServerConfig};
use guide_api::router::build_app_router;
use guide_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and a per-process media root.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 5,
        media_root: test_media_root(),
        log_format: LogFormat::Text,
    }
}

pub fn test_media_root() -> PathBuf {
    std::env::temp_dir().join(format!("guide-media-{}", std::process::id()))
}

/// Build the full application router, exactly as `main.rs` does, around
/// the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a single-file multipart form with the file under field `file`.
pub async fn post_file(app: Router, uri: &str, filename: &str, bytes: &[u8]) -> Response<Body> {
    let boundary = "guide-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a product and return its JSON representation.
pub async fn create_product(pool: &PgPool, name: &str) -> Value {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/products",
        serde_json::json!({ "name": name }),
    )
    .await;
    body_json(response).await["data"].clone()
}

/// Create a product, a subcategory under it and a published item under that.
/// Returns `(product, subcategory, item)`.
pub async fn seed_item(pool: &PgPool, question: &str) -> (Value, Value, Value) {
    let product = create_product(pool, "Laptops").await;
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/products/{}/subcategories", product["id"]),
        serde_json::json!({ "name": "Repairs" }),
    )
    .await;
    let subcategory = body_json(response).await["data"].clone();

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/subcategories/{}/items", subcategory["id"]),
        serde_json::json!({ "question": question, "status": "published" }),
    )
    .await;
    let item = body_json(response).await["data"].clone();

    (product, subcategory, item)
}
