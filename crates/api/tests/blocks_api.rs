//! HTTP-level tests for QA blocks, batch saves and media uploads.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_file, post_json, put_json, seed_item};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_block(pool: &PgPool, item: &Value, body: Value) -> Value {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/items/{}/blocks", item["id"]),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn list_blocks(pool: &PgPool, item: &Value) -> Vec<Value> {
    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/items/{}/blocks", item["id"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].as_array().unwrap().clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_heading_block_gets_anchor(pool: PgPool) {
    let (_, _, item) = seed_item(&pool, "How to reset?").await;

    let block = create_block(
        &pool,
        &item,
        json!({ "kind": "heading", "heading_text": "Reset Steps", "heading_level": 3 }),
    )
    .await;

    assert_eq!(block["heading_anchor"], "reset-steps");
    assert_eq!(block["heading_level"], 3);
    assert_eq!(block["position"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_block_reports_every_field(pool: PgPool) {
    let (_, _, item) = seed_item(&pool, "How to reset?").await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/items/{}/blocks", item["id"]),
        json!({ "kind": "video" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    let fields: Vec<&str> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"media_file"));
    assert!(fields.contains(&"media_url"));
    assert!(list_blocks(&pool, &item).await.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_block_under_missing_item_is_404(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/items/9999/blocks",
        json!({ "kind": "text", "text_md": "Hello" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_validate_endpoint_does_not_write(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/blocks/validate",
        json!({ "kind": "heading", "heading_text": "", "heading_level": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], false);
    let fields: Vec<&str> = json["data"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["heading_text", "heading_level"]);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/blocks/validate",
        json!({ "kind": "gif", "media_url": "https://media.example.com/a.gif" }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], true);
    assert!(json["data"]["errors"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_changes_kind_and_moves(pool: PgPool) {
    let (_, _, item) = seed_item(&pool, "How to reset?").await;
    let first = create_block(&pool, &item, json!({ "kind": "text", "text_md": "One" })).await;
    create_block(&pool, &item, json!({ "kind": "text", "text_md": "Two" })).await;

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/blocks/{}", first["id"]),
        json!({
            "kind": "image",
            "media_url": "https://media.example.com/a.png",
            "text_md": "",
            "position": 2
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["kind"], "image");
    assert_eq!(json["data"]["position"], 2);
    assert!(json["data"]["text_md"].is_null());

    let blocks = list_blocks(&pool, &item).await;
    assert_eq!(blocks[0]["text_md"], "Two");
    assert_eq!(blocks[0]["position"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_compacts_siblings(pool: PgPool) {
    let (_, _, item) = seed_item(&pool, "How to reset?").await;
    let first = create_block(&pool, &item, json!({ "kind": "text", "text_md": "One" })).await;
    create_block(&pool, &item, json!({ "kind": "text", "text_md": "Two" })).await;
    create_block(&pool, &item, json!({ "kind": "text", "text_md": "Three" })).await;

    let response = delete(
        build_test_app(pool.clone()),
        &format!("/api/v1/blocks/{}", first["id"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let positions: Vec<(String, i64)> = list_blocks(&pool, &item)
        .await
        .iter()
        .map(|b| {
            (
                b["text_md"].as_str().unwrap().to_string(),
                b["position"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        positions,
        vec![("Two".to_string(), 1), ("Three".to_string(), 2)]
    );

    let response = delete(
        build_test_app(pool),
        &format!("/api/v1/blocks/{}", first["id"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_replace_all_saves_list_in_order(pool: PgPool) {
    let (_, _, item) = seed_item(&pool, "How to reset?").await;
    let one = create_block(&pool, &item, json!({ "kind": "text", "text_md": "One" })).await;
    let two = create_block(&pool, &item, json!({ "kind": "text", "text_md": "Two" })).await;

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/items/{}/blocks", item["id"]),
        json!({
            "blocks": [
                { "kind": "heading", "heading_text": "Intro" },
                { "id": two["id"], "kind": "text", "text_md": "Two, edited" },
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let saved = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0]["kind"], "heading");
    assert_eq!(saved[0]["position"], 1);
    assert_eq!(saved[1]["id"], two["id"]);
    assert_eq!(saved[1]["text_md"], "Two, edited");

    let response = get(
        build_test_app(pool),
        &format!("/api/v1/blocks/{}", one["id"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_replace_all_errors_are_indexed(pool: PgPool) {
    let (_, _, item) = seed_item(&pool, "How to reset?").await;
    create_block(&pool, &item, json!({ "kind": "text", "text_md": "Keep me" })).await;

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/items/{}/blocks", item["id"]),
        json!({
            "blocks": [
                { "kind": "text", "text_md": "Fine" },
                { "kind": "text", "text_md": "   " },
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["fields"][0]["field"],
        "blocks[1].text_md"
    );

    let blocks = list_blocks(&pool, &item).await;
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["text_md"], "Keep me");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_then_attach_media(pool: PgPool) {
    let (_, _, item) = seed_item(&pool, "How to reset?").await;

    let response = post_file(
        build_test_app(pool.clone()),
        &format!("/api/v1/items/{}/media", item["id"]),
        "Reset Button.PNG",
        b"not really a png",
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let media_file = json["data"]["media_file"].as_str().unwrap().to_string();
    assert!(media_file.starts_with(&format!("qa/{}/", item["id"])));
    assert!(media_file.ends_with("_reset-button.png"));
    assert_eq!(json["data"]["url"], format!("/media/{media_file}"));
    assert!(common::test_media_root().join(&media_file).exists());

    let block = create_block(
        &pool,
        &item,
        json!({ "kind": "image", "media_file": media_file, "alt_text": "Reset button" }),
    )
    .await;
    assert_eq!(block["media_file"], json["data"]["media_file"]);

    let response = get(build_test_app(pool), &format!("/media/{media_file}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_without_file_is_bad_request(pool: PgPool) {
    let (_, _, item) = seed_item(&pool, "How to reset?").await;

    let response = post_json(
        build_test_app(pool),
        &format!("/api/v1/items/{}/media", item["id"]),
        json!({}),
    )
    .await;
    assert!(response.status().is_client_error());
}
