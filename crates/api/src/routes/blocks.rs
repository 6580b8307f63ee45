//! Route definitions for QA items, their blocks, and media uploads.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::media::MAX_UPLOAD_BYTES;
use crate::handlers::{blocks, items, media};
use crate::state::AppState;

/// Item routes mounted at `/items`.
///
/// ```text
/// GET    /{id}          -> get_item
/// PUT    /{id}          -> update_item
/// DELETE /{id}          -> delete_item
/// GET    /{id}/blocks   -> list_blocks
/// POST   /{id}/blocks   -> create_block
/// PUT    /{id}/blocks   -> replace_blocks
/// POST   /{id}/media    -> upload_media
/// ```
pub fn items_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route(
            "/{id}/blocks",
            get(blocks::list_blocks)
                .post(blocks::create_block)
                .put(blocks::replace_blocks),
        )
        .route(
            "/{id}/media",
            post(media::upload_media).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

/// Block routes mounted at `/blocks`.
///
/// ```text
/// POST   /validate      -> validate
/// GET    /{id}          -> get_block
/// PUT    /{id}          -> update_block
/// DELETE /{id}          -> delete_block
/// ```
pub fn blocks_router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(blocks::validate))
        .route(
            "/{id}",
            get(blocks::get_block)
                .put(blocks::update_block)
                .delete(blocks::delete_block),
        )
}
