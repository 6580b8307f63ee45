//! Handlers for QA blocks.
//!
//! Blocks are created one at a time or saved as a complete list for an item
//! (`PUT /items/{id}/blocks`). `POST /blocks/validate` runs the block rules
//! without writing, so editors can highlight fields as the user types.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use guide_core::block::{validate_block, BlockFields, BlockKind};
use guide_core::error::FieldError;
use guide_core::types::DbId;
use guide_db::models::qa_block::{CreateQaBlock, ReplaceBlocks, UpdateQaBlock};
use guide_db::repositories::{QaBlockRepo, QaItemRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /blocks/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateBlockRequest {
    pub kind: BlockKind,
    #[serde(flatten)]
    pub fields: BlockFields,
}

#[derive(Debug, Serialize)]
pub struct ValidateBlockResponse {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// GET /api/v1/items/{id}/blocks
pub async fn list_blocks(
    State(state): State<AppState>,
    Path(qa_item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    QaItemRepo::find_by_id(&state.pool, qa_item_id)
        .await?
        .ok_or(AppError::not_found("QaItem", qa_item_id))?;

    let blocks = QaBlockRepo::list_by_item(&state.pool, qa_item_id, true).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// POST /api/v1/items/{id}/blocks
pub async fn create_block(
    State(state): State<AppState>,
    Path(qa_item_id): Path<DbId>,
    Json(input): Json<CreateQaBlock>,
) -> AppResult<impl IntoResponse> {
    let block = QaBlockRepo::create(&state.pool, qa_item_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: block })))
}

/// PUT /api/v1/items/{id}/blocks
///
/// Replace the item's block list. The response is the saved list in order.
pub async fn replace_blocks(
    State(state): State<AppState>,
    Path(qa_item_id): Path<DbId>,
    Json(input): Json<ReplaceBlocks>,
) -> AppResult<impl IntoResponse> {
    let blocks = QaBlockRepo::replace_all(&state.pool, qa_item_id, &input).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// GET /api/v1/blocks/{id}
pub async fn get_block(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let block = QaBlockRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("QaBlock", id))?;
    Ok(Json(DataResponse { data: block }))
}

/// PUT /api/v1/blocks/{id}
pub async fn update_block(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateQaBlock>,
) -> AppResult<impl IntoResponse> {
    let block = QaBlockRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("QaBlock", id))?;
    Ok(Json(DataResponse { data: block }))
}

/// DELETE /api/v1/blocks/{id}
pub async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if QaBlockRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("QaBlock", id))
    }
}

/// POST /api/v1/blocks/validate
///
/// Always 200; an empty `errors` list means the block may be saved.
pub async fn validate(
    Json(input): Json<ValidateBlockRequest>,
) -> Json<DataResponse<ValidateBlockResponse>> {
    let errors = validate_block(input.kind, &input.fields);
    Json(DataResponse {
        data: ValidateBlockResponse {
            valid: errors.is_empty(),
            errors,
        },
    })
}
