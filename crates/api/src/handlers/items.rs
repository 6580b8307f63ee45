//! Handlers for QA items, nested under their subcategory on create/list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use guide_core::types::DbId;
use guide_db::models::qa_item::{CreateQaItem, UpdateQaItem};
use guide_db::repositories::{QaItemRepo, SubcategoryRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/subcategories/{id}/items
///
/// Items of every status, in position order.
pub async fn list_items(
    State(state): State<AppState>,
    Path(subcategory_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    SubcategoryRepo::find_by_id(&state.pool, subcategory_id)
        .await?
        .ok_or(AppError::not_found("Subcategory", subcategory_id))?;

    let items = QaItemRepo::list_by_subcategory(&state.pool, subcategory_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/subcategories/{id}/items
pub async fn create_item(
    State(state): State<AppState>,
    Path(subcategory_id): Path<DbId>,
    Json(input): Json<CreateQaItem>,
) -> AppResult<impl IntoResponse> {
    let item = QaItemRepo::create(&state.pool, subcategory_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /api/v1/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = QaItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("QaItem", id))?;
    Ok(Json(DataResponse { data: item }))
}

/// PUT /api/v1/items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateQaItem>,
) -> AppResult<impl IntoResponse> {
    let item = QaItemRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("QaItem", id))?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if QaItemRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("QaItem", id))
    }
}
