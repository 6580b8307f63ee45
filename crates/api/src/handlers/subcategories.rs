//! Handlers for subcategories, nested under their product on create/list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use guide_core::types::DbId;
use guide_db::models::subcategory::{CreateSubcategory, UpdateSubcategory};
use guide_db::repositories::{ProductRepo, SubcategoryRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/products/{id}/subcategories
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ProductRepo::find_by_id(&state.pool, product_id)
        .await?
        .ok_or(AppError::not_found("Product", product_id))?;

    let subcategories = SubcategoryRepo::list_by_product(&state.pool, product_id, true).await?;
    Ok(Json(DataResponse {
        data: subcategories,
    }))
}

/// POST /api/v1/products/{id}/subcategories
pub async fn create_subcategory(
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
    Json(input): Json<CreateSubcategory>,
) -> AppResult<impl IntoResponse> {
    let subcategory = SubcategoryRepo::create(&state.pool, product_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: subcategory })))
}

/// GET /api/v1/subcategories/{id}
pub async fn get_subcategory(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let subcategory = SubcategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Subcategory", id))?;
    Ok(Json(DataResponse { data: subcategory }))
}

/// PUT /api/v1/subcategories/{id}
pub async fn update_subcategory(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubcategory>,
) -> AppResult<impl IntoResponse> {
    let subcategory = SubcategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Subcategory", id))?;
    Ok(Json(DataResponse { data: subcategory }))
}

/// DELETE /api/v1/subcategories/{id}
pub async fn delete_subcategory(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SubcategoryRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Subcategory", id))
    }
}
