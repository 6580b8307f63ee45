//! Handlers for navigation links.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use guide_core::types::DbId;
use guide_db::models::nav_link::{CreateNavLink, NavLinkView, UpdateNavLink};
use guide_db::repositories::NavLinkRepo;

use crate::error::{AppError, AppResult};
use crate::query::PlacementParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/nav-links?placement=
///
/// All links (inactive included), optionally for one placement.
pub async fn list_nav_links(
    State(state): State<AppState>,
    Query(params): Query<PlacementParams>,
) -> AppResult<impl IntoResponse> {
    let links: Vec<NavLinkView> = NavLinkRepo::list(&state.pool, params.placement, true)
        .await?
        .into_iter()
        .map(NavLinkView::from)
        .collect();
    Ok(Json(DataResponse { data: links }))
}

/// POST /api/v1/nav-links
pub async fn create_nav_link(
    State(state): State<AppState>,
    Json(input): Json<CreateNavLink>,
) -> AppResult<impl IntoResponse> {
    let link = NavLinkRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: NavLinkView::from(link),
        }),
    ))
}

/// PUT /api/v1/nav-links/{id}
pub async fn update_nav_link(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateNavLink>,
) -> AppResult<impl IntoResponse> {
    let link = NavLinkRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("NavLink", id))?;
    Ok(Json(DataResponse {
        data: NavLinkView::from(link),
    }))
}

/// DELETE /api/v1/nav-links/{id}
pub async fn delete_nav_link(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if NavLinkRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("NavLink", id))
    }
}
