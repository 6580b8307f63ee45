//! Upload endpoint for media block files.
//!
//! The stored path is returned to the caller, which then sets it as the
//! block's `media_file`. Files are served back under `/media`.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use guide_core::media::upload_path;
use guide_core::types::DbId;
use guide_db::repositories::QaItemRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::guide::MEDIA_URL_PREFIX;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body limit for uploads.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct StoredMedia {
    /// Value for the block's `media_file` column.
    pub media_file: String,
    /// Public URL of the stored file.
    pub url: String,
    pub size_bytes: usize,
}

/// POST /api/v1/items/{id}/media
///
/// Multipart form with a required `file` field.
pub async fn upload_media(
    State(state): State<AppState>,
    Path(qa_item_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    QaItemRepo::find_by_id(&state.pool, qa_item_id)
        .await?
        .ok_or(AppError::not_found("QaItem", qa_item_id))?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((filename, data.to_vec()));
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let media_file = upload_path(qa_item_id, &filename);
    let target = state.config.media_root.join(&media_file);
    if let Some(dir) = target.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
    }
    tokio::fs::write(&target, &data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::info!(qa_item_id, media_file = %media_file, size_bytes = data.len(), "Media stored");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StoredMedia {
                url: format!("{MEDIA_URL_PREFIX}/{media_file}"),
                size_bytes: data.len(),
                media_file,
            },
        }),
    ))
}
