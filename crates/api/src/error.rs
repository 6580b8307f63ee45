use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use guide_core::error::{CoreError, FieldError};
use guide_db::error::classify_sqlx_error;
use guide_db::DbError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `guide_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Core(err.into_core())
    }
}

impl AppError {
    /// Shorthand for a missing row looked up by internal ID.
    pub fn not_found(entity: &'static str, id: guide_core::types::DbId) -> Self {
        AppError::Core(CoreError::NotFound { entity, id })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let core = match self {
            AppError::Core(core) => core,
            AppError::Database(err) => classify_sqlx_error(&err),
            AppError::BadRequest(msg) => {
                return error_response(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None);
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                return internal_response();
            }
        };

        match core {
            CoreError::NotFound { entity, id } => error_response(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
                None,
            ),
            CoreError::NotFoundBySlug { entity, slug } => error_response(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} '{slug}' not found"),
                None,
            ),
            CoreError::Validation(fields) => error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(fields),
            ),
            CoreError::Conflict(msg) => {
                tracing::warn!(error = %msg, "Conflicting write");
                error_response(
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("{msg}; try again"),
                    None,
                )
            }
            CoreError::Constraint(msg) => {
                tracing::error!(error = %msg, "Storage constraint violated");
                internal_response()
            }
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal core error");
                internal_response()
            }
        }
    }
}

fn internal_response() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}

fn error_response(
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Option<Vec<FieldError>>,
) -> Response {
    let mut body = json!({
        "error": message,
        "code": code,
    });
    if let Some(fields) = fields {
        body["fields"] = json!(fields);
    }

    (status, axum::Json(body)).into_response()
}
