use guide_core::error::CoreError;

/// Error returned by repositories: either a domain error raised before any
/// SQL ran, or a raw driver error.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Collapse into the domain taxonomy. Driver errors are classified by
    /// SQLSTATE with [`classify_sqlx_error`].
    pub fn into_core(self) -> CoreError {
        match self {
            DbError::Core(err) => err,
            DbError::Sqlx(err) => classify_sqlx_error(&err),
        }
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        err.into_core()
    }
}

/// Map a sqlx error onto [`CoreError`].
///
/// - `40001` serialization failure and `40P01` deadlock: `Conflict`
/// - `23505` unique violation: `Conflict`
/// - `23514` check, `23503` foreign key, `23502` not null: `Constraint`
/// - anything else: `Internal`
pub fn classify_sqlx_error(err: &sqlx::Error) -> CoreError {
    let sqlx::Error::Database(db_err) = err else {
        return CoreError::Internal(err.to_string());
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some("40001") | Some("40P01") => {
            CoreError::Conflict("Concurrent modification detected, try again".to_string())
        }
        Some("23505") => CoreError::Conflict(format!(
            "Duplicate value violates unique constraint: {constraint}"
        )),
        Some("23514") | Some("23503") | Some("23502") => {
            CoreError::Constraint(format!("{constraint}: {}", db_err.message()))
        }
        _ => CoreError::Internal(db_err.to_string()),
    }
}
