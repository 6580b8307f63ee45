//! Primitive aliases shared by every crate in the workspace.

/// Database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Timestamps are stored and handled in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// 1-based display position inside an ordering scope.
pub type Position = i32;
