//! Postgres persistence for the guide.
//!
//! Repositories are zero-sized structs whose methods take `&PgPool`. Every
//! write that touches `position` runs in one transaction holding the scope
//! lock described in [`positioning`].

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod positioning;
pub mod repositories;
pub mod selectors;
pub mod slugs;

pub use error::{DbError, DbResult};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
