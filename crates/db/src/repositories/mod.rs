//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Reads return `sqlx::Error`; writes return
//! [`DbResult`](crate::DbResult) because they validate input first.

pub mod nav_link_repo;
pub mod product_repo;
pub mod qa_block_repo;
pub mod qa_item_repo;
pub mod subcategory_repo;

pub use nav_link_repo::NavLinkRepo;
pub use product_repo::ProductRepo;
pub use qa_block_repo::QaBlockRepo;
pub use qa_item_repo::QaItemRepo;
pub use subcategory_repo::SubcategoryRepo;

use guide_core::error::CoreError;
use guide_core::types::DbId;

use crate::positioning::PgTx;

/// Hold a key-share lock on a parent row so it cannot be deleted before the
/// transaction commits. Returns `false` when the parent does not exist.
pub(crate) async fn lock_parent(
    tx: &mut PgTx<'_>,
    table: &'static str,
    id: DbId,
) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT id FROM {table} WHERE id = $1 FOR KEY SHARE");
    let found = sqlx::query_scalar::<_, DbId>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(found.is_some())
}

/// Reject an attempt to move an entity to another parent or placement.
pub(crate) fn ensure_unchanged<T: PartialEq>(
    field: &str,
    current: T,
    requested: Option<T>,
) -> Result<(), CoreError> {
    match requested {
        Some(value) if value != current => Err(CoreError::field(
            field,
            "Cannot be changed after creation; delete and re-create instead",
        )),
        _ => Ok(()),
    }
}

/// Trimmed, non-empty explicit slug.
pub(crate) fn explicit_slug(slug: Option<&str>) -> Option<&str> {
    slug.map(str::trim).filter(|s| !s.is_empty())
}
