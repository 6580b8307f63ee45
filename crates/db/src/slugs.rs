//! Unique slug resolution inside a write transaction.
//!
//! Callers take the relevant scope lock first (the global products scope for
//! products, the product's subcategory scope for subcategories), so two
//! concurrent creates can never settle on the same candidate. The unique
//! constraints `uq_products_slug` and `uq_subcategories_product_slug` remain
//! as a backstop.

use guide_core::error::CoreError;
use guide_core::slug::{validate_slug, SlugCandidates, MAX_SLUG_LENGTH};
use guide_core::types::DbId;

use crate::error::{DbError, DbResult};
use crate::positioning::PgTx;

/// Where a slug must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugScope {
    Products,
    Subcategories { product_id: DbId },
}

async fn slug_taken(
    tx: &mut PgTx<'_>,
    scope: SlugScope,
    slug: &str,
    exclude_id: Option<DbId>,
) -> Result<bool, sqlx::Error> {
    match scope {
        SlugScope::Products => {
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products \
                 WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
            )
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&mut **tx)
            .await
        }
        SlugScope::Subcategories { product_id } => {
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM subcategories \
                 WHERE product_id = $1 AND slug = $2 AND ($3::BIGINT IS NULL OR id <> $3))",
            )
            .bind(product_id)
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&mut **tx)
            .await
        }
    }
}

/// First free slug derived from `name`: `base`, `base-2`, `base-3`, ...
pub async fn derive_slug(tx: &mut PgTx<'_>, scope: SlugScope, name: &str) -> DbResult<String> {
    for candidate in SlugCandidates::new(name, MAX_SLUG_LENGTH) {
        if !slug_taken(tx, scope, &candidate, None).await? {
            tracing::debug!(?scope, slug = %candidate, "Derived slug");
            return Ok(candidate);
        }
    }
    Err(DbError::Core(CoreError::Internal(format!(
        "Slug candidates exhausted for '{name}'"
    ))))
}

/// Check an explicitly supplied slug for format and uniqueness.
///
/// `exclude_id` is the row being updated, which may keep its own slug.
pub async fn ensure_slug_available(
    tx: &mut PgTx<'_>,
    scope: SlugScope,
    slug: &str,
    exclude_id: Option<DbId>,
) -> DbResult<()> {
    validate_slug(slug, MAX_SLUG_LENGTH).map_err(|e| CoreError::Validation(vec![e]))?;
    if slug_taken(tx, scope, slug, exclude_id).await? {
        return Err(CoreError::field("slug", format!("Slug '{slug}' is already in use")).into());
    }
    Ok(())
}

/// Use `explicit` when given (empty counts as absent), otherwise derive
/// from `name`.
pub async fn resolve_slug(
    tx: &mut PgTx<'_>,
    scope: SlugScope,
    name: &str,
    explicit: Option<&str>,
) -> DbResult<String> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => {
            ensure_slug_available(tx, scope, slug, None).await?;
            Ok(slug.to_string())
        }
        None => derive_slug(tx, scope, name).await,
    }
}
