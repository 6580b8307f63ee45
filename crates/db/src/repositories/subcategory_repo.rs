//! Repository for the `subcategories` table.

use guide_core::error::{validate_input, CoreError};
use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::types::{DbId, Position};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::subcategory::{CreateSubcategory, Subcategory, UpdateSubcategory};
use crate::positioning::{compact_after_remove, lock_scope, place_new, reposition, PgTx};
use crate::repositories::{ensure_unchanged, explicit_slug, lock_parent};
use crate::slugs::{ensure_slug_available, resolve_slug, SlugScope};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, product_id, name, slug, position, is_active, created_at, updated_at";

/// Provides CRUD operations for subcategories.
pub struct SubcategoryRepo;

impl SubcategoryRepo {
    /// Insert a subcategory under `product_id`.
    ///
    /// Fails with `NotFound` if the product does not exist. The slug is
    /// unique within the product and derived from the name when absent.
    pub async fn create(
        pool: &PgPool,
        product_id: DbId,
        input: &CreateSubcategory,
    ) -> DbResult<Subcategory> {
        validate_input(input)?;
        let name = input.name.trim();
        let scope = ScopeKey::Subcategories { product_id };

        let mut tx = pool.begin().await?;
        if !lock_parent(&mut tx, "products", product_id).await? {
            return Err(CoreError::NotFound {
                entity: "Product",
                id: product_id,
            }
            .into());
        }
        lock_scope(&mut tx, &scope).await?;

        let slug_scope = SlugScope::Subcategories { product_id };
        let slug = resolve_slug(&mut tx, slug_scope, name, input.slug.as_deref()).await?;
        let position = place_new(&mut tx, &scope, input.position).await?;

        let query = format!(
            "INSERT INTO subcategories (product_id, name, slug, position, is_active) \
             VALUES ($1, $2, $3, $4, COALESCE($5, true)) \
             RETURNING {COLUMNS}"
        );
        let subcategory = sqlx::query_as::<_, Subcategory>(&query)
            .bind(product_id)
            .bind(name)
            .bind(&slug)
            .bind(position)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            subcategory_id = subcategory.id,
            product_id,
            slug = %subcategory.slug,
            position,
            "Subcategory created",
        );
        Ok(subcategory)
    }

    /// Find a subcategory by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subcategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subcategories WHERE id = $1");
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the subcategories of a product in position order.
    pub async fn list_by_product(
        pool: &PgPool,
        product_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<Subcategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subcategories \
             WHERE product_id = $1 AND ($2 OR is_active = true) \
             ORDER BY position, id"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(product_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a subcategory. Only non-`None` fields are applied.
    ///
    /// The owning product cannot change. Returns `None` if no row with the
    /// given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubcategory,
    ) -> DbResult<Option<Subcategory>> {
        validate_input(input)?;

        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        ensure_unchanged("product_id", existing.product_id, input.product_id)?;
        let scope = existing.scope_key();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;

        let Some(current) = Self::find_in_tx(&mut tx, id).await? else {
            return Ok(None);
        };

        let slug = explicit_slug(input.slug.as_deref()).filter(|s| *s != current.slug);
        if let Some(slug) = slug {
            let slug_scope = SlugScope::Subcategories {
                product_id: current.product_id,
            };
            ensure_slug_available(&mut tx, slug_scope, slug, Some(id)).await?;
        }

        if let Some(requested) = input.position {
            reposition(&mut tx, &scope, id, current.position, requested).await?;
        }

        let query = format!(
            "UPDATE subcategories SET \
                name = COALESCE($2, name), \
                slug = COALESCE($3, slug), \
                is_active = COALESCE($4, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let subcategory = sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(slug)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(subcategory_id = id, position = subcategory.position, "Subcategory updated");
        Ok(Some(subcategory))
    }

    /// Delete a subcategory with its items and blocks; siblings close the gap.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<bool> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(false);
        };
        let scope = existing.scope_key();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;

        let removed = sqlx::query_scalar::<_, Position>(
            "DELETE FROM subcategories WHERE id = $1 RETURNING position",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(position) = removed else {
            return Ok(false);
        };

        compact_after_remove(&mut tx, &scope, position).await?;
        tx.commit().await?;
        tracing::info!(subcategory_id = id, position, "Subcategory deleted");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn find_in_tx(tx: &mut PgTx<'_>, id: DbId) -> Result<Option<Subcategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subcategories WHERE id = $1");
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}
