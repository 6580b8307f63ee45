//! Repository for the `products` table.

use guide_core::error::validate_input;
use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::types::{DbId, Position};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::product::{CreateProduct, Product, UpdateProduct};
use crate::positioning::{compact_after_remove, lock_scope, place_new, reposition, PgTx};
use crate::repositories::explicit_slug;
use crate::slugs::{ensure_slug_available, resolve_slug, SlugScope};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, position, is_active, created_at, updated_at";

/// All products share one ordering scope.
const SCOPE: ScopeKey = ScopeKey::Global {
    entity: Product::ENTITY,
};

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product at the requested position (appending by default).
    ///
    /// The slug is derived from the name when not supplied.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> DbResult<Product> {
        validate_input(input)?;
        let name = input.name.trim();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &SCOPE).await?;

        let slug = resolve_slug(&mut tx, SlugScope::Products, name, input.slug.as_deref()).await?;
        let position = place_new(&mut tx, &SCOPE, input.position).await?;

        let query = format!(
            "INSERT INTO products (name, slug, position, is_active) \
             VALUES ($1, $2, $3, COALESCE($4, true)) \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(name)
            .bind(&slug)
            .bind(position)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(product_id = product.id, slug = %product.slug, position, "Product created");
        Ok(product)
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product by its slug, active or not.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE slug = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List products in position order, optionally including inactive ones.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Product>, sqlx::Error> {
        let query = if include_inactive {
            format!("SELECT {COLUMNS} FROM products ORDER BY position, id")
        } else {
            format!("SELECT {COLUMNS} FROM products WHERE is_active = true ORDER BY position, id")
        };
        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// Update a product. Only non-`None` fields are applied; a position moves
    /// the product and re-flows its siblings.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> DbResult<Option<Product>> {
        validate_input(input)?;

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &SCOPE).await?;

        let Some(current) = Self::find_in_tx(&mut tx, id).await? else {
            return Ok(None);
        };

        let slug = explicit_slug(input.slug.as_deref()).filter(|s| *s != current.slug);
        if let Some(slug) = slug {
            ensure_slug_available(&mut tx, SlugScope::Products, slug, Some(id)).await?;
        }

        if let Some(requested) = input.position {
            reposition(&mut tx, &SCOPE, id, current.position, requested).await?;
        }

        let query = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                slug = COALESCE($3, slug), \
                is_active = COALESCE($4, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(slug)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(product_id = id, position = product.position, "Product updated");
        Ok(Some(product))
    }

    /// Delete a product and, by cascade, everything below it. Remaining
    /// products close the gap.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<bool> {
        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &SCOPE).await?;

        let removed = sqlx::query_scalar::<_, Position>(
            "DELETE FROM products WHERE id = $1 RETURNING position",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(position) = removed else {
            return Ok(false);
        };

        compact_after_remove(&mut tx, &SCOPE, position).await?;
        tx.commit().await?;
        tracing::info!(product_id = id, position, "Product deleted");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn find_in_tx(tx: &mut PgTx<'_>, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}
