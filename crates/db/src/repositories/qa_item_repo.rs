//! Repository for the `qa_items` table.

use guide_core::error::{validate_input, CoreError};
use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::types::{DbId, Position};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::qa_item::{CreateQaItem, QaItem, UpdateQaItem};
use crate::positioning::{compact_after_remove, lock_scope, place_new, reposition, PgTx};
use crate::repositories::{ensure_unchanged, lock_parent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, subcategory_id, question, status, position, is_active, created_at, updated_at";

/// Provides CRUD operations for QA items.
pub struct QaItemRepo;

impl QaItemRepo {
    /// Insert a QA item under `subcategory_id`. Status defaults to `draft`.
    pub async fn create(
        pool: &PgPool,
        subcategory_id: DbId,
        input: &CreateQaItem,
    ) -> DbResult<QaItem> {
        validate_input(input)?;
        let scope = ScopeKey::QaItems { subcategory_id };

        let mut tx = pool.begin().await?;
        if !lock_parent(&mut tx, "subcategories", subcategory_id).await? {
            return Err(CoreError::NotFound {
                entity: "Subcategory",
                id: subcategory_id,
            }
            .into());
        }
        lock_scope(&mut tx, &scope).await?;
        let position = place_new(&mut tx, &scope, input.position).await?;

        let query = format!(
            "INSERT INTO qa_items (subcategory_id, question, status, position, is_active) \
             VALUES ($1, $2, COALESCE($3, 'draft'), $4, COALESCE($5, true)) \
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, QaItem>(&query)
            .bind(subcategory_id)
            .bind(input.question.trim())
            .bind(input.status.map(|s| s.as_str()))
            .bind(position)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(qa_item_id = item.id, subcategory_id, position, "QA item created");
        Ok(item)
    }

    /// Find a QA item by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QaItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qa_items WHERE id = $1");
        sqlx::query_as::<_, QaItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every item of a subcategory in position order, any status.
    pub async fn list_by_subcategory(
        pool: &PgPool,
        subcategory_id: DbId,
    ) -> Result<Vec<QaItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qa_items WHERE subcategory_id = $1 ORDER BY position, id"
        );
        sqlx::query_as::<_, QaItem>(&query)
            .bind(subcategory_id)
            .fetch_all(pool)
            .await
    }

    /// Update a QA item. Only non-`None` fields are applied.
    ///
    /// The owning subcategory cannot change. Returns `None` if no row with
    /// the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQaItem,
    ) -> DbResult<Option<QaItem>> {
        validate_input(input)?;

        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        ensure_unchanged("subcategory_id", existing.subcategory_id, input.subcategory_id)?;
        let scope = existing.scope_key();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;

        let Some(current) = Self::find_in_tx(&mut tx, id).await? else {
            return Ok(None);
        };
        if let Some(requested) = input.position {
            reposition(&mut tx, &scope, id, current.position, requested).await?;
        }

        let query = format!(
            "UPDATE qa_items SET \
                question = COALESCE($2, question), \
                status = COALESCE($3, status), \
                is_active = COALESCE($4, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, QaItem>(&query)
            .bind(id)
            .bind(input.question.as_deref().map(str::trim))
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            qa_item_id = id,
            status = item.status.as_str(),
            position = item.position,
            "QA item updated",
        );
        Ok(Some(item))
    }

    /// Delete a QA item with its blocks; siblings close the gap.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<bool> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(false);
        };
        let scope = existing.scope_key();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;

        let removed = sqlx::query_scalar::<_, Position>(
            "DELETE FROM qa_items WHERE id = $1 RETURNING position",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(position) = removed else {
            return Ok(false);
        };

        compact_after_remove(&mut tx, &scope, position).await?;
        tx.commit().await?;
        tracing::info!(qa_item_id = id, position, "QA item deleted");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn find_in_tx(tx: &mut PgTx<'_>, id: DbId) -> Result<Option<QaItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qa_items WHERE id = $1");
        sqlx::query_as::<_, QaItem>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}
