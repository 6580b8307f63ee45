//! Repository for the `nav_links` table.

use guide_core::error::{validate_input, CoreError};
use guide_core::nav::LinkPlacement;
use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::types::{DbId, Position};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::nav_link::{CreateNavLink, NavLink, UpdateNavLink};
use crate::positioning::{compact_after_remove, lock_scope, place_new, reposition, PgTx};
use crate::repositories::ensure_unchanged;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, placement, label, url, icon_name, open_in_new_tab, rel_nofollow, \
    rel_sponsored, rel_noopener, rel_noreferrer, position, is_active, created_at, updated_at";

/// Provides CRUD operations for navigation links.
pub struct NavLinkRepo;

impl NavLinkRepo {
    /// Insert a link into its placement (header by default).
    pub async fn create(pool: &PgPool, input: &CreateNavLink) -> DbResult<NavLink> {
        validate_input(input)?;
        let placement = input.placement.unwrap_or_default();
        let scope = ScopeKey::NavLinks { placement };

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;
        ensure_label_available(&mut tx, placement, input.label.trim(), None).await?;
        let position = place_new(&mut tx, &scope, input.position).await?;

        let query = format!(
            "INSERT INTO nav_links (placement, label, url, icon_name, open_in_new_tab, \
                rel_nofollow, rel_sponsored, rel_noopener, rel_noreferrer, position, is_active) \
             VALUES ($1, $2, $3, $4, COALESCE($5, true), COALESCE($6, false), \
                COALESCE($7, false), COALESCE($8, true), COALESCE($9, true), $10, \
                COALESCE($11, true)) \
             RETURNING {COLUMNS}"
        );
        let link = sqlx::query_as::<_, NavLink>(&query)
            .bind(placement.as_str())
            .bind(input.label.trim())
            .bind(input.url.trim())
            .bind(input.icon_name.as_deref().filter(|s| !s.is_empty()))
            .bind(input.open_in_new_tab)
            .bind(input.rel_nofollow)
            .bind(input.rel_sponsored)
            .bind(input.rel_noopener)
            .bind(input.rel_noreferrer)
            .bind(position)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            nav_link_id = link.id,
            placement = placement.as_str(),
            position,
            "Nav link created",
        );
        Ok(link)
    }

    /// Find a link by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<NavLink>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM nav_links WHERE id = $1");
        sqlx::query_as::<_, NavLink>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List links, optionally restricted to one placement, ordered by
    /// placement then position.
    pub async fn list(
        pool: &PgPool,
        placement: Option<LinkPlacement>,
        include_inactive: bool,
    ) -> Result<Vec<NavLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM nav_links \
             WHERE ($1::TEXT IS NULL OR placement = $1) AND ($2 OR is_active = true) \
             ORDER BY placement, position, id"
        );
        sqlx::query_as::<_, NavLink>(&query)
            .bind(placement.map(|p| p.as_str()))
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a link. Only non-`None` fields are applied; the placement
    /// cannot change. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateNavLink,
    ) -> DbResult<Option<NavLink>> {
        validate_input(input)?;

        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        ensure_unchanged("placement", existing.placement, input.placement)?;
        let scope = existing.scope_key();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;

        let Some(current) = Self::find_in_tx(&mut tx, id).await? else {
            return Ok(None);
        };
        if let Some(label) = input.label.as_deref() {
            ensure_label_available(&mut tx, current.placement, label.trim(), Some(id)).await?;
        }
        if let Some(requested) = input.position {
            reposition(&mut tx, &scope, id, current.position, requested).await?;
        }

        let query = format!(
            "UPDATE nav_links SET \
                label = COALESCE($2, label), \
                url = COALESCE($3, url), \
                icon_name = CASE WHEN $4::TEXT IS NULL THEN icon_name \
                                 ELSE NULLIF($4, '') END, \
                open_in_new_tab = COALESCE($5, open_in_new_tab), \
                rel_nofollow = COALESCE($6, rel_nofollow), \
                rel_sponsored = COALESCE($7, rel_sponsored), \
                rel_noopener = COALESCE($8, rel_noopener), \
                rel_noreferrer = COALESCE($9, rel_noreferrer), \
                is_active = COALESCE($10, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let link = sqlx::query_as::<_, NavLink>(&query)
            .bind(id)
            .bind(input.label.as_deref().map(str::trim))
            .bind(input.url.as_deref().map(str::trim))
            .bind(input.icon_name.as_deref())
            .bind(input.open_in_new_tab)
            .bind(input.rel_nofollow)
            .bind(input.rel_sponsored)
            .bind(input.rel_noopener)
            .bind(input.rel_noreferrer)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(nav_link_id = id, position = link.position, "Nav link updated");
        Ok(Some(link))
    }

    /// Delete a link; the rest of its placement closes the gap.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<bool> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(false);
        };
        let scope = existing.scope_key();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;

        let removed = sqlx::query_scalar::<_, Position>(
            "DELETE FROM nav_links WHERE id = $1 RETURNING position",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(position) = removed else {
            return Ok(false);
        };

        compact_after_remove(&mut tx, &scope, position).await?;
        tx.commit().await?;
        tracing::info!(nav_link_id = id, position, "Nav link deleted");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn find_in_tx(tx: &mut PgTx<'_>, id: DbId) -> Result<Option<NavLink>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM nav_links WHERE id = $1");
        sqlx::query_as::<_, NavLink>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

/// Labels are unique within a placement. Runs under the placement's scope
/// lock, so the check and the write see the same rows.
async fn ensure_label_available(
    tx: &mut PgTx<'_>,
    placement: LinkPlacement,
    label: &str,
    exclude_id: Option<DbId>,
) -> DbResult<()> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM nav_links \
         WHERE placement = $1 AND label = $2 AND ($3::BIGINT IS NULL OR id <> $3))",
    )
    .bind(placement.as_str())
    .bind(label)
    .bind(exclude_id)
    .fetch_one(&mut **tx)
    .await?;
    if taken {
        return Err(CoreError::field(
            "label",
            format!("Label '{label}' is already used in {}", placement.as_str()),
        )
        .into());
    }
    Ok(())
}
