//! Repository for the `qa_blocks` table.
//!
//! Every write turns the submitted columns into a [`BlockContent`] first, so
//! kind-specific validation runs before any SQL. Only the columns of the
//! block's kind are written; columns of other kinds keep their stored values.
//! Heading anchors are derived once, after the block's
//! position is known, and kept from then on.

use std::collections::{HashMap, HashSet};

use guide_core::block::{BlockContent, BlockFields, BlockKind};
use guide_core::error::{CoreError, FieldError};
use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::types::{DbId, Position};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::qa_block::{CreateQaBlock, QaBlock, ReplaceBlocks, UpdateQaBlock};
use crate::positioning::{compact_after_remove, lock_scope, place_new, reposition, PgTx};
use crate::repositories::{ensure_unchanged, lock_parent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, qa_item_id, kind, heading_text, heading_level, heading_anchor, \
    text_md, media_file, media_url, alt_text, caption, position, is_active, created_at, updated_at";

/// Provides CRUD and batch operations for QA blocks.
pub struct QaBlockRepo;

impl QaBlockRepo {
    /// Insert a block under `qa_item_id`.
    ///
    /// Fails with a field-attributed `Validation` error if the block does not
    /// satisfy its kind, and with `NotFound` if the item does not exist.
    pub async fn create(
        pool: &PgPool,
        qa_item_id: DbId,
        input: &CreateQaBlock,
    ) -> DbResult<QaBlock> {
        let base = input.fields.clone().normalized();
        let mut content = BlockContent::from_fields(input.kind, base.clone())?;
        let scope = ScopeKey::QaBlocks { qa_item_id };

        let mut tx = pool.begin().await?;
        lock_item(&mut tx, qa_item_id).await?;
        lock_scope(&mut tx, &scope).await?;

        let position = place_new(&mut tx, &scope, input.position).await?;
        content.assign_anchor(position);

        let block = Self::insert_in_tx(
            &mut tx,
            qa_item_id,
            input.kind,
            content.write_over(base),
            position,
            input.is_active,
        )
        .await?;

        tx.commit().await?;
        tracing::info!(
            block_id = block.id,
            qa_item_id,
            kind = block.kind.as_str(),
            position,
            "QA block created",
        );
        Ok(block)
    }

    /// Find a block by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QaBlock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qa_blocks WHERE id = $1");
        sqlx::query_as::<_, QaBlock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the blocks of an item in position order.
    pub async fn list_by_item(
        pool: &PgPool,
        qa_item_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<QaBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qa_blocks \
             WHERE qa_item_id = $1 AND ($2 OR is_active = true) \
             ORDER BY position, id"
        );
        sqlx::query_as::<_, QaBlock>(&query)
            .bind(qa_item_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a block, possibly changing its kind.
    ///
    /// Submitted fields are merged over the stored ones and the result is
    /// validated against the target kind before anything is written. An
    /// existing heading anchor is never recomputed. Returns `None` if no row
    /// with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQaBlock,
    ) -> DbResult<Option<QaBlock>> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        ensure_unchanged("qa_item_id", existing.qa_item_id, input.qa_item_id)?;
        let scope = existing.scope_key();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;

        let Some(current) = Self::find_in_tx(&mut tx, id).await? else {
            return Ok(None);
        };

        let kind = input.kind.unwrap_or(current.kind);
        let merged = input.merge_into(current.fields());
        let mut content = BlockContent::from_fields(kind, merged.clone())?;
        content.inherit_anchor(current.heading_anchor.as_deref());

        let position = match input.position {
            Some(requested) => {
                reposition(&mut tx, &scope, id, current.position, requested).await?
            }
            None => current.position,
        };
        content.assign_anchor(position);

        let block = Self::update_in_tx(
            &mut tx,
            id,
            kind,
            content.write_over(merged),
            position,
            input.is_active,
        )
        .await?;

        tx.commit().await?;
        if kind != current.kind {
            tracing::info!(
                block_id = id,
                from = current.kind.as_str(),
                to = kind.as_str(),
                "QA block kind changed",
            );
        }
        tracing::info!(block_id = id, position, "QA block updated");
        Ok(Some(block))
    }

    /// Delete a block; siblings close the gap.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<bool> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(false);
        };
        let scope = existing.scope_key();

        let mut tx = pool.begin().await?;
        lock_scope(&mut tx, &scope).await?;

        let removed = sqlx::query_scalar::<_, Position>(
            "DELETE FROM qa_blocks WHERE id = $1 RETURNING position",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(position) = removed else {
            return Ok(false);
        };

        compact_after_remove(&mut tx, &scope, position).await?;
        tx.commit().await?;
        tracing::info!(block_id = id, position, "QA block deleted");
        Ok(true)
    }

    /// Save an item's complete block list in submitted order.
    ///
    /// Every entry is validated first; errors are keyed `blocks[i].field`.
    /// Entries with an `id` update that block, entries without one are
    /// created, and blocks of the item missing from the list are deleted.
    /// Positions become `1..=n` in list order. All of it runs in one
    /// transaction under the item's scope lock.
    pub async fn replace_all(
        pool: &PgPool,
        qa_item_id: DbId,
        input: &ReplaceBlocks,
    ) -> DbResult<Vec<QaBlock>> {
        let contents = validate_batch(input)?;
        let scope = ScopeKey::QaBlocks { qa_item_id };

        let mut tx = pool.begin().await?;
        lock_item(&mut tx, qa_item_id).await?;
        lock_scope(&mut tx, &scope).await?;

        let query = format!("SELECT {COLUMNS} FROM qa_blocks WHERE qa_item_id = $1");
        let stored: HashMap<DbId, QaBlock> = sqlx::query_as::<_, QaBlock>(&query)
            .bind(qa_item_id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|block| (block.id, block))
            .collect();

        let unknown: Vec<FieldError> = input
            .blocks
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.id.filter(|id| !stored.contains_key(id)).map(|_| i))
            .map(|i| {
                FieldError::new("id", "Block does not belong to this item")
                    .nested(&format!("blocks[{i}]"))
            })
            .collect();
        CoreError::check(unknown)?;

        let kept: Vec<DbId> = input.blocks.iter().filter_map(|b| b.id).collect();
        let deleted =
            sqlx::query("DELETE FROM qa_blocks WHERE qa_item_id = $1 AND id <> ALL($2)")
                .bind(qa_item_id)
                .bind(&kept)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let mut saved = Vec::with_capacity(input.blocks.len());
        for (i, (entry, mut content)) in input.blocks.iter().zip(contents).enumerate() {
            let position = i as Position + 1;
            let kind = content.kind();
            let block = match entry.id.and_then(|id| stored.get(&id)) {
                Some(previous) => {
                    content.inherit_anchor(previous.heading_anchor.as_deref());
                    content.assign_anchor(position);
                    let base = entry.fields.clone().overlay(previous.fields());
                    let fields = content.write_over(base);
                    let id = previous.id;
                    Self::update_in_tx(&mut tx, id, kind, fields, position, entry.is_active).await?
                }
                None => {
                    content.assign_anchor(position);
                    let fields = content.write_over(entry.fields.clone().normalized());
                    let active = entry.is_active;
                    Self::insert_in_tx(&mut tx, qa_item_id, kind, fields, position, active).await?
                }
            };
            saved.push(block);
        }

        tx.commit().await?;
        tracing::info!(qa_item_id, saved = saved.len(), deleted, "QA blocks replaced");
        Ok(saved)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn find_in_tx(tx: &mut PgTx<'_>, id: DbId) -> Result<Option<QaBlock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qa_blocks WHERE id = $1");
        sqlx::query_as::<_, QaBlock>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn insert_in_tx(
        tx: &mut PgTx<'_>,
        qa_item_id: DbId,
        kind: BlockKind,
        fields: BlockFields,
        position: Position,
        is_active: Option<bool>,
    ) -> Result<QaBlock, sqlx::Error> {
        let query = format!(
            "INSERT INTO qa_blocks (qa_item_id, kind, heading_text, heading_level, \
                heading_anchor, text_md, media_file, media_url, alt_text, caption, \
                position, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, true)) \
             RETURNING {COLUMNS}"
        );
        bind_fields(sqlx::query_as::<_, QaBlock>(&query).bind(qa_item_id), kind, fields)
            .bind(position)
            .bind(is_active)
            .fetch_one(&mut **tx)
            .await
    }

    async fn update_in_tx(
        tx: &mut PgTx<'_>,
        id: DbId,
        kind: BlockKind,
        fields: BlockFields,
        position: Position,
        is_active: Option<bool>,
    ) -> Result<QaBlock, sqlx::Error> {
        let query = format!(
            "UPDATE qa_blocks SET \
                kind = $2, heading_text = $3, heading_level = $4, heading_anchor = $5, \
                text_md = $6, media_file = $7, media_url = $8, alt_text = $9, caption = $10, \
                position = $11, is_active = COALESCE($12, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        bind_fields(sqlx::query_as::<_, QaBlock>(&query).bind(id), kind, fields)
            .bind(position)
            .bind(is_active)
            .fetch_one(&mut **tx)
            .await
    }
}

type BlockQuery<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, QaBlock, sqlx::postgres::PgArguments>;

/// Bind `kind` and the eight kind-dependent columns, in table order.
fn bind_fields(query: BlockQuery<'_>, kind: BlockKind, f: BlockFields) -> BlockQuery<'_> {
    query
        .bind(kind.as_str())
        .bind(f.heading_text)
        .bind(f.heading_level)
        .bind(f.heading_anchor)
        .bind(f.text_md)
        .bind(f.media_file)
        .bind(f.media_url)
        .bind(f.alt_text)
        .bind(f.caption)
}

async fn lock_item(tx: &mut PgTx<'_>, qa_item_id: DbId) -> DbResult<()> {
    if !lock_parent(tx, "qa_items", qa_item_id).await? {
        return Err(CoreError::NotFound {
            entity: "QaItem",
            id: qa_item_id,
        }
        .into());
    }
    Ok(())
}

/// Validate every entry of a batch, collecting all errors with indexed
/// field names.
fn validate_batch(input: &ReplaceBlocks) -> Result<Vec<BlockContent>, CoreError> {
    if input.blocks.is_empty() {
        return Err(CoreError::field("blocks", "At least one block is required"));
    }

    let mut errors = Vec::new();
    let mut contents = Vec::with_capacity(input.blocks.len());
    let mut seen = HashSet::new();

    for (i, entry) in input.blocks.iter().enumerate() {
        let prefix = format!("blocks[{i}]");
        if let Some(id) = entry.id {
            if !seen.insert(id) {
                errors.push(FieldError::new("id", "Block listed more than once").nested(&prefix));
            }
        }
        match BlockContent::from_fields(entry.kind, entry.fields.clone()) {
            Ok(content) => contents.push(content),
            Err(CoreError::Validation(field_errors)) => {
                errors.extend(field_errors.into_iter().map(|e| e.nested(&prefix)));
            }
            Err(other) => return Err(other),
        }
    }

    CoreError::check(errors)?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::models::qa_block::BlockInput;

    fn entry(id: Option<DbId>, kind: BlockKind, fields: BlockFields) -> BlockInput {
        BlockInput {
            id,
            kind,
            fields,
            is_active: None,
        }
    }

    fn text(md: &str) -> BlockFields {
        BlockFields {
            text_md: Some(md.to_string()),
            ..BlockFields::default()
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = validate_batch(&ReplaceBlocks { blocks: vec![] }).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref e) if e[0].field == "blocks");
    }

    #[test]
    fn batch_errors_are_indexed() {
        let input = ReplaceBlocks {
            blocks: vec![
                entry(None, BlockKind::Text, text("ok")),
                entry(None, BlockKind::Text, text("")),
                entry(None, BlockKind::Video, BlockFields::default()),
            ],
        };
        let err = validate_batch(&input).unwrap_err();
        let CoreError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["blocks[1].text_md", "blocks[2].media_file", "blocks[2].media_url"]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let input = ReplaceBlocks {
            blocks: vec![
                entry(Some(4), BlockKind::Text, text("a")),
                entry(Some(4), BlockKind::Text, text("b")),
            ],
        };
        let err = validate_batch(&input).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref e) if e[0].field == "blocks[1].id");
    }

    #[test]
    fn valid_batch_yields_contents_in_order() {
        let input = ReplaceBlocks {
            blocks: vec![
                entry(None, BlockKind::Text, text("first")),
                entry(None, BlockKind::Text, text("second")),
            ],
        };
        let contents = validate_batch(&input).unwrap();
        assert_eq!(contents.len(), 2);
        assert_matches!(&contents[1], BlockContent::Text { markdown } if markdown == "second");
    }
}
