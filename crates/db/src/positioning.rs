//! Transactional executor for the ordering plans in `guide_core::ordering`.
//!
//! Each scope has a row in `position_scopes`. A writer upserts that row and
//! locks it with `SELECT ... FOR UPDATE` before it reads or shifts any
//! position in the scope, so concurrent writers to the same scope serialize
//! while writers to different scopes never touch the same lock. Sibling rows
//! themselves are not locked.
//!
//! Every function except [`lock_scope`] and [`positions_in`] assumes the
//! caller already holds the scope lock in `tx`.

use guide_core::ordering::{plan_insert, plan_move, plan_remove, ScopeKey, Shift};
use guide_core::types::{DbId, Position};
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, PgExecutor, Postgres};

pub type PgTx<'c> = sqlx::Transaction<'c, Postgres>;

// ---------------------------------------------------------------------------
// Scope -> SQL
// ---------------------------------------------------------------------------

enum ScopeValue {
    All,
    Id(DbId),
    Text(&'static str),
}

/// Table and filter selecting the rows of one scope.
struct ScopeTable {
    table: &'static str,
    column: &'static str,
    value: ScopeValue,
}

impl ScopeTable {
    fn of(scope: &ScopeKey) -> Self {
        match *scope {
            ScopeKey::Global { entity } => Self {
                table: entity,
                column: "",
                value: ScopeValue::All,
            },
            ScopeKey::Subcategories { product_id } => Self {
                table: "subcategories",
                column: "product_id",
                value: ScopeValue::Id(product_id),
            },
            ScopeKey::QaItems { subcategory_id } => Self {
                table: "qa_items",
                column: "subcategory_id",
                value: ScopeValue::Id(subcategory_id),
            },
            ScopeKey::QaBlocks { qa_item_id } => Self {
                table: "qa_blocks",
                column: "qa_item_id",
                value: ScopeValue::Id(qa_item_id),
            },
            ScopeKey::NavLinks { placement } => Self {
                table: "nav_links",
                column: "placement",
                value: ScopeValue::Text(placement.as_str()),
            },
        }
    }

    /// SQL predicate for the scope, using placeholder `$param` if needed.
    fn condition(&self, param: usize) -> String {
        match self.value {
            ScopeValue::All => "TRUE".to_string(),
            ScopeValue::Id(_) | ScopeValue::Text(_) => format!("{} = ${param}", self.column),
        }
    }

    fn bind(&self, args: &mut PgArguments) -> Result<(), sqlx::Error> {
        match self.value {
            ScopeValue::All => Ok(()),
            ScopeValue::Id(id) => args.add(id),
            ScopeValue::Text(text) => args.add(text),
        }
        .map_err(sqlx::Error::Encode)
    }
}

fn args() -> PgArguments {
    PgArguments::default()
}

fn push<'q, T>(args: &mut PgArguments, value: T) -> Result<(), sqlx::Error>
where
    T: 'q + sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres>,
{
    args.add(value).map_err(sqlx::Error::Encode)
}

// ---------------------------------------------------------------------------
// Locking and reads
// ---------------------------------------------------------------------------

/// Take the scope lock for the rest of the transaction.
///
/// Blocks while another transaction holds the same scope.
pub async fn lock_scope(tx: &mut PgTx<'_>, scope: &ScopeKey) -> Result<(), sqlx::Error> {
    let key = scope.lock_key();

    sqlx::query(
        "INSERT INTO position_scopes (scope_key) VALUES ($1) \
         ON CONFLICT (scope_key) DO NOTHING",
    )
    .bind(&key)
    .execute(&mut **tx)
    .await?;

    sqlx::query("SELECT scope_key FROM position_scopes WHERE scope_key = $1 FOR UPDATE")
        .bind(&key)
        .execute(&mut **tx)
        .await?;

    tracing::debug!(scope = %scope, "Scope lock acquired");
    Ok(())
}

/// Highest position in the scope, `0` when empty.
pub async fn last_position(tx: &mut PgTx<'_>, scope: &ScopeKey) -> Result<Position, sqlx::Error> {
    let target = ScopeTable::of(scope);
    let query = format!(
        "SELECT COALESCE(MAX(position), 0) FROM {} WHERE {}",
        target.table,
        target.condition(1)
    );
    let mut args = args();
    target.bind(&mut args)?;
    sqlx::query_scalar_with::<_, Position, _>(&query, args)
        .fetch_one(&mut **tx)
        .await
}

/// `(id, position)` of every row in the scope, in position order.
pub async fn positions_in<'e>(
    executor: impl PgExecutor<'e>,
    scope: &ScopeKey,
) -> Result<Vec<(DbId, Position)>, sqlx::Error> {
    let target = ScopeTable::of(scope);
    let query = format!(
        "SELECT id, position FROM {} WHERE {} ORDER BY position, id",
        target.table,
        target.condition(1)
    );
    let mut args = args();
    target.bind(&mut args)?;
    sqlx::query_as_with::<_, (DbId, Position), _>(&query, args)
        .fetch_all(executor)
        .await
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

async fn apply_shift(
    tx: &mut PgTx<'_>,
    scope: &ScopeKey,
    shift: &Shift,
) -> Result<u64, sqlx::Error> {
    let target = ScopeTable::of(scope);
    let query = format!(
        "UPDATE {} SET position = position + $1 \
         WHERE position BETWEEN $2 AND $3 AND {}",
        target.table,
        target.condition(4)
    );
    let mut args = args();
    push(&mut args, shift.delta)?;
    push(&mut args, shift.from)?;
    push(&mut args, shift.to)?;
    target.bind(&mut args)?;

    let result = sqlx::query_with(&query, args).execute(&mut **tx).await?;
    tracing::debug!(
        scope = %scope,
        from = shift.from,
        to = shift.to,
        delta = shift.delta,
        rows = result.rows_affected(),
        "Shifted positions",
    );
    Ok(result.rows_affected())
}

/// Make room for a new row and return the position it must be inserted at.
///
/// `None` or a value below 1 appends; a value past the end is clamped to
/// `n + 1`.
pub async fn place_new(
    tx: &mut PgTx<'_>,
    scope: &ScopeKey,
    requested: Option<Position>,
) -> Result<Position, sqlx::Error> {
    let last = last_position(tx, scope).await?;
    let plan = plan_insert(requested, last);
    if let Some(shift) = &plan.shift {
        apply_shift(tx, scope, shift).await?;
    }
    tracing::debug!(scope = %scope, ?requested, position = plan.position, "Placed new entity");
    Ok(plan.position)
}

/// Move row `id` from `current` towards `requested` and return where it
/// ended up. Out-of-range targets are clamped to `1..=n`.
pub async fn reposition(
    tx: &mut PgTx<'_>,
    scope: &ScopeKey,
    id: DbId,
    current: Position,
    requested: Position,
) -> Result<Position, sqlx::Error> {
    let last = last_position(tx, scope).await?;
    let Some(plan) = plan_move(current, requested, last) else {
        return Ok(current);
    };

    apply_shift(tx, scope, &plan.shift).await?;

    let target = ScopeTable::of(scope);
    let query = format!("UPDATE {} SET position = $1 WHERE id = $2", target.table);
    sqlx::query(&query)
        .bind(plan.to)
        .bind(id)
        .execute(&mut **tx)
        .await?;

    tracing::debug!(scope = %scope, id, from = plan.from, to = plan.to, "Moved entity");
    Ok(plan.to)
}

/// Close the gap left by a row that was deleted from `removed`.
pub async fn compact_after_remove(
    tx: &mut PgTx<'_>,
    scope: &ScopeKey,
    removed: Position,
) -> Result<(), sqlx::Error> {
    let last = last_position(tx, scope).await?;
    if let Some(shift) = plan_remove(removed, last) {
        apply_shift(tx, scope, &shift).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use guide_core::nav::LinkPlacement;

    use super::*;

    #[test]
    fn global_scope_has_no_filter() {
        let t = ScopeTable::of(&ScopeKey::Global { entity: "products" });
        assert_eq!(t.table, "products");
        assert_eq!(t.condition(3), "TRUE");
    }

    #[test]
    fn parent_scopes_filter_on_parent_column() {
        let t = ScopeTable::of(&ScopeKey::QaBlocks { qa_item_id: 9 });
        assert_eq!(t.table, "qa_blocks");
        assert_eq!(t.condition(4), "qa_item_id = $4");

        let t = ScopeTable::of(&ScopeKey::NavLinks {
            placement: LinkPlacement::Social,
        });
        assert_eq!(t.condition(1), "placement = $1");
    }
}
