//! Dense 1-based position ordering within a scope.
//!
//! Every orderable entity lives in exactly one [`ScopeKey`]. Within a scope
//! the positions always form the sequence `1..=n`. The functions here compute
//! *plans*: the final position of the entity being written and at most one
//! contiguous window of siblings that must shift by `+1` or `-1`. The `db`
//! crate executes a plan inside a transaction holding the scope lock; the
//! test-only in-memory executors at the bottom of this module run the same
//! plans over slices.

use std::fmt;

use crate::nav::LinkPlacement;
use crate::types::{DbId, Position};

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// Identifies the set of rows whose positions form one dense sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    /// The whole table is one scope.
    Global { entity: &'static str },
    Subcategories { product_id: DbId },
    QaItems { subcategory_id: DbId },
    QaBlocks { qa_item_id: DbId },
    NavLinks { placement: LinkPlacement },
}

impl ScopeKey {
    /// Stable textual key, used as the primary key of the scope lock row.
    pub fn lock_key(&self) -> String {
        match self {
            ScopeKey::Global { entity } => (*entity).to_string(),
            ScopeKey::Subcategories { product_id } => format!("subcategories:product={product_id}"),
            ScopeKey::QaItems { subcategory_id } => {
                format!("qa_items:subcategory={subcategory_id}")
            }
            ScopeKey::QaBlocks { qa_item_id } => format!("qa_blocks:qa_item={qa_item_id}"),
            ScopeKey::NavLinks { placement } => {
                format!("nav_links:placement={}", placement.as_str())
            }
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lock_key())
    }
}

/// Capability every orderable entity implements.
pub trait Positioned {
    /// Table-level name, used for the default global scope.
    const ENTITY: &'static str;

    fn position(&self) -> Position;

    fn set_position(&mut self, position: Position);

    /// The scope this entity is ordered in. Defaults to one global scope.
    fn scope_key(&self) -> ScopeKey {
        ScopeKey::Global {
            entity: Self::ENTITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Siblings with `from <= position <= to` move by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub from: Position,
    pub to: Position,
    pub delta: Position,
}

impl Shift {
    pub fn contains(&self, position: Position) -> bool {
        position >= self.from && position <= self.to
    }

    /// New value for `position` after the shift is applied.
    pub fn apply(&self, position: Position) -> Position {
        if self.contains(position) {
            position + self.delta
        } else {
            position
        }
    }
}

/// Outcome of placing a new entity into a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPlan {
    pub position: Position,
    pub shift: Option<Shift>,
}

/// Outcome of moving an existing entity inside its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub from: Position,
    pub to: Position,
    pub shift: Shift,
}

/// Plan the insertion of a new entity.
///
/// `last` is the highest position currently in the scope (0 when empty).
/// A missing or non-positive request appends. A request past the end is
/// clamped to `last + 1` so no gap can open.
pub fn plan_insert(requested: Option<Position>, last: Position) -> InsertPlan {
    let append = last + 1;
    let position = match requested {
        Some(p) if p >= 1 => p.min(append),
        _ => append,
    };

    let shift = (position < append).then_some(Shift {
        from: position,
        to: last,
        delta: 1,
    });

    InsertPlan { position, shift }
}

/// Plan moving an entity from `old` to `requested`.
///
/// The target is clamped into `1..=last`. Returns `None` when the clamped
/// target equals `old`.
pub fn plan_move(old: Position, requested: Position, last: Position) -> Option<MovePlan> {
    let upper = last.max(old).max(1);
    let to = requested.clamp(1, upper);

    if to == old {
        return None;
    }

    let shift = if to > old {
        Shift {
            from: old + 1,
            to,
            delta: -1,
        }
    } else {
        Shift {
            from: to,
            to: old - 1,
            delta: 1,
        }
    };

    Some(MovePlan {
        from: old,
        to,
        shift,
    })
}

/// Plan the compaction that follows removing the entity at `old`.
pub fn plan_remove(old: Position, last: Position) -> Option<Shift> {
    (old < last).then_some(Shift {
        from: old + 1,
        to: last,
        delta: -1,
    })
}


#[cfg(test)]
mod tests {
    use super::in_memory::{insert, is_dense, move_to, remove};
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        position: Position,
    }

    impl Positioned for Item {
        const ENTITY: &'static str = "items";

        fn position(&self) -> Position {
            self.position
        }

        fn set_position(&mut self, position: Position) {
            self.position = position;
        }
    }

    fn item(name: &'static str, position: Position) -> Item {
        Item { name, position }
    }

    fn order(items: &[Item]) -> Vec<&'static str> {
        let mut sorted = items.to_vec();
        sorted.sort_by_key(|i| i.position);
        sorted.into_iter().map(|i| i.name).collect()
    }

    fn scope_of(names: &[&'static str]) -> Vec<Item> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| item(n, i as Position + 1))
            .collect()
    }

    // -- scope keys ----------------------------------------------------------

    #[test]
    fn default_scope_is_global() {
        assert_eq!(
            item("a", 1).scope_key(),
            ScopeKey::Global { entity: "items" }
        );
    }

    #[test]
    fn lock_keys_are_distinct_per_scope() {
        let keys = [
            ScopeKey::Global { entity: "products" }.lock_key(),
            ScopeKey::Subcategories { product_id: 1 }.lock_key(),
            ScopeKey::QaItems { subcategory_id: 1 }.lock_key(),
            ScopeKey::QaBlocks { qa_item_id: 1 }.lock_key(),
            ScopeKey::NavLinks {
                placement: LinkPlacement::Footer,
            }
            .lock_key(),
        ];
        let mut unique = keys.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), keys.len());
        assert_eq!(keys[4], "nav_links:placement=footer");
    }

    // -- plan_insert ---------------------------------------------------------

    #[test]
    fn insert_into_empty_scope_gets_one() {
        assert_eq!(
            plan_insert(None, 0),
            InsertPlan {
                position: 1,
                shift: None
            }
        );
    }

    #[test]
    fn insert_without_request_appends() {
        assert_eq!(plan_insert(None, 4).position, 5);
        assert_eq!(plan_insert(Some(0), 4).position, 5);
        assert_eq!(plan_insert(Some(-3), 4).position, 5);
    }

    #[test]
    fn insert_at_position_shifts_tail() {
        let plan = plan_insert(Some(2), 4);
        assert_eq!(plan.position, 2);
        assert_eq!(
            plan.shift,
            Some(Shift {
                from: 2,
                to: 4,
                delta: 1
            })
        );
    }

    #[test]
    fn insert_past_end_is_clamped() {
        assert_eq!(
            plan_insert(Some(99), 3),
            InsertPlan {
                position: 4,
                shift: None
            }
        );
    }

    // -- plan_move -----------------------------------------------------------

    #[test]
    fn move_to_same_position_is_noop() {
        assert_eq!(plan_move(2, 2, 5), None);
    }

    #[test]
    fn move_down_shifts_window_up() {
        let plan = plan_move(2, 4, 5).unwrap();
        assert_eq!(plan.to, 4);
        assert_eq!(
            plan.shift,
            Shift {
                from: 3,
                to: 4,
                delta: -1
            }
        );
    }

    #[test]
    fn move_up_shifts_window_down() {
        let plan = plan_move(4, 1, 5).unwrap();
        assert_eq!(
            plan.shift,
            Shift {
                from: 1,
                to: 3,
                delta: 1
            }
        );
    }

    #[test]
    fn move_target_is_clamped() {
        assert_eq!(plan_move(3, 0, 5).unwrap().to, 1);
        assert_eq!(plan_move(3, 40, 5).unwrap().to, 5);
        assert_eq!(plan_move(5, 40, 5), None);
        assert_eq!(plan_move(1, -2, 5), None);
    }

    #[test]
    fn remove_compacts_tail() {
        assert_eq!(
            plan_remove(2, 5),
            Some(Shift {
                from: 3,
                to: 5,
                delta: -1
            })
        );
        assert_eq!(plan_remove(5, 5), None);
    }

    // -- in-memory execution -------------------------------------------------

    #[test]
    fn subcategory_scenario_from_empty_product() {
        let mut scope: Vec<Item> = Vec::new();

        let mut repairs = item("Repairs", 0);
        assert_eq!(insert(&mut scope, &mut repairs), 1);
        scope.push(repairs);

        let mut warranty = item("Warranty", 1);
        assert_eq!(insert(&mut scope, &mut warranty), 1);
        scope.push(warranty);

        assert_eq!(order(&scope), vec!["Warranty", "Repairs"]);
        assert!(is_dense(&scope));
    }

    #[test]
    fn block_scenario_move_last_to_first() {
        let mut blocks = scope_of(&["b1", "b2", "b3"]);
        assert_eq!(move_to(&mut blocks, 2, 1), 1);
        assert_eq!(order(&blocks), vec!["b3", "b1", "b2"]);
        assert_eq!(
            blocks.iter().map(|b| b.position).collect::<Vec<_>>(),
            vec![2, 3, 1]
        );
    }

    #[test]
    fn insert_at_every_position_keeps_density() {
        for n in 0..6 {
            for p in 1..=(n + 1) {
                let names = ["a", "b", "c", "d", "e", "f"];
                let mut scope = scope_of(&names[..n as usize]);
                let before = scope.clone();
                let mut new = item("new", p);
                assert_eq!(insert(&mut scope, &mut new), p);

                for (old, now) in before.iter().zip(scope.iter()) {
                    let expected = if old.position >= p {
                        old.position + 1
                    } else {
                        old.position
                    };
                    assert_eq!(now.position, expected);
                }

                scope.push(new);
                assert!(is_dense(&scope), "n={n} p={p}");
            }
        }
    }

    #[test]
    fn move_between_every_pair_preserves_relative_order() {
        let names = ["a", "b", "c", "d", "e"];
        for from in 0..names.len() {
            for to in 1..=names.len() as Position {
                let mut scope = scope_of(&names);
                let moved = names[from];
                move_to(&mut scope, from, to);
                assert!(is_dense(&scope));

                let others_before: Vec<_> = names.iter().filter(|n| **n != moved).collect();
                let after = order(&scope);
                let others_after: Vec<_> = after.iter().filter(|n| **n != moved).collect();
                assert_eq!(others_before, others_after);
                assert_eq!(after[to as usize - 1], moved);
            }
        }
    }

    #[test]
    fn remove_then_insert_stays_dense() {
        let mut scope = scope_of(&["a", "b", "c", "d"]);
        let removed = remove(&mut scope, 1);
        assert_eq!(removed.name, "b");
        assert!(is_dense(&scope));
        assert_eq!(order(&scope), vec!["a", "c", "d"]);

        let mut e = item("e", 0);
        insert(&mut scope, &mut e);
        scope.push(e);
        assert_eq!(order(&scope), vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn is_dense_rejects_gaps_and_duplicates() {
        assert!(is_dense::<Item>(&[]));
        assert!(!is_dense(&[item("a", 1), item("b", 3)]));
        assert!(!is_dense(&[item("a", 1), item("b", 1)]));
        assert!(!is_dense(&[item("a", 0)]));
    }
}
