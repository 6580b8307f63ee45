//! Question/answer item, ordered within its subcategory.

use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::qa_status::QaStatus;
use guide_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `qa_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QaItem {
    pub id: DbId,
    pub subcategory_id: DbId,
    pub question: String,
    #[sqlx(try_from = "String")]
    pub status: QaStatus,
    pub position: Position,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Positioned for QaItem {
    const ENTITY: &'static str = "qa_items";

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn scope_key(&self) -> ScopeKey {
        ScopeKey::QaItems {
            subcategory_id: self.subcategory_id,
        }
    }
}

/// DTO for creating a QA item. Status defaults to `draft`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateQaItem {
    #[validate(custom(function = "guide_core::validation::not_blank"))]
    pub question: String,
    pub status: Option<QaStatus>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

/// DTO for updating a QA item. `subcategory_id` may only repeat the
/// current owner.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQaItem {
    pub subcategory_id: Option<DbId>,
    #[validate(custom(function = "guide_core::validation::not_blank"))]
    pub question: Option<String>,
    pub status: Option<QaStatus>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

/// A published item together with its active blocks, for read paths.
#[derive(Debug, Clone, Serialize)]
pub struct QaItemWithBlocks {
    #[serde(flatten)]
    pub item: QaItem,
    pub blocks: Vec<super::qa_block::QaBlock>,
}
