//! Subcategory: belongs to one product and is ordered within it.

use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `subcategories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subcategory {
    pub id: DbId,
    pub product_id: DbId,
    pub name: String,
    pub slug: String,
    pub position: Position,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Positioned for Subcategory {
    const ENTITY: &'static str = "subcategories";

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn scope_key(&self) -> ScopeKey {
        ScopeKey::Subcategories {
            product_id: self.product_id,
        }
    }
}

/// DTO for creating a subcategory. The owning product comes from the route.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateSubcategory {
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "guide_core::validation::not_blank")
    )]
    pub name: String,
    pub slug: Option<String>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

/// DTO for updating a subcategory. `product_id` may only repeat the
/// current owner.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSubcategory {
    pub product_id: Option<DbId>,
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "guide_core::validation::not_blank")
    )]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}
