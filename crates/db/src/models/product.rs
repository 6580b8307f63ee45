//! Product: the top level of the guide, ordered globally.

use guide_core::ordering::Positioned;
use guide_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub position: Position,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Positioned for Product {
    const ENTITY: &'static str = "products";

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

/// DTO for creating a product. The slug is derived from `name` when absent.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "guide_core::validation::not_blank")
    )]
    pub name: String,
    pub slug: Option<String>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

/// DTO for updating a product. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "guide_core::validation::not_blank")
    )]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}
