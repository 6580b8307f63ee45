//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row,
//!   implementing [`guide_core::ordering::Positioned`]
//! - A `Deserialize` + `Validate` create DTO
//! - A `Deserialize` + `Validate` update DTO (all `Option` fields) for patches

pub mod nav_link;
pub mod product;
pub mod qa_block;
pub mod qa_item;
pub mod subcategory;
