//! Content block of a QA item, ordered within the item.
//!
//! The table keeps one nullable column per kind-dependent field. Rows are
//! turned into [`BlockContent`] for anything that branches on the kind.

use guide_core::block::{BlockContent, BlockFields, BlockKind};
use guide_core::error::CoreError;
use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `qa_blocks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QaBlock {
    pub id: DbId,
    pub qa_item_id: DbId,
    #[sqlx(try_from = "String")]
    pub kind: BlockKind,
    pub heading_text: Option<String>,
    pub heading_level: Option<i16>,
    pub heading_anchor: Option<String>,
    pub text_md: Option<String>,
    pub media_file: Option<String>,
    pub media_url: Option<String>,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub position: Position,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QaBlock {
    /// The kind-dependent columns as stored.
    pub fn fields(&self) -> BlockFields {
        BlockFields {
            heading_text: self.heading_text.clone(),
            heading_level: self.heading_level,
            heading_anchor: self.heading_anchor.clone(),
            text_md: self.text_md.clone(),
            media_file: self.media_file.clone(),
            media_url: self.media_url.clone(),
            alt_text: self.alt_text.clone(),
            caption: self.caption.clone(),
        }
    }

    /// Typed payload. Fails only for rows written around the validation layer.
    pub fn content(&self) -> Result<BlockContent, CoreError> {
        BlockContent::from_fields(self.kind, self.fields())
    }

    /// File reference if present, otherwise the external URL.
    pub fn media_link(&self) -> Option<&str> {
        if self.kind.media_kind().is_none() {
            return None;
        }
        self.media_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .or(self.media_url.as_deref())
    }
}

impl Positioned for QaBlock {
    const ENTITY: &'static str = "qa_blocks";

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn scope_key(&self) -> ScopeKey {
        ScopeKey::QaBlocks {
            qa_item_id: self.qa_item_id,
        }
    }
}

/// DTO for creating a block. The owning item comes from the route.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQaBlock {
    pub kind: BlockKind,
    #[serde(flatten)]
    pub fields: BlockFields,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

/// DTO for updating a block.
///
/// Each submitted field replaces the stored one; omitted fields are kept and
/// an empty string clears. The merged result is validated against the
/// (possibly new) kind before anything is written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQaBlock {
    pub qa_item_id: Option<DbId>,
    pub kind: Option<BlockKind>,
    #[serde(flatten)]
    pub fields: BlockFields,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

impl UpdateQaBlock {
    /// Overlay the submitted fields on `stored`.
    pub fn merge_into(&self, stored: BlockFields) -> BlockFields {
        self.fields.clone().overlay(stored)
    }
}

/// One entry of a batch save. `id` refers to an existing block of the same
/// item; entries without an id are created.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockInput {
    pub id: Option<DbId>,
    pub kind: BlockKind,
    #[serde(flatten)]
    pub fields: BlockFields,
    pub is_active: Option<bool>,
}

/// Body of a batch save: the complete block list in display order.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceBlocks {
    pub blocks: Vec<BlockInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_omitted_and_clears_empty() {
        let stored = BlockFields {
            heading_text: Some("Old".into()),
            heading_anchor: Some("old".into()),
            caption: Some("cap".into()),
            ..BlockFields::default()
        };
        let patch = UpdateQaBlock {
            fields: BlockFields {
                heading_text: Some("New".into()),
                caption: Some(String::new()),
                ..BlockFields::default()
            },
            ..UpdateQaBlock::default()
        };

        let merged = patch.merge_into(stored);
        assert_eq!(merged.heading_text.as_deref(), Some("New"));
        assert_eq!(merged.heading_anchor.as_deref(), Some("old"));
        assert_eq!(merged.caption, None);
    }
}
