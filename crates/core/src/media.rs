//! Storage paths for uploaded block media.

use std::path::Path;

use crate::slug::slugify;
use crate::types::DbId;

/// Relative storage path for an upload attached to a QA item.
///
/// Format: `qa/{qa_item_id}/{uuid}_{stem}{.ext}` where `stem` is the
/// slugified file stem (`file` if nothing survives) and the extension is
/// lowercased. The random prefix keeps re-uploads of the same name apart.
pub fn upload_path(qa_item_id: DbId, filename: &str) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "file".to_string());
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    format!(
        "qa/{qa_item_id}/{}_{stem}{ext}",
        uuid::Uuid::new_v4().simple()
    )
}
