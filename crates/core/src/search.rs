//! Question search and quick-FAQ paging helpers.
//!
//! Search is a case-insensitive substring match (`ILIKE`) over question
//! text; this module only shapes user input into a safe pattern and clamps
//! paging parameters.

// ---------------------------------------------------------------------------
// Paging defaults
// ---------------------------------------------------------------------------

/// Default number of search results per page.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Maximum number of search results per page.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Default number of product groups in the quick FAQ.
pub const DEFAULT_QUICK_FAQ_PRODUCTS: i64 = 8;

/// Default number of questions per quick-FAQ group.
pub const DEFAULT_QUICK_FAQ_PER_PRODUCT: i64 = 4;

/// Upper bound for both quick-FAQ limits.
pub const MAX_QUICK_FAQ_LIMIT: i64 = 20;

/// Clamp a user-provided limit to `1..=max`, defaulting when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Pattern building
// ---------------------------------------------------------------------------

/// Build a `%term%` pattern for `ILIKE ... ESCAPE '\'`.
///
/// Collapses inner whitespace and escapes `%`, `_` and `\` so user input
/// only ever matches literally. Returns `None` for a blank query.
pub fn ilike_pattern(query: &str) -> Option<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let mut pattern = String::from("%");
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            pattern.push(' ');
        }
        for c in word.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
    }
    pattern.push('%');
    Some(pattern)
}
