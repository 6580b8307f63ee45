//! Slug and anchor derivation.
//!
//! Names are transliterated to ASCII first, so `"Ноутбуки"` becomes
//! `"noutbuki"` rather than an empty string. Uniqueness is not decided here:
//! [`SlugCandidates`] yields `base`, `base-2`, `base-3`, ... and the caller
//! checks each against storage inside its transaction.

use crate::error::FieldError;
use crate::types::Position;

/// Maximum length of product and subcategory slugs.
pub const MAX_SLUG_LENGTH: usize = 255;

/// Maximum stored length of a heading anchor.
pub const MAX_ANCHOR_LENGTH: usize = 255;

/// Derived anchors are cut to this length.
pub const DERIVED_ANCHOR_LENGTH: usize = 220;

/// Used when a name slugifies to nothing (e.g. only punctuation).
pub const FALLBACK_SLUG: &str = "item";

/// Generate a URL-safe slug from arbitrary text.
///
/// Transliterates to ASCII, lowercases, replaces every run of
/// non-alphanumeric characters with a single hyphen, and trims hyphens.
/// May return an empty string.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text).to_lowercase();

    let mut result = String::with_capacity(ascii.len());
    let mut prev_hyphen = true;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }

    result.trim_end_matches('-').to_string()
}

/// Cut `slug` to at most `max_len` characters without leaving a trailing hyphen.
pub fn truncate(slug: &str, max_len: usize) -> String {
    let cut: String = slug.chars().take(max_len).collect();
    cut.trim_end_matches('-').to_string()
}

/// Check an explicitly supplied slug: non-empty, bounded, `[a-z0-9-]` only.
pub fn validate_slug(slug: &str, max_len: usize) -> Result<(), FieldError> {
    if slug.is_empty() {
        return Err(FieldError::new("slug", "Slug must not be empty"));
    }
    if slug.len() > max_len {
        return Err(FieldError::new(
            "slug",
            format!("Slug must be at most {max_len} characters"),
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(FieldError::new(
            "slug",
            "Slug must contain only lowercase alphanumeric characters and hyphens",
        ));
    }
    Ok(())
}

/// Successive slug candidates for `name`: `base`, `base-2`, `base-3`, ...
///
/// The base is re-truncated for every suffix so candidates never exceed
/// `max_len`.
#[derive(Debug, Clone)]
pub struct SlugCandidates {
    base: String,
    max_len: usize,
    next_suffix: u32,
}

impl SlugCandidates {
    pub fn new(name: &str, max_len: usize) -> Self {
        let mut base = truncate(&slugify(name), max_len);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }
        Self {
            base,
            max_len,
            next_suffix: 1,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Iterator for SlugCandidates {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.next_suffix;
        self.next_suffix = self.next_suffix.checked_add(1)?;

        if n == 1 {
            return Some(self.base.clone());
        }

        let suffix = format!("-{n}");
        let room = self.max_len.saturating_sub(suffix.len());
        let head = truncate(&self.base, room);
        Some(format!("{head}{suffix}"))
    }
}

/// Derive a heading anchor from its text.
///
/// Falls back to `h{level}-{position}` when the text has no sluggable
/// characters.
pub fn derive_anchor(heading_text: &str, level: i16, position: Position) -> String {
    let base = truncate(&slugify(heading_text), DERIVED_ANCHOR_LENGTH);
    if base.is_empty() {
        format!("h{level}-{position}")
    } else {
        base
    }
}
