//! Content block kinds and their validation state machine.
//!
//! A QA answer is an ordered list of blocks. Storage keeps every block in one
//! table with nullable columns ([`BlockFields`]); the domain works with
//! [`BlockContent`], a sum type that carries only the payload the kind needs.
//! The only way from fields to content is [`BlockContent::from_fields`], which
//! normalizes empty strings to `None` and enforces the per-kind requirements:
//!
//! | kind                | required                          |
//! |---------------------|-----------------------------------|
//! | `heading`           | `heading_text`                    |
//! | `text`              | `text_md`                         |
//! | `image`/`gif`/`video` | `media_file` or `media_url`     |
//!
//! Changing a block's kind goes through the same function, so the new
//! kind's requirements are checked before anything is written.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldError};
use crate::slug::{derive_anchor, MAX_ANCHOR_LENGTH};
use crate::types::Position;

/// Maximum length of heading text.
pub const MAX_HEADING_LENGTH: usize = 255;

/// Maximum length of media alt text.
pub const MAX_ALT_TEXT_LENGTH: usize = 255;

/// Maximum length of a media caption.
pub const MAX_CAPTION_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Discriminants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Text,
    Image,
    Gif,
    Video,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Heading,
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::Gif,
        BlockKind::Video,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Gif => "gif",
            BlockKind::Video => "video",
        }
    }

    pub fn media_kind(self) -> Option<MediaKind> {
        match self {
            BlockKind::Image => Some(MediaKind::Image),
            BlockKind::Gif => Some(MediaKind::Gif),
            BlockKind::Video => Some(MediaKind::Video),
            BlockKind::Heading | BlockKind::Text => None,
        }
    }
}

impl FromStr for BlockKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::field("kind", format!("Unknown block kind '{s}'")))
    }
}

impl TryFrom<String> for BlockKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Gif,
    Video,
}

impl From<MediaKind> for BlockKind {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => BlockKind::Image,
            MediaKind::Gif => BlockKind::Gif,
            MediaKind::Video => BlockKind::Video,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeadingLevel {
    #[default]
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    pub fn as_i16(self) -> i16 {
        match self {
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
        }
    }

    pub fn from_i16(level: i16) -> Option<Self> {
        match level {
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            4 => Some(HeadingLevel::H4),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Flat fields
// ---------------------------------------------------------------------------

/// Every kind-dependent column of a block, as submitted or as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFields {
    pub heading_text: Option<String>,
    pub heading_level: Option<i16>,
    pub heading_anchor: Option<String>,
    pub text_md: Option<String>,
    pub media_file: Option<String>,
    pub media_url: Option<String>,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl BlockFields {
    /// Empty strings become `None` before any rule runs.
    pub fn normalized(self) -> Self {
        Self {
            heading_text: blank_to_none(self.heading_text),
            heading_level: self.heading_level,
            heading_anchor: blank_to_none(self.heading_anchor),
            text_md: blank_to_none(self.text_md),
            media_file: blank_to_none(self.media_file),
            media_url: blank_to_none(self.media_url),
            alt_text: blank_to_none(self.alt_text),
            caption: blank_to_none(self.caption),
        }
    }

    /// Fill every column left `None` here from `stored`, then normalise.
    /// An empty string still clears.
    pub fn overlay(self, stored: BlockFields) -> Self {
        Self {
            heading_text: self.heading_text.or(stored.heading_text),
            heading_level: self.heading_level.or(stored.heading_level),
            heading_anchor: self.heading_anchor.or(stored.heading_anchor),
            text_md: self.text_md.or(stored.text_md),
            media_file: self.media_file.or(stored.media_file),
            media_url: self.media_url.or(stored.media_url),
            alt_text: self.alt_text.or(stored.alt_text),
            caption: self.caption.or(stored.caption),
        }
        .normalized()
    }
}

fn check_length(errors: &mut Vec<FieldError>, field: &str, value: &Option<String>, max: usize) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.push(FieldError::new(
                field,
                format!("Must be at most {max} characters"),
            ));
        }
    }
}

/// Validate `fields` against the requirements of `kind`.
///
/// Returns every violation found, each attributed to a field. An empty list
/// means the block may be saved. Fields irrelevant to `kind` are only
/// length-checked.
pub fn validate_block(kind: BlockKind, fields: &BlockFields) -> Vec<FieldError> {
    let fields = fields.clone().normalized();
    let mut errors = Vec::new();

    match kind {
        BlockKind::Heading => {
            if is_blank(&fields.heading_text) {
                errors.push(FieldError::new(
                    "heading_text",
                    "Heading text is required for a heading block",
                ));
            }
            if let Some(level) = fields.heading_level {
                if HeadingLevel::from_i16(level).is_none() {
                    errors.push(FieldError::new(
                        "heading_level",
                        "Heading level must be 2, 3 or 4",
                    ));
                }
            }
        }
        BlockKind::Text => {
            if is_blank(&fields.text_md) {
                errors.push(FieldError::new(
                    "text_md",
                    "Markdown text is required for a text block",
                ));
            }
        }
        BlockKind::Image | BlockKind::Gif | BlockKind::Video => {
            if is_blank(&fields.media_file) && is_blank(&fields.media_url) {
                errors.push(FieldError::new(
                    "media_file",
                    "Provide a media file or an external URL",
                ));
                errors.push(FieldError::new(
                    "media_url",
                    "Provide an external URL or a media file",
                ));
            }
            if let Some(url) = &fields.media_url {
                if crate::nav::validate_link_url(url).is_err() {
                    errors.push(FieldError::new(
                        "media_url",
                        "Only http(s) media URLs are allowed",
                    ));
                }
            }
        }
    }

    check_length(&mut errors, "heading_text", &fields.heading_text, MAX_HEADING_LENGTH);
    check_length(&mut errors, "heading_anchor", &fields.heading_anchor, MAX_ANCHOR_LENGTH);
    check_length(&mut errors, "alt_text", &fields.alt_text, MAX_ALT_TEXT_LENGTH);
    check_length(&mut errors, "caption", &fields.caption, MAX_CAPTION_LENGTH);

    if let Some(anchor) = &fields.heading_anchor {
        if !anchor
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            errors.push(FieldError::new(
                "heading_anchor",
                "Anchor may contain only letters, digits, hyphens and underscores",
            ));
        }
    }

    errors
}

// ---------------------------------------------------------------------------
// Typed content
// ---------------------------------------------------------------------------

/// Where a media block's payload lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MediaSource {
    Upload { file: String },
    External { url: String },
    Both { file: String, url: String },
}

impl MediaSource {
    fn from_parts(file: Option<String>, url: Option<String>) -> Option<Self> {
        match (file, url) {
            (Some(file), Some(url)) => Some(MediaSource::Both { file, url }),
            (Some(file), None) => Some(MediaSource::Upload { file }),
            (None, Some(url)) => Some(MediaSource::External { url }),
            (None, None) => None,
        }
    }

    /// The uploaded file wins over the external URL.
    pub fn link(&self) -> &str {
        match self {
            MediaSource::Upload { file } | MediaSource::Both { file, .. } => file,
            MediaSource::External { url } => url,
        }
    }

    fn into_parts(self) -> (Option<String>, Option<String>) {
        match self {
            MediaSource::Upload { file } => (Some(file), None),
            MediaSource::External { url } => (None, Some(url)),
            MediaSource::Both { file, url } => (Some(file), Some(url)),
        }
    }
}

/// A validated block payload, one variant per kind family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlockContent {
    Heading {
        text: String,
        level: HeadingLevel,
        anchor: Option<String>,
    },
    Text {
        markdown: String,
    },
    Media {
        media: MediaKind,
        source: MediaSource,
        alt_text: Option<String>,
        caption: Option<String>,
    },
}

impl BlockContent {
    /// Validate `fields` for `kind` and build the typed payload.
    pub fn from_fields(kind: BlockKind, fields: BlockFields) -> Result<Self, CoreError> {
        let fields = fields.normalized();
        CoreError::check(validate_block(kind, &fields))?;

        let missing = |field: &str| CoreError::field(field, "Missing after validation");

        let content = match kind {
            BlockKind::Heading => BlockContent::Heading {
                text: fields.heading_text.ok_or_else(|| missing("heading_text"))?,
                level: fields
                    .heading_level
                    .and_then(HeadingLevel::from_i16)
                    .unwrap_or_default(),
                anchor: fields.heading_anchor,
            },
            BlockKind::Text => BlockContent::Text {
                markdown: fields.text_md.ok_or_else(|| missing("text_md"))?,
            },
            BlockKind::Image | BlockKind::Gif | BlockKind::Video => {
                let media = kind.media_kind().ok_or_else(|| missing("kind"))?;
                BlockContent::Media {
                    media,
                    source: MediaSource::from_parts(fields.media_file, fields.media_url)
                        .ok_or_else(|| missing("media_file"))?,
                    alt_text: fields.alt_text,
                    caption: fields.caption,
                }
            }
        };
        Ok(content)
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Heading { .. } => BlockKind::Heading,
            BlockContent::Text { .. } => BlockKind::Text,
            BlockContent::Media { media, .. } => (*media).into(),
        }
    }

    /// Keep an anchor that was already assigned to this block.
    ///
    /// Only fills in a missing anchor; an explicitly submitted one wins.
    pub fn inherit_anchor(&mut self, previous: Option<&str>) {
        if let (BlockContent::Heading { anchor, .. }, Some(prev)) = (self, previous) {
            if anchor.is_none() && !prev.is_empty() {
                *anchor = Some(prev.to_string());
            }
        }
    }

    /// Derive the heading anchor if none is set. Never overwrites.
    pub fn assign_anchor(&mut self, position: Position) {
        if let BlockContent::Heading {
            text,
            level,
            anchor,
        } = self
        {
            if anchor.is_none() {
                *anchor = Some(derive_anchor(text, level.as_i16(), position));
            }
        }
    }

    pub fn anchor(&self) -> Option<&str> {
        match self {
            BlockContent::Heading { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }

    /// The link a renderer should use for media blocks.
    pub fn media_link(&self) -> Option<&str> {
        match self {
            BlockContent::Media { source, .. } => Some(source.link()),
            _ => None,
        }
    }

    /// Write this payload's columns over `base`.
    ///
    /// Only the columns of the current kind are replaced; values stored for
    /// other kinds stay as they are and are not rendered.
    pub fn write_over(self, base: BlockFields) -> BlockFields {
        match self {
            BlockContent::Heading {
                text,
                level,
                anchor,
            } => BlockFields {
                heading_text: Some(text),
                heading_level: Some(level.as_i16()),
                heading_anchor: anchor,
                ..base
            },
            BlockContent::Text { markdown } => BlockFields {
                text_md: Some(markdown),
                ..base
            },
            BlockContent::Media {
                source,
                alt_text,
                caption,
                ..
            } => {
                let (media_file, media_url) = source.into_parts();
                BlockFields {
                    media_file,
                    media_url,
                    alt_text,
                    caption,
                    ..base
                }
            }
        }
    }
}
