//! Navigation links, ordered per placement.

use guide_core::nav::{html_target, LinkPlacement, RelFlags};
use guide_core::ordering::{Positioned, ScopeKey};
use guide_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `nav_links` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NavLink {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub placement: LinkPlacement,
    pub label: String,
    pub url: String,
    pub icon_name: Option<String>,
    pub open_in_new_tab: bool,
    pub rel_nofollow: bool,
    pub rel_sponsored: bool,
    pub rel_noopener: bool,
    pub rel_noreferrer: bool,
    pub position: Position,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NavLink {
    pub fn rel_flags(&self) -> RelFlags {
        RelFlags {
            noopener: self.rel_noopener,
            noreferrer: self.rel_noreferrer,
            nofollow: self.rel_nofollow,
            sponsored: self.rel_sponsored,
        }
    }

    /// Value for the anchor's `target` attribute.
    pub fn html_target(&self) -> &'static str {
        html_target(self.open_in_new_tab)
    }

    /// Value for the anchor's `rel` attribute; may be empty.
    pub fn html_rel(&self) -> String {
        self.rel_flags().html_rel()
    }
}

impl Positioned for NavLink {
    const ENTITY: &'static str = "nav_links";

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn scope_key(&self) -> ScopeKey {
        ScopeKey::NavLinks {
            placement: self.placement,
        }
    }
}

/// DTO for creating a link. Flags default to a new tab with
/// `noopener noreferrer`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateNavLink {
    pub placement: Option<LinkPlacement>,
    #[validate(
        length(max = 120, message = "Label must be at most 120 characters"),
        custom(function = "guide_core::validation::not_blank")
    )]
    pub label: String,
    #[validate(custom(function = "guide_core::validation::http_url"))]
    pub url: String,
    #[validate(length(max = 64, message = "Icon name must be at most 64 characters"))]
    pub icon_name: Option<String>,
    pub open_in_new_tab: Option<bool>,
    pub rel_nofollow: Option<bool>,
    pub rel_sponsored: Option<bool>,
    pub rel_noopener: Option<bool>,
    pub rel_noreferrer: Option<bool>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

/// DTO for updating a link. `placement` may only repeat the current one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateNavLink {
    pub placement: Option<LinkPlacement>,
    #[validate(
        length(max = 120, message = "Label must be at most 120 characters"),
        custom(function = "guide_core::validation::not_blank")
    )]
    pub label: Option<String>,
    #[validate(custom(function = "guide_core::validation::http_url"))]
    pub url: Option<String>,
    #[validate(length(max = 64, message = "Icon name must be at most 64 characters"))]
    pub icon_name: Option<String>,
    pub open_in_new_tab: Option<bool>,
    pub rel_nofollow: Option<bool>,
    pub rel_sponsored: Option<bool>,
    pub rel_noopener: Option<bool>,
    pub rel_noreferrer: Option<bool>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

/// A link with its rendered attributes, for read paths.
#[derive(Debug, Clone, Serialize)]
pub struct NavLinkView {
    #[serde(flatten)]
    pub link: NavLink,
    pub html_target: &'static str,
    pub html_rel: String,
}

impl From<NavLink> for NavLinkView {
    fn from(link: NavLink) -> Self {
        Self {
            html_target: link.html_target(),
            html_rel: link.html_rel(),
            link,
        }
    }
}
