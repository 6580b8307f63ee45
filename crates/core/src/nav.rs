//! Navigation link placement, URL rules, and derived HTML attributes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldError};

/// Maximum length of a link label.
pub const MAX_LABEL_LENGTH: usize = 120;

/// Maximum length of an icon name.
pub const MAX_ICON_NAME_LENGTH: usize = 64;

/// Where a navigation link is rendered. Each placement is its own ordering scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPlacement {
    #[default]
    Header,
    Footer,
    Social,
}

impl LinkPlacement {
    pub const ALL: [LinkPlacement; 3] = [
        LinkPlacement::Header,
        LinkPlacement::Footer,
        LinkPlacement::Social,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LinkPlacement::Header => "header",
            LinkPlacement::Footer => "footer",
            LinkPlacement::Social => "social",
        }
    }
}

impl FromStr for LinkPlacement {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkPlacement::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::field("placement", format!("Unknown placement '{s}'")))
    }
}

impl TryFrom<String> for LinkPlacement {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Only absolute http(s) links are allowed.
pub fn validate_link_url(url: &str) -> Result<(), FieldError> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(FieldError::new("url", "Only http(s) links are allowed")),
    }
}

/// The `rel` flags stored on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelFlags {
    pub noopener: bool,
    pub noreferrer: bool,
    pub nofollow: bool,
    pub sponsored: bool,
}

impl RelFlags {
    /// Space-joined `rel` attribute value; empty when no flag is set.
    pub fn html_rel(&self) -> String {
        [
            (self.noopener, "noopener"),
            (self.noreferrer, "noreferrer"),
            (self.nofollow, "nofollow"),
            (self.sponsored, "sponsored"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

pub fn html_target(open_in_new_tab: bool) -> &'static str {
    if open_in_new_tab {
        "_blank"
    } else {
        "_self"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn placement_round_trips_through_str() {
        for p in LinkPlacement::ALL {
            assert_eq!(p.as_str().parse::<LinkPlacement>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_placement_is_field_error() {
        assert_matches!(
            "sidebar".parse::<LinkPlacement>(),
            Err(CoreError::Validation(ref v)) if v[0].field == "placement"
        );
    }

    #[test]
    fn http_and_https_urls_pass() {
        assert!(validate_link_url("https://t.me/guide").is_ok());
        assert!(validate_link_url("http://example.com").is_ok());
    }

    #[test]
    fn other_schemes_fail_on_url_field() {
        for bad in ["javascript:alert(1)", "ftp://x", "//example.com", "https://", ""] {
            let err = validate_link_url(bad).unwrap_err();
            assert_eq!(err.field, "url", "{bad}");
        }
    }

    #[test]
    fn rel_is_joined_in_fixed_order() {
        let flags = RelFlags {
            noopener: true,
            noreferrer: true,
            nofollow: true,
            sponsored: true,
        };
        assert_eq!(flags.html_rel(), "noopener noreferrer nofollow sponsored");
    }

    #[test]
    fn rel_empty_when_no_flags() {
        let flags = RelFlags {
            noopener: false,
            noreferrer: false,
            nofollow: false,
            sponsored: false,
        };
        assert_eq!(flags.html_rel(), "");
    }

    #[test]
    fn target_follows_new_tab_flag() {
        assert_eq!(html_target(true), "_blank");
        assert_eq!(html_target(false), "_self");
    }
}
