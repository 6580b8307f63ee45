//! Publication status of a question/answer item.
//!
//! Stored as lowercase text in `qa_items.status`; a check constraint in the
//! schema mirrors [`QaStatus::ALL`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QaStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl QaStatus {
    pub const ALL: [QaStatus; 3] = [QaStatus::Draft, QaStatus::Published, QaStatus::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            QaStatus::Draft => "draft",
            QaStatus::Published => "published",
            QaStatus::Archived => "archived",
        }
    }

    /// Whether items in this status are shown to readers.
    pub fn is_public(self) -> bool {
        self == QaStatus::Published
    }
}

impl FromStr for QaStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QaStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| CoreError::field("status", format!("Unknown status '{s}'")))
    }
}

impl TryFrom<String> for QaStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
