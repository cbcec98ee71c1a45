use serde::{Deserialize, Serialize};

use crate::constants::{ID_HEX_LEN, ID_PREFIX};

/// Knowledge item kinds recognized by mnema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Idea,
    Decision,
    Project,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Decision => "decision",
            Self::Project => "project",
        }
    }

    pub fn parse_type(s: &str) -> Option<Self> {
        match s {
            "idea" => Some(Self::Idea),
            "decision" => Some(Self::Decision),
            "project" => Some(Self::Project),
            _ => None,
        }
    }
}

/// Lifecycle status carried by project items only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Complete,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on-hold",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse_status(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "on-hold" => Some(Self::OnHold),
            "complete" => Some(Self::Complete),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Returns true when `id` matches the stable identifier shape
/// (`sb-` followed by exactly 7 lowercase hex digits).
pub fn is_valid_id(id: &str) -> bool {
    let Some(hex) = id.strip_prefix(ID_PREFIX) else {
        return false;
    };
    hex.len() == ID_HEX_LEN && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Metadata extracted from a knowledge item document.
///
/// Immutable once built; the id doubles as the idempotency key for
/// memory writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub id: String,
    pub title: String,
    pub item_type: ItemType,
    pub path: String,
    pub tags: Vec<String>,
    pub status: Option<ProjectStatus>,
}

impl ItemMetadata {
    /// Render metadata as the line-oriented text stored in the memory
    /// service. Fixed order: title, id, type, path, then a tags line iff
    /// tags are non-empty and a status line iff a status is set. This
    /// exact shape is the wire contract with the index.
    pub fn to_index_text(&self) -> String {
        let mut lines = vec![
            format!("Item: {}", self.title),
            format!("ID: {}", self.id),
            format!("Type: {}", self.item_type.as_str()),
            format!("Path: {}", self.path),
        ];
        if !self.tags.is_empty() {
            lines.push(format!("Tags: {}", self.tags.join(", ")));
        }
        if let Some(status) = self.status {
            lines.push(format!("Status: {}", status.as_str()));
        }
        lines.join("\n")
    }

    /// Parse metadata back from stored index text.
    ///
    /// Accepts precisely the shape produced by [`to_index_text`] and
    /// returns `None` for anything else (legacy sync-marker blobs,
    /// unrelated records), never an error.
    ///
    /// [`to_index_text`]: ItemMetadata::to_index_text
    pub fn from_index_text(text: &str) -> Option<Self> {
        let mut title = None;
        let mut id = None;
        let mut item_type = None;
        let mut path = None;
        let mut tags = Vec::new();
        let mut status = None;

        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("Item: ") {
                title = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("ID: ") {
                id = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Type: ") {
                item_type = ItemType::parse_type(rest.trim());
            } else if let Some(rest) = line.strip_prefix("Path: ") {
                path = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Tags: ") {
                tags = rest
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
            } else if let Some(rest) = line.strip_prefix("Status: ") {
                status = ProjectStatus::parse_status(rest.trim());
            }
        }

        let title = title.filter(|t| !t.is_empty())?;
        let id = id?;
        let item_type = item_type?;
        let path = path?;

        if !is_valid_id(&id) {
            return None;
        }

        Some(Self {
            id,
            title,
            item_type,
            path,
            tags,
            status: if item_type == ItemType::Project {
                status
            } else {
                None
            },
        })
    }
}
