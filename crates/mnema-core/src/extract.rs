use std::collections::HashMap;

use crate::constants::{ID_HEX_LEN, ID_PREFIX};
use crate::item::{self, ItemMetadata, ItemType, ProjectStatus};

/// A parsed header value: a scalar or a one-level list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Scalar(String),
    List(Vec<String>),
}

impl HeaderValue {
    fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

fn unquote(value: &str) -> &str {
    let v = value.trim();
    if v.len() >= 2
        && ((v.starts_with('"') && v.ends_with('"')) || (v.starts_with('\'') && v.ends_with('\'')))
    {
        &v[1..v.len() - 1]
    } else {
        v
    }
}

fn is_header_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse the `---`-delimited header block at the top of a document.
///
/// Handles `key: value` pairs and one-level `key:` + `  - item` lists.
/// Blank lines are skipped and unrecognized lines are ignored, so both
/// the legacy and the Obsidian-compatible header revisions parse.
/// Returns `None` when the block is absent or unterminated.
pub fn parse_header_block(content: &str) -> Option<HashMap<String, HeaderValue>> {
    let body = content.strip_prefix("---\n")?;
    let end = body.find("\n---\n")?;
    let block = &body[..end];

    let mut fields: HashMap<String, HeaderValue> = HashMap::new();
    let mut current_list: Option<String> = None;

    for line in block.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("  - ") {
            if let Some(key) = current_list.as_deref()
                && let Some(HeaderValue::List(items)) = fields.get_mut(key)
            {
                items.push(unquote(rest).to_string());
            }
            continue;
        }

        // Keys start at column zero; indented non-list lines are ignored.
        if line.starts_with(' ') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if !is_header_key(key) {
            continue;
        }

        let value = value.trim();
        if value.is_empty() {
            fields.insert(key.to_string(), HeaderValue::List(Vec::new()));
            current_list = Some(key.to_string());
        } else {
            fields.insert(key.to_string(), HeaderValue::Scalar(unquote(value).to_string()));
            current_list = None;
        }
    }

    Some(fields)
}

/// Extract item metadata from a document's header block.
///
/// Returns `None` for documents that are not items: missing or
/// unterminated header, missing required fields (`id`, `title`,
/// `type`), an id that does not match the stable identifier shape, or
/// an unrecognized type. Never panics on truncated input.
pub fn extract_item_metadata(path: &str, content: &str) -> Option<ItemMetadata> {
    let fields = parse_header_block(content)?;

    let id = fields.get("id")?.as_scalar()?.to_string();
    let title = fields.get("title")?.as_scalar()?.to_string();
    let type_str = fields.get("type")?.as_scalar()?;

    if title.is_empty() || !item::is_valid_id(&id) {
        return None;
    }
    let item_type = ItemType::parse_type(type_str)?;

    let tags = match fields.get("tags") {
        Some(HeaderValue::List(items)) => items.clone(),
        _ => Vec::new(),
    };

    let status = if item_type == ItemType::Project {
        fields
            .get("status")
            .and_then(HeaderValue::as_scalar)
            .and_then(ProjectStatus::parse_status)
    } else {
        None
    };

    Some(ItemMetadata {
        id,
        title,
        item_type,
        path: path.to_string(),
        tags,
        status,
    })
}

/// Recover the stable identifier embedded in a file path.
///
/// Used for deletions, where the document content can no longer be
/// read. Returns the first `sb-` + 7-hex-digit run found, or `None`.
pub fn item_id_from_path(path: &str) -> Option<String> {
    let mut start = 0;
    while let Some(pos) = path[start..].find(ID_PREFIX) {
        let begin = start + pos;
        let hex_start = begin + ID_PREFIX.len();
        let hex_end = hex_start + ID_HEX_LEN;
        if hex_end <= path.len()
            && path.as_bytes()[hex_start..hex_end]
                .iter()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Some(path[begin..hex_end].to_string());
        }
        start = begin + 1;
    }
    None
}

/// Returns true when `path` lives under one of the tracked item folders
/// and carries the document extension. Placeholder files (`.gitkeep`)
/// and non-document blobs fail the extension check.
pub fn is_tracked_path(path: &str, folders: &[String], extension: &str) -> bool {
    path.ends_with(extension) && folders.iter().any(|f| path.starts_with(f.as_str()))
}
