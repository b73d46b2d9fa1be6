//! Frontmatter parsing for Markdown content files.
//!
//! A content file may open with a YAML block fenced by `---` lines. The
//! well-known fields are typed below; anything else lands in `extra` so
//! templates and downstream tooling can still reach custom keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

/// Typed frontmatter of one content file.
///
/// `last_modified` falls back to `date` during parsing, so consumers can
/// read it without repeating that rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Publication date, ISO `YYYY-MM-DD` or RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Overrides the path-derived slug when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Social preview image, relative or absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Custom keys that are not part of the typed schema
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml_ng::Value>,
}

// ============================================================================
// Public API
// ============================================================================

/// Split a raw content file into frontmatter and Markdown body.
///
/// Files without an opening fence, or with an unterminated one, are
/// treated as pure Markdown with default frontmatter. A malformed YAML
/// block is an error rather than silently dropped metadata.
pub fn parse(raw: &str) -> Result<(Frontmatter, &str), serde_yaml_ng::Error> {
    let Some((block, body)) = split_fences(raw) else {
        return Ok((Frontmatter::default(), raw));
    };

    if block.trim().is_empty() {
        return Ok((Frontmatter::default(), body));
    }

    let mut frontmatter: Frontmatter = serde_yaml_ng::from_str(block)?;
    if frontmatter.last_modified.is_none() {
        frontmatter.last_modified = frontmatter.date.clone();
    }
    Ok((frontmatter, body))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Returns `(yaml_block, body)` when the file opens with a fenced block.
fn split_fences(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("---\n")?;
    // Closing fence immediately after the opening one
    if let Some(body) = rest.strip_prefix("---\n") {
        return Some(("", body));
    }
    if rest == "---" {
        return Some(("", ""));
    }
    match rest.find("\n---\n") {
        Some(end) => Some((&rest[..end], &rest[end + 5..])),
        // Closing fence at EOF without a trailing newline
        None => rest
            .strip_suffix("\n---")
            .map(|block| (block, "")),
    }
}

// ============================================================================
// Tests
// ============================================================================
