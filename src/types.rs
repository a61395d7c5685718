//! Shared types used across pipeline stages.
//!
//! Produced by [`scan`](crate::scan), consumed by
//! [`collections`](crate::collections), [`layout`](crate::layout) and
//! [`generate`](crate::generate). All of them serialize, so a manifest can be
//! dumped as JSON for debugging.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The optional `+++`-delimited TOML block at the top of a markdown file.
///
/// ```toml
/// +++
/// title = "Hello, highlighting"
/// date = "2024-03-01"
/// layout = "post"
/// tags = ["rust"]
/// draft = false
/// +++
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `YYYY-MM-DD`. Compared as a string, which sorts chronologically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Drafts are rendered but left out of collections.
    pub draft: bool,
    /// Layout or layout alias. Falls back to `base`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Collection rendered by the `listing` layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
}

/// A markdown file found in the content directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Path relative to the content root, e.g. `articles/first-post.md`.
    pub source: PathBuf,
    /// Path relative to the output root, e.g. `articles/first-post/index.html`.
    pub output: PathBuf,
    /// Root-relative URL, e.g. `/articles/first-post/`.
    pub url: String,
    pub slug: String,
    /// Resolved title: front matter, then first `# heading`, then file stem.
    pub title: String,
    pub front_matter: FrontMatter,
    /// Markdown with the front matter block removed.
    pub body: String,
}

impl Document {
    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.front_matter.tags.iter().any(|t| t == tag)
    }
}
