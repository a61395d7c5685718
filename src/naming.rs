//! Centralized file name conventions for documents.
//!
//! A markdown file stem may carry a `YYYY-MM-DD-` date prefix. The prefix is
//! stripped from the slug and, when the front matter has no `date`, becomes
//! the document date:
//! - `2024-03-01-first-post` → slug "first-post", date "2024-03-01"
//! - `about` → slug "about", no date
//!
//! ## Display Titles
//!
//! Dashes in the slug are converted to spaces for display, used as the last
//! title fallback:
//! - `2024-03-01-first-post` → "first post"
//!
//! ## Output Paths
//!
//! Every document gets a directory URL:
//! - `about.md` → `about/index.html` (`/about/`)
//! - `articles/2024-03-01-first-post.md` → `articles/first-post/index.html`
//! - `index.md` → `index.html` (`/`), `docs/index.md` → `docs/index.html` (`/docs/`)

use std::path::{Path, PathBuf};

/// Result of parsing a document stem like `2024-03-01-first-post`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Date prefix if present (e.g. `2024-03-01`).
    pub date: Option<String>,
    /// Stem with the date prefix removed. For undated stems, the full input.
    pub slug: String,
    /// Display title: slug with dashes converted to spaces.
    pub display_title: String,
}

/// Parse a document stem following the optional `YYYY-MM-DD-name` convention.
///
/// - `"2024-03-01-first-post"` → date=Some("2024-03-01"), slug="first-post"
/// - `"2024-03-01"` → date=Some("2024-03-01"), slug="2024-03-01"
/// - `"2024-3-1-x"` → date=None (not zero-padded), slug="2024-3-1-x"
/// - `"about"` → date=None, slug="about"
pub fn parse_entry_name(stem: &str) -> ParsedName {
    let (date, slug) = match split_date_prefix(stem) {
        Some((date, rest)) if !rest.is_empty() => (Some(date), rest),
        Some((date, _)) => (Some(date), stem),
        None => (None, stem),
    };
    ParsedName {
        date: date.map(str::to_string),
        slug: slug.to_string(),
        display_title: slug.replace('-', " "),
    }
}

/// Split `YYYY-MM-DD` (optionally followed by `-rest`) off the front of `stem`.
fn split_date_prefix(stem: &str) -> Option<(&str, &str)> {
    let date = stem.get(..10)?;
    let bytes = date.as_bytes();
    let digits_at = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if !(digits_at(0..4) && bytes[4] == b'-' && digits_at(5..7) && bytes[7] == b'-' && digits_at(8..10))
    {
        return None;
    }
    match &stem[10..] {
        "" => Some((date, "")),
        rest => rest.strip_prefix('-').map(|r| (date, r)),
    }
}

/// Output file for a document, relative to the output root.
///
/// `source` is relative to the content root; `slug` comes from
/// [`parse_entry_name`].
pub fn output_path(source: &Path, slug: &str) -> PathBuf {
    let parent = source.parent().unwrap_or(Path::new(""));
    if is_index(source) {
        parent.join("index.html")
    } else {
        parent.join(slug).join("index.html")
    }
}

/// Root-relative URL for an output path: `a/b/index.html` → `/a/b/`.
pub fn url_for(output: &Path) -> String {
    let dir = if output.file_name().is_some_and(|n| n == "index.html") {
        output.parent().unwrap_or(Path::new(""))
    } else {
        output
    };
    let segments: Vec<String> = dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

fn is_index(source: &Path) -> bool {
    source.file_stem().is_some_and(|s| s == "index")
}
