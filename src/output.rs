//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every document is its title, with filesystem paths shown as secondary
//! context via indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Scan (`check`)
//!
//! ```text
//! Documents
//! 001 About this site
//!     Source: about.md
//! 002 Hello, highlighting
//!     Source: articles/2024-03-01-first-post.md
//!     Layout: post
//! 003 Unfinished thoughts (draft)
//!     Source: articles/2024-05-20-unfinished.md
//!
//! Collections
//!     articles (2 documents)
//!
//! Config
//!     site.toml
//!     Passthrough: assets/css/*, assets/type/*
//! ```
//!
//! ## Build progress
//!
//! ```text
//! Highlighter ready: base16-ocean.dark (6 languages)
//! Hello, highlighting → articles/first-post/index.html
//!     Source: articles/2024-03-01-first-post.md
//!     Code: 2 highlighted
//! ```
//!
//! ## Build summary
//!
//! ```text
//! Code blocks: 4 highlighted, 1 plain
//! Cache: 4 highlighted
//! Passthrough: 2 files
//! Generated 5 pages (1 draft)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::config::{CONFIG_FILENAME, HighlightSection};
use crate::generate::{BuildEvent, BuildReport};
use crate::highlight::Catalog;
use crate::render::BlockCounts;
use crate::scan::Manifest;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a document header: positional index + title, with a draft marker.
///
/// ```text
/// 001 Hello, highlighting
/// 003 Unfinished thoughts (draft)
/// ```
fn entity_header(index: usize, title: &str, draft: bool) -> String {
    if draft {
        format!("{} {} (draft)", format_index(index), title)
    } else {
        format!("{} {}", format_index(index), title)
    }
}

/// Render a path with `/` separators regardless of platform.
fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Describe how a set of code blocks was rendered, or `None` if there were none.
///
/// ```text
/// 2 highlighted, 1 cached, 1 plain
/// ```
fn block_summary(blocks: &BlockCounts) -> Option<String> {
    let parts: Vec<String> = [
        (blocks.highlighted, "highlighted"),
        (blocks.cached, "cached"),
        (blocks.fallbacks, "plain"),
    ]
    .iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{} {}", n, label))
    .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the scanned documents, collections and config.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Documents".to_string());
    for (i, doc) in manifest.documents.iter().enumerate() {
        lines.push(entity_header(i + 1, &doc.title, doc.is_draft()));
        lines.push(format!("{}Source: {}", indent(1), slash_path(&doc.source)));
        if let Some(layout) = &doc.front_matter.layout {
            lines.push(format!("{}Layout: {}", indent(1), layout));
        }
    }

    if !manifest.collections.is_empty() {
        lines.push(String::new());
        lines.push("Collections".to_string());
        for (name, collection) in &manifest.collections {
            lines.push(format!(
                "{}{} ({})",
                indent(1),
                name,
                plural(collection.len(), "document", "documents")
            ));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join(CONFIG_FILENAME).exists() {
        lines.push(format!("{}{}", indent(1), CONFIG_FILENAME));
    }
    if !manifest.config.passthrough.is_empty() {
        lines.push(format!(
            "{}Passthrough: {}",
            indent(1),
            manifest.config.passthrough.join(", ")
        ));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::HighlighterReady { theme, languages } => {
            vec![format!(
                "Highlighter ready: {} ({})",
                theme,
                plural(languages.len(), "language", "languages")
            )]
        }
        BuildEvent::DocumentRendered {
            title,
            source,
            output,
            draft,
            blocks,
            ..
        } => {
            let mut lines = vec![format!("{} \u{2192} {}", title, slash_path(output))];
            lines.push(format!("{}Source: {}", indent(1), slash_path(source)));
            if let Some(summary) = block_summary(blocks) {
                lines.push(format!("{}Code: {}", indent(1), summary));
            }
            if *draft {
                lines.push(format!("{}Draft: not in collections", indent(1)));
            }
            lines
        }
    }
}

/// Format the end-of-build summary.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = summary_body(report);
    lines.push(format!("Cache: {}", report.cache_stats));
    lines.push(format!(
        "Passthrough: {} copied",
        plural(report.passthrough.len(), "file", "files")
    ));
    lines.push(format!("Generated {}", pages_line(report)));
    lines
}

/// Format the summary of a `check` run, which writes nothing.
pub fn format_check_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = summary_body(report);
    lines.push(format!(
        "Passthrough: {} to copy",
        plural(report.passthrough.len(), "file", "files")
    ));
    lines.push(format!("Rendered {}", pages_line(report)));
    lines
}

fn summary_body(report: &BuildReport) -> Vec<String> {
    match block_summary(&report.blocks) {
        Some(summary) => vec![format!("Code blocks: {}", summary)],
        None => vec!["Code blocks: none".to_string()],
    }
}

fn pages_line(report: &BuildReport) -> String {
    let pages = plural(report.pages.len(), "page", "pages");
    if report.drafts > 0 {
        format!("{} ({})", pages, plural(report.drafts, "draft", "drafts"))
    } else {
        pages
    }
}

pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}

pub fn print_check_summary(report: &BuildReport) {
    for line in format_check_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Languages output
// ============================================================================

/// Format the syntax and theme catalog, marking entries enabled in `[highlight]`.
///
/// Language markers come from [`LanguageEntry::enabled`](crate::highlight::LanguageEntry::enabled).
///
/// ```text
/// Languages (* = enabled)
///   * Rust [rs]
///     Python [py, py3, pyw, ...]
///
/// Themes (* = enabled, > = default)
///   > base16-ocean.dark
///   * InspiredGitHub
/// ```
pub fn format_catalog(catalog: &Catalog, highlight: &HighlightSection) -> Vec<String> {
    let mut lines = vec!["Languages (* = enabled)".to_string()];
    for entry in &catalog.languages {
        let marker = if entry.enabled { "*" } else { " " };
        if entry.tokens.is_empty() {
            lines.push(format!("  {} {}", marker, entry.name));
        } else {
            lines.push(format!("  {} {} [{}]", marker, entry.name, entry.tokens.join(", ")));
        }
    }

    lines.push(String::new());
    lines.push("Themes (* = enabled, > = default)".to_string());
    for theme in &catalog.themes {
        let marker = if *theme == highlight.theme {
            ">"
        } else if highlight.themes.contains(theme) {
            "*"
        } else {
            " "
        };
        lines.push(format!("  {} {}", marker, theme));
    }
    lines
}

pub fn print_catalog(catalog: &Catalog, highlight: &HighlightSection) {
    for line in format_catalog(catalog, highlight) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
