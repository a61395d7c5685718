//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. The user file is a
//! sparse overlay on top of the stock defaults: specify only what you want
//! to change.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── site.toml                # Site config (overrides stock defaults)
//! ├── index.md
//! ├── articles/
//! │   └── first-post.md
//! └── assets/
//!     ├── css/main.css         # Copied through by `passthrough`
//!     └── type/body.woff2
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! passthrough = ["assets/css/*", "assets/type/*"]
//!
//! [site]
//! title = "Notes"
//! stylesheets = ["/assets/css/main.css"]
//!
//! [highlight]
//! theme = "base16-ocean.dark"          # Default theme for code blocks
//! themes = ["base16-ocean.dark", "InspiredGitHub"]
//! langs = ["rust", "bash", "javascript", "css", "html", "json"]
//! # theme_dir = "themes"               # Extra .tmTheme files
//! unknown_language = "plain"           # or "error"
//!
//! [collections.articles]
//! include_drafts = false
//! # tag = "rust"
//!
//! [layouts]
//! post = "article"                     # alias = built-in layout
//!
//! [processing]
//! max_processes = 4                    # Omit for auto = CPU cores
//! ```
//!
//! ## Merging
//!
//! Tables merge key by key, so `[collections.notes]` adds a collection next
//! to the stock `articles` one and `[layouts]` entries add aliases. Arrays
//! (`passthrough`, `langs`, ...) replace the default wholesale.
//!
//! Unknown keys are rejected to catch typos early.

use crate::highlight::{ConfigurationError, HighlightConfig};
use crate::layout::Layout;
use crate::render::UnknownLanguagePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file in the content root.
pub const CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config validation error: {0}")]
    Highlight(#[from] ConfigurationError),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Globs (relative to the content root) of files copied verbatim.
    pub passthrough: Vec<String>,
    /// Site-wide page settings.
    pub site: SiteSection,
    /// Syntax highlighting.
    pub highlight: HighlightSection,
    /// Named document collections.
    pub collections: BTreeMap<String, CollectionConfig>,
    /// Layout aliases: alias → built-in layout name.
    pub layouts: BTreeMap<String, String>,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            passthrough: vec!["assets/css/*".to_string(), "assets/type/*".to_string()],
            site: SiteSection::default(),
            highlight: HighlightSection::default(),
            collections: BTreeMap::from([("articles".to_string(), CollectionConfig::default())]),
            layouts: BTreeMap::from([("post".to_string(), "article".to_string())]),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.highlight
            .to_highlight_config(Path::new(""))
            .validate()?;

        if self.passthrough.iter().any(|g| g.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "passthrough globs must not be empty".into(),
            ));
        }
        if self.collections.keys().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "collection names must not be empty".into(),
            ));
        }
        for (alias, target) in &self.layouts {
            if Layout::from_name(target).is_none() {
                return Err(ConfigError::Validation(format!(
                    "layouts.{alias} points to unknown layout '{target}' (built-in: {})",
                    Layout::NAMES.join(", ")
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Site-wide page settings used by the layouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Site title, shown in the page header and `<title>` suffix.
    pub title: String,
    /// Stylesheet URLs linked from every page.
    pub stylesheets: Vec<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Notes".to_string(),
            stylesheets: vec!["/assets/css/main.css".to_string()],
        }
    }
}

/// Syntax highlighting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightSection {
    /// Default theme for code blocks. Must be listed in `themes`.
    pub theme: String,
    /// Themes to preload.
    pub themes: Vec<String>,
    /// Language identifiers to enable (names or file extensions).
    pub langs: Vec<String>,
    /// Directory of extra `.tmTheme` files, relative to the content root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_dir: Option<String>,
    /// What the renderer does with a code block in a language that is not enabled.
    pub unknown_language: UnknownLanguagePolicy,
}

impl Default for HighlightSection {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            themes: vec!["base16-ocean.dark".to_string(), "InspiredGitHub".to_string()],
            langs: ["rust", "bash", "javascript", "css", "html", "json"]
                .iter()
                .map(|l| l.to_string())
                .collect(),
            theme_dir: None,
            unknown_language: UnknownLanguagePolicy::Plain,
        }
    }
}

impl HighlightSection {
    /// Build the engine config, resolving `theme_dir` against the content root.
    pub fn to_highlight_config(&self, root: &Path) -> HighlightConfig {
        let config = HighlightConfig::new(
            self.theme.clone(),
            self.themes.iter().cloned(),
            self.langs.iter().cloned(),
        );
        match &self.theme_dir {
            Some(dir) => config.with_theme_dir(root.join(dir)),
            None => config,
        }
    }
}

/// Membership rules for one named collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Keep documents marked `draft = true`.
    pub include_drafts: bool,
    /// Only documents carrying this tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging the user's `site.toml` on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `site.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `site.toml` in the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-press configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the root of the content directory as site.toml.
# Tables merge with the defaults key by key; arrays replace them.
# Unknown keys will cause an error.

# Files copied verbatim into the output, same relative path.
# Globs are relative to the content root; * does not cross directories.
passthrough = ["assets/css/*", "assets/type/*"]

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Shown in the page header and appended to every <title>.
title = "Notes"

# Stylesheet URLs linked from every page.
stylesheets = ["/assets/css/main.css"]

# ---------------------------------------------------------------------------
# Syntax highlighting
# ---------------------------------------------------------------------------
[highlight]
# Theme applied to fenced code blocks. Must be listed in `themes`.
theme = "base16-ocean.dark"

# Themes to preload. Run `simple-press languages` for the full list.
themes = ["base16-ocean.dark", "InspiredGitHub"]

# Languages to enable, by name or file extension ("rust" or "rs").
# A misspelled or unknown entry fails the build.
langs = ["rust", "bash", "javascript", "css", "html", "json"]

# Directory of extra .tmTheme files, relative to the content root.
# Each file becomes a theme named after its file stem.
# theme_dir = "themes"

# Code blocks in languages not listed above:
#   "plain" - render them unhighlighted
#   "error" - fail the build
unknown_language = "plain"

# ---------------------------------------------------------------------------
# Collections
# ---------------------------------------------------------------------------
# Each [collections.NAME] table defines a named list of documents, ordered by
# date. Drafts (front matter `draft = true`) are left out unless
# include_drafts is set; they are still rendered as pages.
[collections.articles]
include_drafts = false
# Only documents with this tag:
# tag = "rust"

# ---------------------------------------------------------------------------
# Layout aliases
# ---------------------------------------------------------------------------
# alias = built-in layout. Built-in layouts: base, article, listing.
[layouts]
post = "article"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
