//! Value types passed into and out of the highlighting engine.

use super::backend::ConfigurationError;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Immutable highlighting configuration.
///
/// Built once at startup from the `[highlight]` section of `site.toml`.
/// Theme and language lists are ordered sets: duplicates are dropped on
/// construction, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    theme: String,
    themes: Vec<String>,
    langs: Vec<String>,
    theme_dir: Option<PathBuf>,
}

impl HighlightConfig {
    pub fn new<T, L>(theme: impl Into<String>, themes: T, langs: L) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        Self {
            theme: theme.into(),
            themes: dedup(themes.into_iter().map(Into::into)),
            langs: dedup(langs.into_iter().map(Into::into)),
            theme_dir: None,
        }
    }

    /// Load additional `.tmTheme` files from `dir` before resolving themes.
    pub fn with_theme_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.theme_dir = Some(dir.into());
        self
    }

    /// Default theme applied by [`HighlightBridge::render`](super::HighlightBridge::render).
    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn langs(&self) -> &[String] {
        &self.langs
    }

    pub fn theme_dir(&self) -> Option<&Path> {
        self.theme_dir.as_deref()
    }

    /// Structural checks that need no engine: a non-empty language set with
    /// no blank entries, and a default theme that is part of the theme set.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.langs.is_empty() {
            return Err(ConfigurationError::NoLanguages);
        }
        if self.langs.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigurationError::EmptyLanguage);
        }
        if !self.themes.iter().any(|t| t == &self.theme) {
            return Err(ConfigurationError::DefaultThemeNotEnabled(
                self.theme.clone(),
            ));
        }
        Ok(())
    }

    /// SHA-256 over every configured field that can change rendered markup.
    ///
    /// Part of [`HighlightBridge::fingerprint`](super::HighlightBridge::fingerprint),
    /// which also covers the contents of the loaded themes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"theme\0");
        hasher.update(self.theme.as_bytes());
        for theme in &self.themes {
            hasher.update(b"\0t\0");
            hasher.update(theme.as_bytes());
        }
        for lang in &self.langs {
            hasher.update(b"\0l\0");
            hasher.update(lang.as_bytes());
        }
        if let Some(dir) = &self.theme_dir {
            hasher.update(b"\0d\0");
            hasher.update(dir.to_string_lossy().as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// A fenced code block as handed over by the document renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlock<'a> {
    pub code: &'a str,
    /// Declared language tag; may be empty or unknown to the engine.
    pub language: &'a str,
}

impl<'a> CodeBlock<'a> {
    pub fn new(code: &'a str, language: &'a str) -> Self {
        Self { code, language }
    }
}

/// An HTML fragment produced by highlighting one [`CodeBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkup(String);

impl RenderedMarkup {
    pub fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
