//! Highlighting backend trait and error taxonomy.
//!
//! The [`HighlightBackend`] trait is the seam between the bridge and the
//! engine that actually tokenizes and colors code. The production
//! implementation is [`HighlightEngine`](super::engine::HighlightEngine),
//! backed by syntect. Tests substitute a recording mock.
//!
//! Two error kinds cross this seam:
//!
//! | Error | When | Who handles it |
//! |---|---|---|
//! | [`ConfigurationError`] | engine construction, before any rendering | fatal, aborts the build |
//! | [`HighlightError`] | a single render call | the document renderer's policy |

use super::params::{CodeBlock, RenderedMarkup};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("highlight.langs must not be empty")]
    NoLanguages,
    #[error("highlight.langs contains an empty language identifier")]
    EmptyLanguage,
    #[error("default theme '{0}' is not listed in highlight.themes")]
    DefaultThemeNotEnabled(String),
    #[error("unknown theme '{0}'")]
    UnknownTheme(String),
    #[error("unknown language '{0}'")]
    UnknownLanguage(String),
    #[error("failed to load themes from {path}: {message}")]
    ThemeDir { path: PathBuf, message: String },
    #[error("highlight engine construction failed: {0}")]
    Construction(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    #[error("code block declares no language")]
    MissingLanguage,
    #[error("language '{0}' is not enabled for highlighting")]
    UnknownLanguage(String),
    #[error("theme '{0}' is not preloaded")]
    UnknownTheme(String),
    #[error("highlighting failed: {0}")]
    Engine(String),
}

/// A fully constructed highlighting engine.
///
/// Implementations are read-only after construction: every method takes
/// `&self` and must be safe to call from several rayon workers at once.
pub trait HighlightBackend: Send + Sync {
    /// Render one code block with the named (preloaded) theme.
    fn highlight(
        &self,
        block: &CodeBlock<'_>,
        theme: &str,
    ) -> Result<RenderedMarkup, HighlightError>;

    /// Names of the languages this engine accepts.
    fn languages(&self) -> Vec<String>;

    /// Digest of the loaded engine state that shapes rendered markup.
    fn fingerprint(&self) -> String;
}
