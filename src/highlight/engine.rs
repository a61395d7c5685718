//! syntect-backed highlighting engine.
//!
//! Construction loads the bundled syntax definitions and theme set, plus any
//! `.tmTheme` files from the configured theme directory, then keeps only the
//! themes and languages named in the [`HighlightConfig`]. Loading the syntax
//! set dominates startup, which is why the bridge runs [`HighlightEngine::build`]
//! off the calling thread.
//!
//! Output is inline-styled HTML:
//!
//! ```html
//! <pre class="highlight" data-theme="base16-ocean.dark" data-lang="rust" style="background-color:#2b303b;">
//!   <code class="language-rust"><span style="color:#b48ead;">fn</span> ...</code>
//! </pre>
//! ```

use super::backend::{ConfigurationError, HighlightBackend, HighlightError};
use super::params::{CodeBlock, HighlightConfig, RenderedMarkup};
use maud::{PreEscaped, html};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

pub struct HighlightEngine {
    syntaxes: SyntaxSet,
    themes: BTreeMap<String, Theme>,
    /// Syntax names (not tokens) resolved from the configured languages.
    enabled: BTreeSet<String>,
    /// SHA-256 over the resolved themes, so edits to a `.tmTheme` file show up.
    theme_digest: String,
}

impl HighlightEngine {
    /// Construct the engine on the current thread, blocking until done.
    pub fn build(config: &HighlightConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let started = Instant::now();

        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut available = load_theme_set(config.theme_dir())?;

        let mut themes = BTreeMap::new();
        for name in config.themes() {
            let theme = available
                .themes
                .remove(name)
                .ok_or_else(|| ConfigurationError::UnknownTheme(name.clone()))?;
            themes.insert(name.clone(), theme);
        }

        let theme_digest = digest_themes(&themes)?;

        let mut enabled = BTreeSet::new();
        for lang in config.langs() {
            let syntax = syntaxes
                .find_syntax_by_token(lang.trim())
                .ok_or_else(|| ConfigurationError::UnknownLanguage(lang.clone()))?;
            enabled.insert(syntax.name.clone());
        }

        tracing::debug!(
            themes = themes.len(),
            languages = enabled.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "highlight engine constructed"
        );

        Ok(Self {
            syntaxes,
            themes,
            enabled,
            theme_digest,
        })
    }

    fn resolve(&self, language: &str) -> Result<&SyntaxReference, HighlightError> {
        let token = language.trim();
        if token.is_empty() {
            return Err(HighlightError::MissingLanguage);
        }
        self.syntaxes
            .find_syntax_by_token(token)
            .filter(|syntax| self.enabled.contains(&syntax.name))
            .ok_or_else(|| HighlightError::UnknownLanguage(token.to_string()))
    }
}

impl HighlightBackend for HighlightEngine {
    fn highlight(
        &self,
        block: &CodeBlock<'_>,
        theme_name: &str,
    ) -> Result<RenderedMarkup, HighlightError> {
        let syntax = self.resolve(block.language)?;
        let theme = self
            .themes
            .get(theme_name)
            .ok_or_else(|| HighlightError::UnknownTheme(theme_name.to_string()))?;

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut body = String::with_capacity(block.code.len() * 4);
        for line in LinesWithEndings::from(block.code) {
            let regions = highlighter
                .highlight_line(line, &self.syntaxes)
                .map_err(|e| HighlightError::Engine(e.to_string()))?;
            let line_html = styled_line_to_highlighted_html(&regions[..], IncludeBackground::No)
                .map_err(|e| HighlightError::Engine(e.to_string()))?;
            body.push_str(&line_html);
        }

        let language = block.language.trim();
        let background = theme.settings.background.map(background_style);
        let markup = html! {
            pre.highlight data-theme=(theme_name) data-lang=(language) style=[background] {
                code class={ "language-" (language) } { (PreEscaped(body)) }
            }
        };
        Ok(RenderedMarkup::new(markup.into_string()))
    }

    fn languages(&self) -> Vec<String> {
        self.enabled.iter().cloned().collect()
    }

    fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.theme_digest.as_bytes());
        for name in &self.enabled {
            hasher.update(b"\0l\0");
            hasher.update(name.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

fn digest_themes(themes: &BTreeMap<String, Theme>) -> Result<String, ConfigurationError> {
    let mut hasher = Sha256::new();
    for (name, theme) in themes {
        let encoded = serde_json::to_vec(theme)
            .map_err(|e| ConfigurationError::Construction(format!("theme '{name}': {e}")))?;
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
        hasher.update(&encoded);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn background_style(color: Color) -> String {
    format!(
        "background-color:#{:02x}{:02x}{:02x};",
        color.r, color.g, color.b
    )
}

fn load_theme_set(theme_dir: Option<&Path>) -> Result<ThemeSet, ConfigurationError> {
    let mut set = ThemeSet::load_defaults();
    if let Some(dir) = theme_dir {
        set.add_from_folder(dir)
            .map_err(|e| ConfigurationError::ThemeDir {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
    }
    Ok(set)
}

/// A syntax the engine could be configured to highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    pub name: String,
    pub tokens: Vec<String>,
    /// Whether one of the configured languages resolves to this syntax.
    pub enabled: bool,
}

/// Everything that can be named in `highlight.themes` and `highlight.langs`.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub languages: Vec<LanguageEntry>,
    pub themes: Vec<String>,
}

/// List the bundled syntaxes and themes, plus themes found in `theme_dir`.
///
/// Each configured language in `langs` is resolved with the same token lookup
/// the engine uses, and the syntax it lands on is marked enabled.
pub fn catalog(theme_dir: Option<&Path>, langs: &[String]) -> Result<Catalog, ConfigurationError> {
    let syntaxes = SyntaxSet::load_defaults_newlines();
    let themes = load_theme_set(theme_dir)?;

    let enabled: BTreeSet<&str> = langs
        .iter()
        .filter_map(|lang| syntaxes.find_syntax_by_token(lang.trim()))
        .map(|syntax| syntax.name.as_str())
        .collect();

    let mut languages: Vec<LanguageEntry> = syntaxes
        .syntaxes()
        .iter()
        .map(|s| LanguageEntry {
            name: s.name.clone(),
            tokens: s.file_extensions.clone(),
            enabled: enabled.contains(s.name.as_str()),
        })
        .collect();
    languages.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    Ok(Catalog {
        languages,
        themes: themes.themes.into_keys().collect(),
    })
}
