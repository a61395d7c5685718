//! Markdown to HTML with a pluggable code fragment highlighter.
//!
//! [`DocumentRenderer`] converts markdown with pulldown-cmark. Fenced code
//! blocks are intercepted and handed to the **code fragment highlighter**, a
//! single extension slot filled by
//! [`HighlightBridge::initialize`](crate::highlight::HighlightBridge::initialize).
//!
//! ## Extension slot
//!
//! The slot holds one synchronous hook `(code, language) -> html`. Setting it
//! again replaces the previous hook (last writer wins) and returns the old one
//! to the caller.
//!
//! ## Unknown languages
//!
//! The hook fails for languages the engine does not have enabled. What happens
//! next is the renderer's call, chosen by [`UnknownLanguagePolicy`]:
//!
//! | Policy | Result |
//! |---|---|
//! | `plain` | unhighlighted `<pre><code class="language-x">`, counted as a fallback |
//! | `error` | the document fails to render |
//!
//! Indented code blocks carry no language and are never sent to the hook.

use crate::cache::HighlightCache;
use crate::highlight::HighlightError;
use maud::html;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html as md_html};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// The code fragment highlighter hook.
pub type CodeHighlighter = Arc<dyn Fn(&str, &str) -> Result<String, HighlightError> + Send + Sync>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("code block highlighting failed: {0}")]
    Highlight(#[from] HighlightError),
}

/// What to do with a fenced block the highlighter rejects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownLanguagePolicy {
    /// Emit the block unhighlighted.
    #[default]
    Plain,
    /// Fail the document.
    Error,
}

/// Per-document tally of how fenced code blocks were rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockCounts {
    /// Rendered by the highlighter hook.
    pub highlighted: u32,
    /// Served from the highlight cache without calling the hook.
    pub cached: u32,
    /// Emitted unhighlighted under [`UnknownLanguagePolicy::Plain`].
    pub fallbacks: u32,
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub html: String,
    pub blocks: BlockCounts,
}

pub struct DocumentRenderer {
    highlighter: Option<CodeHighlighter>,
    policy: UnknownLanguagePolicy,
    cache: Option<Mutex<HighlightCache>>,
}

impl DocumentRenderer {
    pub fn new(policy: UnknownLanguagePolicy) -> Self {
        Self {
            highlighter: None,
            policy,
            cache: None,
        }
    }

    /// Serve repeated code blocks from `cache` instead of re-highlighting.
    pub fn with_cache(mut self, cache: HighlightCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    /// Fill the code fragment highlighter slot, returning the hook it replaces.
    pub fn set_code_highlighter(&mut self, hook: CodeHighlighter) -> Option<CodeHighlighter> {
        self.highlighter.replace(hook)
    }

    pub fn has_code_highlighter(&self) -> bool {
        self.highlighter.is_some()
    }

    pub fn policy(&self) -> UnknownLanguagePolicy {
        self.policy
    }

    /// Take the cache back out, e.g. to prune and save it after a build.
    pub fn take_cache(&mut self) -> Option<HighlightCache> {
        self.cache
            .take()
            .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    /// Render a markdown document body to an HTML fragment.
    pub fn render_markdown(&self, source: &str) -> Result<RenderedDocument, RenderError> {
        let mut blocks = BlockCounts::default();
        let mut events = Vec::new();
        // (language, accumulated code) while inside a fenced block
        let mut fence: Option<(String, String)> = None;

        for event in Parser::new_ext(source, markdown_options()) {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    fence = Some((fence_language(&info).to_string(), String::new()));
                }
                Event::Text(text) if fence.is_some() => {
                    if let Some((_, code)) = fence.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) if fence.is_some() => {
                    if let Some((language, code)) = fence.take() {
                        let markup = self.render_code_block(&code, &language, &mut blocks)?;
                        events.push(Event::Html(markup.into()));
                    }
                }
                other => events.push(other),
            }
        }

        let mut html = String::with_capacity(source.len() * 3 / 2);
        md_html::push_html(&mut html, events.into_iter());
        Ok(RenderedDocument { html, blocks })
    }

    fn render_code_block(
        &self,
        code: &str,
        language: &str,
        blocks: &mut BlockCounts,
    ) -> Result<String, RenderError> {
        let Some(highlight) = &self.highlighter else {
            return Ok(plain_code_block(code, language));
        };

        let key = self
            .cache
            .as_ref()
            .map(|_| HighlightCache::key(language, code));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(markup) = cache.get(key) {
                blocks.cached += 1;
                return Ok(markup.to_string());
            }
        }

        match highlight(code, language) {
            Ok(markup) => {
                blocks.highlighted += 1;
                if let (Some(cache), Some(key)) = (&self.cache, key) {
                    cache
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(key, markup.clone());
                }
                Ok(markup)
            }
            Err(err) => match self.policy {
                UnknownLanguagePolicy::Plain => {
                    tracing::warn!(%err, "rendering code block without highlighting");
                    blocks.fallbacks += 1;
                    Ok(plain_code_block(code, language))
                }
                UnknownLanguagePolicy::Error => Err(err.into()),
            },
        }
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// First word of a fence info string: ```` ```rust,ignore ```` → `rust`.
fn fence_language(info: &str) -> &str {
    info.split(|c: char| c == ',' || c.is_whitespace())
        .next()
        .unwrap_or("")
}

fn plain_code_block(code: &str, language: &str) -> String {
    let class = (!language.is_empty()).then(|| format!("language-{language}"));
    html! {
        pre { code class=[class] { (code) } }
    }
    .into_string()
}
