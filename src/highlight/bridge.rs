//! One-time engine construction behind a synchronous render hook.
//!
//! The document renderer's code fragment slot is synchronous: it is called
//! in the middle of a markdown traversal and cannot wait. Engine
//! construction, on the other hand, is slow and runs on its own thread.
//! [`HighlightBridge::initialize`] joins the two:
//!
//! 1. validate the [`HighlightConfig`] (no thread started on failure)
//! 2. spawn construction as a [`PendingEngine`]
//! 3. block until it finishes
//! 4. only then register the hook on the renderer
//!
//! A `HighlightBridge` value therefore always owns a finished engine, and the
//! hook cannot be reached before the engine exists. If construction fails, the
//! renderer's slot is left exactly as it was.

use super::backend::{ConfigurationError, HighlightBackend, HighlightError};
use super::engine::HighlightEngine;
use super::params::{CodeBlock, HighlightConfig, RenderedMarkup};
use crate::render::{CodeHighlighter, DocumentRenderer};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// An engine whose construction is still running on a background thread.
pub struct PendingEngine<B> {
    handle: JoinHandle<Result<B, ConfigurationError>>,
}

impl<B: Send + 'static> PendingEngine<B> {
    /// Start constructing on a dedicated thread.
    pub fn spawn<F>(build: F) -> Result<Self, ConfigurationError>
    where
        F: FnOnce() -> Result<B, ConfigurationError> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("highlight-engine".into())
            .spawn(build)
            .map_err(|e| ConfigurationError::Construction(e.to_string()))?;
        Ok(Self { handle })
    }

    /// Whether construction has finished (successfully or not).
    pub fn is_ready(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until construction completes.
    pub fn wait(self) -> Result<B, ConfigurationError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(ConfigurationError::Construction(
                "engine construction thread panicked".into(),
            )),
        }
    }
}

pub struct HighlightBridge {
    engine: Arc<dyn HighlightBackend>,
    config: HighlightConfig,
}

impl HighlightBridge {
    /// Construct the syntect engine and register its hook on `renderer`.
    pub fn initialize(
        config: HighlightConfig,
        renderer: &mut DocumentRenderer,
    ) -> Result<Self, ConfigurationError> {
        Self::initialize_with(config, renderer, |config| HighlightEngine::build(&config))
    }

    /// Like [`initialize`](Self::initialize), with a caller-supplied engine
    /// constructor. `build` runs on a background thread.
    pub fn initialize_with<B, F>(
        config: HighlightConfig,
        renderer: &mut DocumentRenderer,
        build: F,
    ) -> Result<Self, ConfigurationError>
    where
        B: HighlightBackend + 'static,
        F: FnOnce(HighlightConfig) -> Result<B, ConfigurationError> + Send + 'static,
    {
        config.validate()?;

        let started = Instant::now();
        let build_config = config.clone();
        let pending = PendingEngine::spawn(move || build(build_config))?;
        if !pending.is_ready() {
            tracing::debug!("waiting for highlight engine construction");
        }
        let engine: Arc<dyn HighlightBackend> = Arc::new(pending.wait()?);
        tracing::info!(
            theme = config.theme(),
            languages = config.langs().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "highlighter ready"
        );

        let hook_engine = Arc::clone(&engine);
        let theme = config.theme().to_string();
        let hook: CodeHighlighter = Arc::new(move |code: &str, language: &str| {
            hook_engine
                .highlight(&CodeBlock::new(code, language), &theme)
                .map(RenderedMarkup::into_string)
        });
        if renderer.set_code_highlighter(hook).is_some() {
            tracing::warn!("replaced a previously registered code fragment highlighter");
        }

        Ok(Self { engine, config })
    }

    /// Highlight `code` with the default theme.
    pub fn render(&self, code: &str, language: &str) -> Result<RenderedMarkup, HighlightError> {
        self.engine
            .highlight(&CodeBlock::new(code, language), self.config.theme())
    }

    /// Highlight `code` with one of the preloaded themes.
    pub fn render_with_theme(
        &self,
        code: &str,
        language: &str,
        theme: &str,
    ) -> Result<RenderedMarkup, HighlightError> {
        if !self.config.themes().iter().any(|t| t == theme) {
            return Err(HighlightError::UnknownTheme(theme.to_string()));
        }
        self.engine.highlight(&CodeBlock::new(code, language), theme)
    }

    pub fn default_theme(&self) -> &str {
        self.config.theme()
    }

    pub fn themes(&self) -> &[String] {
        self.config.themes()
    }

    /// Enabled language names as reported by the engine.
    pub fn languages(&self) -> Vec<String> {
        self.engine.languages()
    }

    /// Cache namespace for fragments produced by this bridge.
    ///
    /// Covers both the configuration and what the engine actually loaded, so
    /// editing a theme file in `theme_dir` changes it too.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.config.fingerprint().as_bytes());
        hasher.update(b"\0");
        hasher.update(self.engine.fingerprint().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
