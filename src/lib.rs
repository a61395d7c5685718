//! # Simple Press
//!
//! A minimal static site generator for articles and documentation, with
//! syntax highlighting done once at build time. Markdown files become pages,
//! fenced code blocks become colored HTML, and the published site needs no
//! JavaScript to show them.
//!
//! # Architecture: One Pass, One Engine
//!
//! ```text
//! 1. Config     site.toml             → SiteConfig (validated)
//! 2. Highlight  [highlight]           → HighlightBridge (engine ready, hook registered)
//! 3. Scan       content/              → Manifest (documents + collections)
//! 4. Render     Manifest + renderer   → HTML pages (parallel, cached highlights)
//! 5. Copy       passthrough globs     → copied assets
//! ```
//!
//! The highlighting engine is expensive to build (it loads every grammar and
//! theme) and is built exactly once, on its own thread, before any document is
//! rendered. After that, highlighting a code block is a plain synchronous
//! function call that many rendering threads share.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`highlight`] | Highlight config, the syntect engine, and the bridge that registers it on the renderer |
//! | [`render`] | Markdown → HTML with a pluggable code fragment highlighter |
//! | [`cache`] | Content-addressed cache of highlighted fragments |
//! | [`scan`] | Walks the content directory, parses front matter, produces the manifest |
//! | [`collections`] | Named, filtered, date-ordered document lists |
//! | [`layout`] | Built-in Maud layouts and layout aliases |
//! | [`passthrough`] | Verbatim copy of static assets |
//! | [`generate`] | Build orchestration and progress events |
//! | [`config`] | `site.toml` loading, merging and validation |
//! | [`types`] | Shared document types (`FrontMatter`, `Document`) |
//! | [`naming`] | Date-prefixed file names, slugs and output paths |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Build-Time Highlighting
//!
//! Code is highlighted with [syntect](https://docs.rs/syntect) using Sublime
//! Text grammars and `.tmTheme` themes. Colors are inlined as `style`
//! attributes, so the output needs neither a client-side highlighter nor a
//! theme stylesheet.
//!
//! ## Construct Once, Then Block
//!
//! [`highlight::HighlightBridge::initialize`] starts engine construction on a
//! background thread and joins it before registering the hook. A bridge value
//! exists only once its engine does, so the render path never has to check
//! whether the engine is ready.
//!
//! ## Maud Over Template Engines
//!
//! Layouts are [Maud](https://maud.lambda.xyz/) templates compiled into the
//! binary: malformed HTML is a build error, interpolation is escaped by
//! default, and there is no template directory to ship. Sites choose between
//! the built-in layouts by name or alias.
//!
//! ## Drafts Are Pages
//!
//! `draft = true` keeps a document out of every collection, and so out of
//! listing pages, but the page itself is still generated and reachable by URL.

pub mod cache;
pub mod collections;
pub mod config;
pub mod generate;
pub mod highlight;
pub mod layout;
pub mod naming;
pub mod output;
pub mod passthrough;
pub mod render;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
