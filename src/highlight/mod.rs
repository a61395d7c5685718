//! Build-time syntax highlighting.
//!
//! | Piece | Role |
//! |---|---|
//! | [`HighlightConfig`] | immutable theme + language selection from `site.toml` |
//! | [`HighlightEngine`] | syntect syntaxes and preloaded themes, read-only once built |
//! | [`HighlightBridge`] | constructs the engine off-thread, waits, then registers the renderer hook |
//! | [`HighlightBackend`] | trait seam between bridge and engine |
//!
//! The module is split into:
//! - **Params**: config and the per-call value types
//! - **Backend**: the [`HighlightBackend`] trait and error taxonomy
//! - **Engine**: the syntect implementation and the language/theme catalog
//! - **Bridge**: asynchronous construction, synchronous rendering

mod backend;
mod bridge;
pub mod engine;
mod params;

pub use backend::{ConfigurationError, HighlightBackend, HighlightError};
pub use bridge::{HighlightBridge, PendingEngine};
pub use engine::{Catalog, HighlightEngine, LanguageEntry, catalog};
pub use params::{CodeBlock, HighlightConfig, RenderedMarkup};
