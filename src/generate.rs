//! Site build orchestration.
//!
//! Ties the stages together. `build` runs all of them; `check` stops after
//! rendering and writes nothing.
//!
//! ```text
//! 1. Config     site.toml              → SiteConfig
//! 2. Renderer   [highlight] policy     → DocumentRenderer (+ highlight cache)
//! 3. Highlight  HighlightBridge::initialize (blocks until the engine is built)
//! 4. Scan       content/               → Manifest
//! 5. Collect    [collections.*]        → ordered members (part of the scan)
//! 6. Render     documents, in parallel → pages
//! 7. Write      pages                  → dist/**/index.html
//! 8. Copy       passthrough globs      → dist/assets/...
//! 9. Cache      prune + save           → dist/.highlight-cache.json
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                      # index.md (listing of `articles`)
//! ├── about/index.html
//! ├── articles/
//! │   ├── first-post/index.html
//! │   └── unfinished/index.html       # draft: rendered, not listed
//! ├── assets/css/main.css             # passthrough
//! └── .highlight-cache.json
//! ```
//!
//! ## Parallel Rendering
//!
//! Documents are rendered with [rayon](https://docs.rs/rayon). The renderer is
//! shared by reference: the highlight hook only reads the engine, and the
//! cache sits behind a mutex. Progress is reported as [`BuildEvent`]s over an
//! optional channel so the CLI can print while workers run.

use crate::cache::{CacheStats, HighlightCache};
use crate::config::{self, ConfigError, SiteConfig};
use crate::highlight::{ConfigurationError, HighlightBridge};
use crate::layout::{self, Layout, LayoutError, Page};
use crate::passthrough::{self, PassthroughError};
use crate::render::{BlockCounts, DocumentRenderer, RenderError};
use crate::scan::{self, Manifest, ScanError};
use crate::types::Document;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Highlighter setup failed: {0}")]
    Highlight(#[from] ConfigurationError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Failed to render {document}: {source}")]
    Render {
        document: PathBuf,
        source: RenderError,
    },
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Passthrough error: {0}")]
    Passthrough(#[from] PassthroughError),
}

/// Progress events emitted while building.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    /// The highlighting engine finished constructing.
    HighlighterReady {
        theme: String,
        languages: Vec<String>,
    },
    /// A document was rendered (not yet written).
    DocumentRendered {
        title: String,
        source: PathBuf,
        output: PathBuf,
        layout: Layout,
        draft: bool,
        blocks: BlockCounts,
    },
}

#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Reuse fragments from `.highlight-cache.json` and save it afterwards.
    pub use_cache: bool,
    pub events: Option<Sender<BuildEvent>>,
}

/// A rendered page waiting to be written.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Path relative to the output root.
    pub output: PathBuf,
    pub html: String,
}

/// Summary of a build or check run.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    pub drafts: usize,
    /// Collection name and member count.
    pub collections: Vec<(String, usize)>,
    pub blocks: BlockCounts,
    pub cache_stats: CacheStats,
    /// Passthrough files, relative to the content root. For `check`, the files
    /// that would be copied.
    pub passthrough: Vec<PathBuf>,
}

/// Build the site from `source` into `output`.
pub fn build(source: &Path, output: &Path, options: BuildOptions) -> Result<BuildReport, GenerateError> {
    let config = config::load_config(source)?;
    let mut renderer = DocumentRenderer::new(config.highlight.unknown_language);
    let bridge =
        HighlightBridge::initialize(config.highlight.to_highlight_config(source), &mut renderer)?;
    emit_ready(&bridge, options.events.as_ref());

    let fingerprint = bridge.fingerprint();
    let cache = if options.use_cache {
        HighlightCache::load(output, &fingerprint)
    } else {
        HighlightCache::empty(&fingerprint)
    };
    let mut renderer = renderer.with_cache(cache);

    let manifest = scan::scan_with_config(source, config)?;
    let pages = render_documents(&manifest, &renderer, options.events.as_ref())?;

    fs::create_dir_all(output)?;
    for (page, _) in &pages {
        write_page(output, page)?;
    }

    let copied = passthrough::copy(source, output, &manifest.config.passthrough)?;

    if let Some(mut cache) = renderer.take_cache() {
        cache.prune_untouched();
        if options.use_cache {
            cache.save(output)?;
        }
    }

    Ok(report(&manifest, &pages, copied))
}

/// Run config, highlighter setup, scan and render without writing anything.
///
/// Returns the manifest alongside the report so callers can show what was
/// found.
pub fn check(source: &Path) -> Result<(Manifest, BuildReport), GenerateError> {
    let config = config::load_config(source)?;
    let mut renderer = DocumentRenderer::new(config.highlight.unknown_language);
    HighlightBridge::initialize(config.highlight.to_highlight_config(source), &mut renderer)?;

    let manifest = scan::scan_with_config(source, config)?;
    let pages = render_documents(&manifest, &renderer, None)?;
    let matcher = passthrough::build_matcher(&manifest.config.passthrough)?;
    let would_copy = passthrough::matching_files(source, &matcher)?;

    let report = report(&manifest, &pages, would_copy);
    Ok((manifest, report))
}

/// Render every document in the manifest to a full HTML page.
///
/// Documents are rendered in parallel. The first failure aborts the run.
pub fn render_documents(
    manifest: &Manifest,
    renderer: &DocumentRenderer,
    events: Option<&Sender<BuildEvent>>,
) -> Result<Vec<(RenderedPage, BlockCounts)>, GenerateError> {
    manifest
        .documents
        .par_iter()
        .map(|doc| {
            let (page, layout, blocks) = render_document(manifest, renderer, doc)?;
            if let Some(tx) = events {
                tx.send(BuildEvent::DocumentRendered {
                    title: doc.title.clone(),
                    source: doc.source.clone(),
                    output: doc.output.clone(),
                    layout,
                    draft: doc.is_draft(),
                    blocks,
                })
                .ok();
            }
            Ok((page, blocks))
        })
        .collect()
}

fn render_document(
    manifest: &Manifest,
    renderer: &DocumentRenderer,
    doc: &Document,
) -> Result<(RenderedPage, Layout, BlockCounts), GenerateError> {
    let config: &SiteConfig = &manifest.config;
    let layout = layout::resolve(doc.front_matter.layout.as_deref(), &config.layouts)?;
    let listing = if layout == Layout::Listing {
        listing_for(manifest, doc)?
    } else {
        Vec::new()
    };

    let rendered = renderer
        .render_markdown(&doc.body)
        .map_err(|source| GenerateError::Render {
            document: doc.source.clone(),
            source,
        })?;

    let markup = layout::render_page(
        layout,
        &Page {
            site: &config.site,
            document: doc,
            content: &rendered.html,
            listing: &listing,
        },
    );
    let page = RenderedPage {
        output: doc.output.clone(),
        html: markup.into_string(),
    };
    Ok((page, layout, rendered.blocks))
}

fn listing_for<'a>(manifest: &'a Manifest, doc: &Document) -> Result<Vec<&'a Document>, LayoutError> {
    let name = doc
        .front_matter
        .list
        .as_deref()
        .ok_or_else(|| LayoutError::MissingList {
            document: doc.source.clone(),
        })?;
    manifest
        .collection_documents(name)
        .ok_or_else(|| LayoutError::UnknownCollection {
            document: doc.source.clone(),
            name: name.to_string(),
        })
}

fn write_page(output_dir: &Path, page: &RenderedPage) -> std::io::Result<()> {
    let path = output_dir.join(&page.output);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &page.html)
}

fn emit_ready(bridge: &HighlightBridge, events: Option<&Sender<BuildEvent>>) {
    if let Some(tx) = events {
        tx.send(BuildEvent::HighlighterReady {
            theme: bridge.default_theme().to_string(),
            languages: bridge.languages(),
        })
        .ok();
    }
}

fn report(
    manifest: &Manifest,
    pages: &[(RenderedPage, BlockCounts)],
    passthrough: Vec<PathBuf>,
) -> BuildReport {
    let mut blocks = BlockCounts::default();
    for (_, counts) in pages {
        blocks.highlighted += counts.highlighted;
        blocks.cached += counts.cached;
        blocks.fallbacks += counts.fallbacks;
    }
    BuildReport {
        pages: pages.iter().map(|(page, _)| page.output.clone()).collect(),
        drafts: manifest.documents.iter().filter(|d| d.is_draft()).count(),
        collections: manifest
            .collections
            .iter()
            .map(|(name, c)| (name.clone(), c.len()))
            .collect(),
        blocks,
        cache_stats: CacheStats {
            hits: blocks.cached,
            misses: blocks.highlighted,
        },
        passthrough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn build_fixtures(use_cache: bool) -> (TempDir, TempDir, BuildReport) {
        let src = setup_fixtures();
        let out = TempDir::new().unwrap();
        let report = build(
            src.path(),
            out.path(),
            BuildOptions {
                use_cache,
                events: None,
            },
        )
        .unwrap();
        (src, out, report)
    }

    #[test]
    fn build_writes_every_document() {
        let (_src, out, report) = build_fixtures(false);
        assert_eq!(report.pages.len(), 5);
        for page in &report.pages {
            assert!(out.path().join(page).exists(), "missing {}", page.display());
        }
        assert!(out.path().join("articles/first-post/index.html").exists());
    }

    #[test]
    fn build_highlights_fenced_blocks() {
        let (_src, out, report) = build_fixtures(false);
        let html = read_output(out.path(), "articles/first-post/index.html");
        assert!(html.contains(r#"data-theme="base16-ocean.dark""#));
        assert!(html.contains(r#"class="language-rust""#));
        assert!(html.contains("<span style="));
        assert!(report.blocks.highlighted >= 2);
    }

    #[test]
    fn build_falls_back_for_unconfigured_language() {
        let (_src, out, report) = build_fixtures(false);
        let html = read_output(out.path(), "articles/shell-tricks/index.html");
        assert!(html.contains(r#"<pre><code class="language-python">"#));
        assert_eq!(report.blocks.fallbacks, 1);
    }

    #[test]
    fn drafts_rendered_but_not_listed() {
        let (_src, out, report) = build_fixtures(false);
        assert_eq!(report.drafts, 1);
        assert!(out.path().join("articles/unfinished/index.html").exists());

        let index = read_output(out.path(), "index.html");
        assert!(index.contains(r#"href="/articles/first-post/""#));
        assert!(!index.contains("/articles/unfinished/"));
    }

    #[test]
    fn alias_layout_renders_article() {
        let (_src, out, _) = build_fixtures(false);
        let html = read_output(out.path(), "articles/first-post/index.html");
        assert!(html.contains("<h1>Hello, highlighting</h1>"));
        assert!(html.contains(r#"<time datetime="2024-03-01">"#));
    }

    #[test]
    fn build_copies_passthrough_files() {
        let (_src, out, report) = build_fixtures(false);
        assert_eq!(
            report.passthrough,
            vec![
                PathBuf::from("assets/css/main.css"),
                PathBuf::from("assets/type/body.woff2"),
            ]
        );
        assert!(out.path().join("assets/css/main.css").exists());
        assert!(!out.path().join("assets/notes.txt").exists());
    }

    #[test]
    fn second_build_serves_highlights_from_cache() {
        let src = setup_fixtures();
        let out = TempDir::new().unwrap();
        let options = || BuildOptions {
            use_cache: true,
            events: None,
        };

        let first = build(src.path(), out.path(), options()).unwrap();
        assert_eq!(first.cache_stats.hits, 0);
        assert!(crate::cache::cache_path(out.path()).exists());

        let second = build(src.path(), out.path(), options()).unwrap();
        assert_eq!(second.cache_stats.misses, 0);
        assert_eq!(second.cache_stats.hits, first.cache_stats.misses);
    }

    #[test]
    fn edited_theme_file_invalidates_cache() {
        let src = setup_fixtures();
        let out = TempDir::new().unwrap();
        write_file(
            src.path(),
            "site.toml",
            "[highlight]\ntheme = \"mine\"\nthemes = [\"mine\"]\ntheme_dir = \"themes\"\n",
        );
        let options = || BuildOptions {
            use_cache: true,
            events: None,
        };

        write_file(src.path(), "themes/mine.tmTheme", &theme_with_background("#101010"));
        let first = build(src.path(), out.path(), options()).unwrap();
        assert!(first.cache_stats.misses > 0);

        write_file(src.path(), "themes/mine.tmTheme", &theme_with_background("#fafafa"));
        let second = build(src.path(), out.path(), options()).unwrap();
        assert_eq!(second.cache_stats.hits, 0);
        assert_eq!(second.cache_stats.misses, first.cache_stats.misses);

        let html = read_output(out.path(), "articles/first-post/index.html");
        assert!(html.contains("background-color:#fafafa;"));
        assert!(!html.contains("background-color:#101010;"));
    }

    fn theme_with_background(background: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>name</key>
    <string>Mine</string>
    <key>settings</key>
    <array>
        <dict>
            <key>settings</key>
            <dict>
                <key>background</key>
                <string>{background}</string>
                <key>foreground</key>
                <string>#808080</string>
            </dict>
        </dict>
    </array>
</dict>
</plist>
"#
        )
    }

    #[test]
    fn build_without_cache_writes_no_cache_file() {
        let (_src, out, _) = build_fixtures(false);
        assert!(!crate::cache::cache_path(out.path()).exists());
    }

    #[test]
    fn build_emits_events() {
        let src = setup_fixtures();
        let out = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        build(
            src.path(),
            out.path(),
            BuildOptions {
                use_cache: false,
                events: Some(tx),
            },
        )
        .unwrap();

        let events: Vec<BuildEvent> = rx.iter().collect();
        assert!(matches!(events[0], BuildEvent::HighlighterReady { .. }));
        let rendered = events
            .iter()
            .filter(|e| matches!(e, BuildEvent::DocumentRendered { .. }))
            .count();
        assert_eq!(rendered, 5);
    }

    #[test]
    fn unknown_layout_fails_build() {
        let src = setup_fixtures();
        write_file(
            src.path(),
            "broken.md",
            "+++\nlayout = \"layouts/post.njk\"\n+++\nbody\n",
        );
        let out = TempDir::new().unwrap();
        let err = build(src.path(), out.path(), BuildOptions::default()).unwrap_err();
        assert!(matches!(err, GenerateError::Layout(LayoutError::Unknown(_))));
    }

    #[test]
    fn listing_without_collection_fails() {
        let src = setup_fixtures();
        write_file(src.path(), "list.md", "+++\nlayout = \"listing\"\n+++\n");
        assert!(matches!(
            check(src.path()),
            Err(GenerateError::Layout(LayoutError::MissingList { .. }))
        ));
    }

    #[test]
    fn invalid_highlight_config_fails_before_scan() {
        let src = setup_fixtures();
        write_file(
            src.path(),
            "site.toml",
            "[highlight]\ntheme = \"missing\"\nthemes = [\"missing\"]\n",
        );
        // An unterminated front matter would fail the scan; the highlighter
        // error must come first.
        write_file(src.path(), "bad.md", "+++\nno end\n");
        let err = check(src.path()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Highlight(ConfigurationError::UnknownTheme(_))
        ));
    }

    #[test]
    fn default_theme_outside_theme_set_keeps_error_kind() {
        let src = setup_fixtures();
        write_file(
            src.path(),
            "site.toml",
            "[highlight]\ntheme = \"InspiredGitHub\"\nthemes = [\"base16-ocean.dark\"]\n",
        );
        let err = check(src.path()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Config(ConfigError::Highlight(
                ConfigurationError::DefaultThemeNotEnabled(_)
            ))
        ));
    }

    #[test]
    fn error_policy_fails_on_unconfigured_language() {
        let src = setup_fixtures();
        write_file(
            src.path(),
            "site.toml",
            "[highlight]\nunknown_language = \"error\"\n",
        );
        let err = check(src.path()).unwrap_err();
        assert!(matches!(err, GenerateError::Render { .. }));
    }

    #[test]
    fn check_writes_nothing() {
        let src = setup_fixtures();
        let before = std::fs::read_dir(src.path()).unwrap().count();
        let (manifest, report) = check(src.path()).unwrap();
        assert_eq!(manifest.documents.len(), 5);
        assert_eq!(report.pages.len(), 5);
        assert_eq!(report.passthrough.len(), 2);
        assert_eq!(std::fs::read_dir(src.path()).unwrap().count(), before);
    }
}
