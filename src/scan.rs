//! Content directory scanning and manifest generation.
//!
//! Walks the content root to discover markdown documents, producing a
//! [`Manifest`] that the render stage consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                           # Content root
//! ├── site.toml                      # Site configuration (optional)
//! ├── index.md                       # → index.html
//! ├── about.md                       # → about/index.html
//! ├── articles/
//! │   ├── 2024-03-01-first-post.md   # → articles/first-post/index.html
//! │   └── 2024-05-20-unfinished.md   # draft: rendered, not collected
//! ├── assets/                        # Passthrough files, never documents
//! │   └── css/main.css
//! └── .scratch/                      # Hidden: skipped entirely
//! ```
//!
//! ## Front Matter
//!
//! An optional TOML block delimited by `+++` lines at the very top of the
//! file. Unknown keys are rejected, like in `site.toml`.
//!
//! ## Titles
//!
//! First available wins: front matter `title` → first `# heading` outside
//! code blocks → display title of the file name (`2024-03-01-first-post.md` → "first post").
//!
//! ## Validation
//!
//! - Front matter must be terminated and valid
//! - Two documents may not produce the same output path
//!   (`about.md` and `about/index.md` collide)

use crate::collections::{self, Collection};
use crate::config::{self, SiteConfig};
use crate::naming;
use crate::passthrough::{self, PassthroughError};
use crate::types::{Document, FrontMatter};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Passthrough error: {0}")]
    Passthrough(#[from] PassthroughError),
    #[error("Invalid front matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },
    #[error("{first} and {second} both produce {output}")]
    DuplicateOutput {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize)]
pub struct Manifest {
    /// All documents, sorted by source path.
    pub documents: Vec<Document>,
    /// Collections by name. Members are indices into `documents`.
    pub collections: BTreeMap<String, Collection>,
    pub config: SiteConfig,
}

impl Manifest {
    /// Documents of a collection, in collection order.
    pub fn collection_documents(&self, name: &str) -> Option<Vec<&Document>> {
        let collection = self.collections.get(name)?;
        Some(
            collection
                .members
                .iter()
                .map(|&i| &self.documents[i])
                .collect(),
        )
    }
}

/// Load `site.toml` and scan the content root.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    scan_with_config(root, config)
}

/// Scan the content root with an already loaded config.
pub fn scan_with_config(root: &Path, config: SiteConfig) -> Result<Manifest, ScanError> {
    let matcher = passthrough::build_matcher(&config.passthrough)?;
    let mut documents = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if passthrough::is_match(&matcher, relative) {
            continue;
        }
        let content = fs::read_to_string(entry.path())?;
        documents.push(parse_document(relative, &content)?);
    }

    documents.sort_by(|a, b| a.source.cmp(&b.source));
    check_output_collisions(&documents)?;

    let collections = collections::build_collections(&documents, &config.collections);

    Ok(Manifest {
        documents,
        collections,
        config,
    })
}

/// Build a [`Document`] from its path relative to the content root and its
/// file content.
pub fn parse_document(relative: &Path, content: &str) -> Result<Document, ScanError> {
    let (raw_front_matter, body) =
        split_front_matter(content).ok_or_else(|| ScanError::FrontMatter {
            path: relative.to_path_buf(),
            message: "missing closing +++".into(),
        })?;
    let mut front_matter: FrontMatter = match raw_front_matter {
        Some(raw) => toml::from_str(raw).map_err(|e| ScanError::FrontMatter {
            path: relative.to_path_buf(),
            message: e.to_string(),
        })?,
        None => FrontMatter::default(),
    };

    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = naming::parse_entry_name(&stem);

    if front_matter.date.is_none() {
        front_matter.date = parsed.date.clone();
    }

    let title = front_matter
        .title
        .clone()
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| parsed.display_title.clone());
    let output = naming::output_path(relative, &parsed.slug);
    let url = naming::url_for(&output);

    Ok(Document {
        source: relative.to_path_buf(),
        output,
        url,
        slug: parsed.slug,
        title,
        front_matter,
        body: body.to_string(),
    })
}

/// Split a `+++` front matter block off the top of `content`.
///
/// Returns `None` when the block is opened but never closed.
fn split_front_matter(content: &str) -> Option<(Option<&str>, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) if line.trim_end() == "+++" => line,
        _ => return Some((None, content)),
    };

    let mut offset = first.len();
    for line in lines {
        if line.trim_end() == "+++" {
            let front_matter = &content[first.len()..offset];
            let body = &content[offset + line.len()..];
            return Some((Some(front_matter), body));
        }
        offset += line.len();
    }
    None
}

/// Text of the first non-empty level-one heading. Lines inside code blocks
/// are not headings.
fn first_heading(body: &str) -> Option<String> {
    let mut in_heading = false;
    let mut text = String::new();
    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => {
                in_heading = true;
                text.clear();
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                in_heading = false;
                let title = text.trim();
                if !title.is_empty() {
                    return Some(title.to_string());
                }
            }
            Event::Text(t) | Event::Code(t) if in_heading => text.push_str(&t),
            _ => {}
        }
    }
    None
}

fn check_output_collisions(documents: &[Document]) -> Result<(), ScanError> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for doc in documents {
        if let Some(first) = seen.insert(doc.output.as_path(), doc.source.as_path()) {
            return Err(ScanError::DuplicateOutput {
                output: doc.output.clone(),
                first: first.to_path_buf(),
                second: doc.source.clone(),
            });
        }
    }
    Ok(())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}
