//! Verbatim copy of static assets.
//!
//! `passthrough` globs in `site.toml` select files under the content root
//! that are copied unchanged to the same relative path in the output:
//!
//! ```text
//! content/assets/css/main.css   →   dist/assets/css/main.css
//! content/assets/type/body.woff2 →  dist/assets/type/body.woff2
//! ```
//!
//! Globs are matched against `/`-separated paths relative to the content
//! root. `*` stays within one directory; use `**` to recurse. The scanner uses
//! the same matcher to keep passthrough files out of the document set.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PassthroughError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid passthrough glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: globset::Error,
    },
}

/// Compile passthrough globs into one matcher.
pub fn build_matcher(patterns: &[String]) -> Result<GlobSet, PassthroughError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile(pattern)?);
    }
    builder.build().map_err(|source| PassthroughError::Glob {
        pattern: patterns.join(", "),
        source,
    })
}

fn compile(pattern: &str) -> Result<Glob, PassthroughError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| PassthroughError::Glob {
            pattern: pattern.to_string(),
            source,
        })
}

/// Whether `relative` (a path under the content root) is a passthrough file.
pub fn is_match(matcher: &GlobSet, relative: &Path) -> bool {
    matcher.is_match(to_slash(relative))
}

/// Files under `root` matching `matcher`, relative to `root`, sorted.
pub fn matching_files(root: &Path, matcher: &GlobSet) -> Result<Vec<PathBuf>, PassthroughError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if is_match(matcher, relative) {
            files.push(relative.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Copy every file matching `patterns` from `source` to `output`.
///
/// Returns the copied paths relative to the content root, sorted.
pub fn copy(
    source: &Path,
    output: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, PassthroughError> {
    let matcher = build_matcher(patterns)?;
    let files = matching_files(source, &matcher)?;
    for relative in &files {
        let dest = output.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source.join(relative), &dest)?;
        tracing::debug!(path = %relative.display(), "copied passthrough file");
    }
    Ok(files)
}

/// Render a relative path with `/` separators on every platform.
fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
