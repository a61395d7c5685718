//! Shared test utilities for the simple-press test suite.
//!
//! Provides fixture setup, lookup helpers and bulk extractors that work with
//! scan-phase data structures (`Manifest`, `Document`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let post = find_document(&manifest, "articles/2024-03-01-first-post.md");
//! assert_eq!(post.title, "Hello, highlighting");
//!
//! assert_eq!(
//!     collection_titles(&manifest, "articles"),
//!     vec!["Hello, highlighting", "Shell tricks"]
//! );
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::scan::Manifest;
use crate::types::Document;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Read a generated file. Panics with the path on miss.
pub fn read_output(output_dir: &Path, relative: &str) -> String {
    fs::read_to_string(output_dir.join(relative))
        .unwrap_or_else(|e| panic!("cannot read output {relative}: {e}"))
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a document by source path. Panics if not found.
pub fn find_document<'a>(manifest: &'a Manifest, source: &str) -> &'a Document {
    manifest
        .documents
        .iter()
        .find(|d| d.source == Path::new(source))
        .unwrap_or_else(|| panic!("document '{source}' not found. Available: {:?}", sources(manifest)))
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All document source paths, in manifest order.
pub fn sources(manifest: &Manifest) -> Vec<String> {
    manifest
        .documents
        .iter()
        .map(|d| d.source.to_string_lossy().replace('\\', "/"))
        .collect()
}

/// Titles of a collection's members, in collection order.
pub fn collection_titles(manifest: &Manifest, name: &str) -> Vec<String> {
    manifest
        .collection_documents(name)
        .unwrap_or_else(|| panic!("collection '{name}' not found"))
        .into_iter()
        .map(|d| d.title.clone())
        .collect()
}
