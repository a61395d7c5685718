//! Highlighted-fragment cache for incremental builds.
//!
//! Highlighting is a pure function of (code, language, engine config), so a
//! fragment rendered by a previous build can be reused verbatim. Loading the
//! engine still happens on every build; what the cache skips is the per-block
//! tokenizing, which dominates render time on code-heavy sites.
//!
//! # Keys
//!
//! Entries are **content-addressed**: the key is the SHA-256 of the declared
//! language and the code text. Moving a snippet between documents, or renaming
//! the document, keeps the hit.
//!
//! The whole cache is namespaced by the bridge
//! [fingerprint](crate::highlight::HighlightBridge::fingerprint), which covers
//! the config and the contents of the loaded themes. A build with a different
//! theme list, language list or edited `.tmTheme` file loads an empty cache
//! instead of serving fragments colored by the old theme.
//!
//! # Storage
//!
//! JSON at `<output_dir>/.highlight-cache.json`, next to the generated site so
//! it travels with the output directory when cached in CI. Entries not used
//! during a build are pruned before saving.
//!
//! Pass `--no-cache` to `build` to start from an empty cache.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the output directory.
const CACHE_FILENAME: &str = ".highlight-cache.json";

/// Bump to invalidate every existing cache when the format or key changes.
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightCache {
    pub version: u32,
    pub fingerprint: String,
    /// Content key → rendered HTML fragment.
    pub entries: HashMap<String, String>,
    /// Keys read or written during this build. Never serialized.
    #[serde(skip)]
    touched: HashSet<String>,
}

impl HighlightCache {
    /// Create an empty cache (used for `--no-cache` or the first build).
    pub fn empty(fingerprint: &str) -> Self {
        Self {
            version: CACHE_VERSION,
            fingerprint: fingerprint.to_string(),
            entries: HashMap::new(),
            touched: HashSet::new(),
        }
    }

    /// Load from the output directory. Returns an empty cache if the file
    /// is missing or corrupt, or was written by another format version or
    /// highlight config.
    pub fn load(output_dir: &Path, fingerprint: &str) -> Self {
        let content = match std::fs::read_to_string(cache_path(output_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(fingerprint),
        };
        let cache: Self = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(err) => {
                tracing::debug!(%err, "ignoring unreadable highlight cache");
                return Self::empty(fingerprint);
            }
        };
        if cache.version != CACHE_VERSION || cache.fingerprint != fingerprint {
            return Self::empty(fingerprint);
        }
        cache
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(output_dir), json)
    }

    /// Content key for a code block.
    pub fn key(language: &str, code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(language.as_bytes());
        hasher.update(b"\0");
        hasher.update(code.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&mut self, key: &str) -> Option<&str> {
        let markup = self.entries.get(key)?;
        self.touched.insert(key.to_string());
        Some(markup.as_str())
    }

    pub fn insert(&mut self, key: String, markup: String) {
        self.touched.insert(key.clone());
        self.entries.insert(key, markup);
    }

    /// Drop entries that were neither read nor written since loading.
    pub fn prune_untouched(&mut self) {
        let touched = &self.touched;
        self.entries.retain(|key, _| touched.contains(key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl std::ops::AddAssign for CacheStats {
    fn add_assign(&mut self, other: Self) {
        self.hits += other.hits;
        self.misses += other.misses;
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} highlighted ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} highlighted", self.misses)
        }
    }
}

/// Resolve the cache file path for an output directory.
pub fn cache_path(output_dir: &Path) -> PathBuf {
    output_dir.join(CACHE_FILENAME)
}
