//! Durable page cache keyed by URL.
//!
//! Pages are stored as raw markup under a key derived from the URL:
//!
//! ```text
//! <cache dir>/
//!   3f/
//!     3fa1...e9.html    # sha256(url), lowercase hex
//!   a0/
//!     a07c...41.html
//! ```
//!
//! Entries are never expired, rewritten in place, or deleted. Caching is
//! optional: [`open`] falls back to [`NoopCache`] when no usable directory
//! is configured.

pub mod disk;
pub mod noop;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::domain::Document;

pub use disk::DiskCache;
pub use noop::NoopCache;

pub trait PageCache {
    /// Return the cached page for `url`. Misses, unreadable and corrupt
    /// entries all return `None`.
    fn lookup(&self, url: &str) -> Option<Document>;

    /// Store the raw source of `document` under `url`. Failures are logged
    /// and otherwise ignored.
    fn insert(&self, url: &str, document: &Document);

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Derive the storage key for `url`: the lowercase hex SHA-256 of its bytes.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Location of the entry for `url` below `root`: `<root>/<key[..2]>/<key>.html`.
pub fn entry_path(root: &Path, url: &str) -> PathBuf {
    let key = cache_key(url);
    root.join(&key[..2]).join(format!("{key}.html"))
}

/// Open the cache rooted at `dir`.
///
/// An absent or empty path disables caching. So does a directory that
/// cannot be created, after a warning.
pub fn open(dir: Option<&Path>) -> Box<dyn PageCache> {
    let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) else {
        tracing::debug!("Page cache disabled");
        return Box::new(NoopCache);
    };

    match DiskCache::new(dir) {
        Ok(cache) => {
            tracing::debug!("Page cache at {}", dir.display());
            Box::new(cache)
        }
        Err(e) => {
            tracing::warn!("Page cache disabled, {} is unusable: {}", dir.display(), e);
            Box::new(NoopCache)
        }
    }
}
