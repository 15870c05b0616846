use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::app::{PagesiftError, Result};
use crate::cache::{entry_path, PageCache};
use crate::domain::Document;

/// Page cache stored as one HTML file per URL below a root directory.
///
/// Writes go to a temporary file that is renamed into place, so a reader
/// never observes a partially written entry.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Use `root` as the cache directory, creating it if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        if !root.is_dir() {
            return Err(PagesiftError::Cache(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        entry_path(&self.root, url)
    }

    /// Read the raw entry for `url`. A missing entry is `Ok(None)`.
    pub fn read(&self, url: &str) -> Result<Option<String>> {
        let path = self.path_for(url);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes).map(Some).map_err(|e| {
            PagesiftError::Cache(format!("{} is not valid UTF-8: {}", path.display(), e))
        })
    }

    /// Write the raw source of `document` under `url`.
    pub fn try_insert(&self, url: &str, document: &Document) -> Result<()> {
        let path = self.path_for(url);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension(format!("html.{}.tmp", std::process::id()));
        fs::write(&tmp_path, document.source())?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::debug!("Cached {} at {}", url, path.display());
        Ok(())
    }
}

impl PageCache for DiskCache {
    fn lookup(&self, url: &str) -> Option<Document> {
        match self.read(url) {
            Ok(Some(source)) => {
                tracing::debug!("Cache hit for {}", url);
                Some(Document::parse(source))
            }
            Ok(None) => {
                tracing::debug!("Cache miss for {}", url);
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry for {}: {}", url, e);
                None
            }
        }
    }

    fn insert(&self, url: &str, document: &Document) {
        if let Err(e) = self.try_insert(url, document) {
            tracing::warn!("Failed to cache {}: {}", url, e);
        }
    }
}
