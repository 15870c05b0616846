use crate::cache::PageCache;
use crate::domain::Document;

/// Cache used when caching is disabled: every lookup misses and inserts
/// are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl PageCache for NoopCache {
    fn lookup(&self, _url: &str) -> Option<Document> {
        None
    }

    fn insert(&self, _url: &str, _document: &Document) {}

    fn is_enabled(&self) -> bool {
        false
    }
}
