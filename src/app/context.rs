use std::path::Path;
use std::sync::Arc;

use crate::app::error::{PagesiftError, Result};
use crate::cache::{self, PageCache};
use crate::domain::{CompiledTemplate, Document};
use crate::extractor;
use crate::fetcher::{Fetcher, FetcherConfig, HttpFetcher};

/// What happened to a single input url.
#[derive(Debug)]
pub enum UrlOutcome {
    /// The url matched; `url` followed by one value per rule.
    Matched(Vec<String>),
    /// The page was obtained but the url does not match the template pattern.
    NoMatch,
    /// The page could not be obtained.
    FetchFailed(PagesiftError),
}

pub struct AppContext {
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub cache: Box<dyn PageCache>,
}

impl AppContext {
    /// Context backed by the network, caching under `cache_dir` when given.
    pub fn new(fetcher_config: &FetcherConfig, cache_dir: Option<&Path>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(fetcher_config)?);
        Ok(Self::with_parts(fetcher, cache::open(cache_dir)))
    }

    pub fn with_parts(fetcher: Arc<dyn Fetcher + Send + Sync>, cache: Box<dyn PageCache>) -> Self {
        Self { fetcher, cache }
    }

    /// Return the page for `url`, from the cache when present, otherwise
    /// from the fetcher. Freshly fetched pages are written to the cache.
    pub async fn fetch_document(&self, url: &str) -> Result<Document> {
        if let Some(document) = self.cache.lookup(url) {
            return Ok(document);
        }

        let body = self.fetcher.fetch(url).await?;
        let document = Document::parse(body);
        self.cache.insert(url, &document);
        Ok(document)
    }

    /// Fetch `url` and apply `template` to it.
    ///
    /// The page is fetched (and cached) before the pattern is checked, so a
    /// url that fails to fetch reports the fetch failure even when it would
    /// not have matched.
    pub async fn process_url(&self, url: &str, template: &CompiledTemplate) -> UrlOutcome {
        match self.fetch_document(url).await {
            Ok(document) => match extractor::evaluate(url, template, &document) {
                Some(row) => UrlOutcome::Matched(row),
                None => UrlOutcome::NoMatch,
            },
            Err(e) => {
                tracing::debug!("Fetching {} failed: {}", url, e);
                UrlOutcome::FetchFailed(e)
            }
        }
    }
}
