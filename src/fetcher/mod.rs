pub mod config;
pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use config::FetcherConfig;
pub use http_fetcher::HttpFetcher;

#[async_trait]
pub trait Fetcher {
    /// Fetch the page at `url` and return its body decoded as text.
    ///
    /// Malformed urls fail with [`PagesiftError::InvalidUrl`] or
    /// [`PagesiftError::UnsupportedScheme`] before any request is made.
    ///
    /// [`PagesiftError::InvalidUrl`]: crate::app::PagesiftError::InvalidUrl
    /// [`PagesiftError::UnsupportedScheme`]: crate::app::PagesiftError::UnsupportedScheme
    async fn fetch(&self, url: &str) -> Result<String>;
}
