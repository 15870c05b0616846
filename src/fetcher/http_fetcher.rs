use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::{PagesiftError, Result};
use crate::fetcher::{Fetcher, FetcherConfig};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

/// Parse `url` and require an http(s) scheme.
pub fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(PagesiftError::UnsupportedScheme(other.to_string())),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let url = parse_url(url)?;
        let response = self.client.get(url).send().await?;

        response.error_for_status_ref()?;

        Ok(response.text().await?)
    }
}
