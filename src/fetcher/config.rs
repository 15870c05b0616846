use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    concat!("Mozilla/5.0 (compatible; pagesift/", env!("CARGO_PKG_VERSION"), ")");

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User agent sent with every request
    pub user_agent: String,

    /// Total request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
