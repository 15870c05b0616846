//! Configuration management for pagesift.
//!
//! Configuration is read from `~/.config/pagesift/config.toml`, or from the
//! path given with `--config`. If the default file doesn't exist, one with
//! comments is created. Command-line flags override file values.

use crate::fetcher::FetcherConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub cache: CacheConfig,
}

/// Page cache settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory used when no cache folder is passed on the command line.
    /// Unset means pages are only cached when a folder is given.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, a commented default is written and
    /// defaults are returned. Failing to write it only logs a warning.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            if let Err(e) = Self::create_default_config(&config_path) {
                tracing::warn!("{}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, which must exist.
    /// Missing fields in the file use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/pagesift/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pagesift").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let io_error = |path: &Path, source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let mut file = fs::File::create(path).map_err(|e| io_error(path, e))?;
        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| io_error(path, e))?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# pagesift configuration
#
# Values given on the command line take precedence over this file.

[fetcher]
# User agent sent with every request
# user_agent = "Mozilla/5.0 (compatible; pagesift/0.1.0)"

# Total request timeout in seconds
timeout_secs = 30

[cache]
# Folder for cached pages, used when `pagesift run` is not given one.
# Leave unset to fetch every page from the network.
# dir = "/var/cache/pagesift"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
