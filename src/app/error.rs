use std::path::PathBuf;

use thiserror::Error;

use crate::query::QueryError;

#[derive(Error, Debug)]
pub enum PagesiftError {
    #[error("Invalid template: {0}")]
    Validation(String),

    #[error("Failed to compile url pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Failed to compile query `{query}` for rule {rule}: {source}")]
    Query {
        rule: String,
        query: String,
        source: QueryError,
    },

    #[error("Failed to parse template file {path}: {source}")]
    TemplateParse {
        path: PathBuf,
        source: Box<figment::Error>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl PagesiftError {
    /// Template metadata is malformed (empty fields, unknown names, bad domain).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// A url pattern or query expression failed to parse.
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Pattern { .. } | Self::Query { .. })
    }
}

pub type Result<T> = std::result::Result<T, PagesiftError>;
