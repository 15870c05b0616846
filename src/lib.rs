//! # pagesift
//!
//! Fetches HTML for a list of urls and applies a per-site extraction
//! template, printing one tab-separated row per matching page.
//!
//! ## Architecture
//!
//! ```text
//! Template file → CompiledTemplate ─┐
//! url list → Fetcher / PageCache → Document → extractor → TSV rows
//! ```
//!
//! Templates are compiled once up front: the url pattern, every rule name
//! against the template type's vocabulary, and every query. A template
//! that fails to compile aborts the run before any output.
//!
//! ## Quick Start
//!
//! ```bash
//! # Extract product fields, caching pages under ./pages
//! pagesift run urls.txt shop.yaml ./pages > rows.tsv
//!
//! # Validate a template
//! pagesift check shop.yaml
//! ```
//!
//! A template in YAML:
//!
//! ```yaml
//! pattern: 'example\.com/product/.*'
//! domain: example.com
//! name: example
//! type: product
//! rules:
//!   - name: title
//!     xPath: //h1
//!     output_format: TEXT
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context, per-url processing and error types
//! - [`cache`]: Disk page cache keyed by url
//! - [`cli`]: Command-line interface definitions and commands
//! - [`config`]: Configuration file handling
//! - [`domain`]: Templates, rules, vocabularies and parsed pages
//! - [`extractor`]: Applies a compiled template to a page
//! - [`fetcher`]: HTTP fetching
//! - [`output`]: Tab-separated output rows
//! - [`query`]: Query dialects compiled against parsed HTML

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher
/// and the page cache.
pub mod app;

/// Durable page cache.
///
/// - [`PageCache`](cache::PageCache): Lookup/insert trait
/// - [`DiskCache`](cache::DiskCache): One file per url under a cache folder
/// - [`NoopCache`](cache::NoopCache): Caching disabled
pub mod cache;

/// Command-line interface using clap.
///
/// - `run <urls> <template> [cache_dir]` - Extract rows from every url
/// - `check <template>` - Validate a template
/// - `cache-path <cache_dir> <url>` - Locate a cached page
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/pagesift/config.toml`: fetcher user agent and
/// timeout, default cache folder.
pub mod config;

/// Core domain models.
///
/// - [`TemplateSpec`](domain::TemplateSpec) / [`CompiledTemplate`](domain::CompiledTemplate)
/// - [`RuleSpec`](domain::RuleSpec) / [`CompiledRule`](domain::CompiledRule)
/// - [`TemplateType`](domain::TemplateType): Closed rule-name vocabularies
/// - [`Document`](domain::Document): Parsed HTML page
pub mod domain;

/// Template application.
///
/// - [`header`](extractor::header): `url` followed by the rule names
/// - [`evaluate`](extractor::evaluate): One row per matching page, multiple
///   values joined with `", "`
pub mod extractor;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for page fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Tab-separated output.
///
/// Tabs and line breaks inside values become spaces, so each row is one line.
pub mod output;

/// Query languages for rules.
///
/// - [`QueryDialect`](query::QueryDialect): Compiles expressions once
/// - [`XPathDialect`](query::XPathDialect): XPath subset evaluated with CSS selectors
pub mod query;
