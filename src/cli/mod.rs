pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pagesift", version)]
#[command(
    about = "Fetches HTML for the supplied URLs and applies the provided template",
    long_about = None
)]
pub struct Cli {
    /// Configuration file (default: ~/.config/pagesift/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every url and print one tab-separated row per matching page
    Run(RunArgs),
    /// Validate and compile a template without fetching anything
    Check {
        /// Template file (YAML, or TOML/JSON by extension)
        template: PathBuf,
    },
    /// Print where the page for a url is stored in a cache folder
    CachePath {
        /// Cache folder
        cache_dir: PathBuf,
        /// Url of the page
        url: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// File containing sample urls, one per line
    pub urls: PathBuf,

    /// Template file (YAML, or TOML/JSON by extension)
    pub template: PathBuf,

    /// Folder for the HTML cache
    pub cache_dir: Option<PathBuf>,

    /// Fetch every page from the network, ignoring any cache folder
    #[arg(long, conflicts_with = "cache_dir")]
    pub no_cache: bool,

    /// User agent sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}
