use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pagesift::cli::{commands, Cli, Commands};
use pagesift::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Rows go to stdout, so logs share stderr with the per-url diagnostics.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = match &cli.config {
                Some(path) => Config::load_from(path)?,
                None => Config::load()?,
            };
            commands::run(&config, args).await?;
        }
        Commands::Check { template } => {
            commands::check(&template)?;
        }
        Commands::CachePath { cache_dir, url } => {
            commands::cache_path(&cache_dir, &url)?;
        }
    }

    Ok(())
}
