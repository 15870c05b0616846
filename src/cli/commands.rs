use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::app::{AppContext, PagesiftError, Result, UrlOutcome};
use crate::cache;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::domain::CompiledTemplate;
use crate::extractor;
use crate::output;
use crate::query::XPathDialect;

/// Tally of a run over the url list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub matched: usize,
    pub unmatched: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.matched + self.unmatched + self.failed
    }
}

/// `pagesift run`: compile the template, then stream rows to stdout and
/// per-url diagnostics to stderr.
pub async fn run(config: &Config, args: RunArgs) -> Result<RunSummary> {
    // Template and url file problems are fatal before any output.
    let template = CompiledTemplate::load(&args.template, &XPathDialect)?;
    let urls = BufReader::new(File::open(&args.urls)?);

    let mut fetcher_config = config.fetcher.clone();
    if let Some(user_agent) = args.user_agent {
        fetcher_config.user_agent = user_agent;
    }
    if let Some(timeout) = args.timeout {
        fetcher_config.timeout_secs = timeout;
    }

    let cache_dir = if args.no_cache {
        None
    } else {
        args.cache_dir.or_else(|| config.cache.dir.clone())
    };

    let ctx = AppContext::new(&fetcher_config, cache_dir.as_deref())?;
    if !ctx.cache.is_enabled() {
        tracing::info!("Fetching every page from the network");
    }
    let summary = process_urls(&ctx, &template, urls, &mut io::stdout(), &mut io::stderr()).await?;

    tracing::info!(
        "Processed {} urls: {} matched, {} did not match, {} failed",
        summary.total(),
        summary.matched,
        summary.unmatched,
        summary.failed
    );
    Ok(summary)
}

/// Write the header row, then handle each non-blank line of `urls` in order.
///
/// Per-url problems go to `err` and never stop the run; only failures to
/// read `urls` or write `out`/`err` are returned.
pub async fn process_urls<R, O, E>(
    ctx: &AppContext,
    template: &CompiledTemplate,
    urls: R,
    out: &mut O,
    err: &mut E,
) -> Result<RunSummary>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    output::write_row(out, &extractor::header(template))?;

    let mut summary = RunSummary::default();
    for line in urls.lines() {
        let line = line?;
        let url = line.trim();
        if url.is_empty() {
            continue;
        }

        match ctx.process_url(url, template).await {
            UrlOutcome::Matched(row) => {
                output::write_row(out, &row)?;
                summary.matched += 1;
            }
            UrlOutcome::NoMatch => {
                writeln!(
                    err,
                    "URL {} did not match template url regex: {}",
                    url,
                    template.pattern()
                )?;
                summary.unmatched += 1;
            }
            UrlOutcome::FetchFailed(PagesiftError::InvalidUrl(e)) => {
                writeln!(err, "URL: {} is not a valid URL: {}", url, e)?;
                summary.failed += 1;
            }
            UrlOutcome::FetchFailed(PagesiftError::UnsupportedScheme(scheme)) => {
                writeln!(err, "URL: {} is not a valid URL: unsupported scheme `{}`", url, scheme)?;
                summary.failed += 1;
            }
            UrlOutcome::FetchFailed(e) => {
                writeln!(err, "Failed to fetch HTML from {} : {}", url, e)?;
                summary.failed += 1;
            }
        }
    }

    out.flush()?;
    Ok(summary)
}

/// `pagesift check`: compile the template and describe it.
pub fn check(path: &Path) -> Result<()> {
    let template = CompiledTemplate::load(path, &XPathDialect)?;

    println!(
        "{} ({} template for {}, {} rules)",
        template.name(),
        template.template_type(),
        template.domain(),
        template.rules().len()
    );
    println!("  pattern: {}", template.pattern());
    for rule in template.rules() {
        println!(
            "  {:<32} {:<10} {}",
            rule.name(),
            rule.output_format().as_str(),
            rule.query().expression()
        );
    }
    Ok(())
}

/// `pagesift cache-path`: print the cache entry location for `url`.
pub fn cache_path(cache_dir: &Path, url: &str) -> Result<()> {
    let path = cache::entry_path(cache_dir, url);
    let state = if path.is_file() { "cached" } else { "not cached" };
    println!("{}\t{}", path.display(), state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::context::tests::{product_template, StaticFetcher};
    use crate::cache::{DiskCache, NoopCache, PageCache};

    const URL: &str = "https://example.com/product/42";
    const PAGE: &str = "<html><body><h1>Shoe</h1></body></html>";

    struct Captured {
        summary: RunSummary,
        out: String,
        err: String,
    }

    async fn process(ctx: &AppContext, urls: &str) -> Captured {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = process_urls(ctx, &product_template(), urls.as_bytes(), &mut out, &mut err)
            .await
            .unwrap();
        Captured {
            summary,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    fn context(fetcher: Arc<StaticFetcher>, cache: Box<dyn PageCache>) -> AppContext {
        AppContext::with_parts(fetcher, cache)
    }

    #[tokio::test]
    async fn test_single_matching_url() {
        let fetcher = Arc::new(StaticFetcher::default().with_page(URL, PAGE));
        let run = process(&context(fetcher, Box::new(NoopCache)), URL).await;

        assert_eq!(run.out, "url\ttitle\nhttps://example.com/product/42\tShoe\n");
        assert_eq!(run.err, "");
        assert_eq!(run.summary, RunSummary { matched: 1, unmatched: 0, failed: 0 });
    }

    #[tokio::test]
    async fn test_non_matching_url_reports_diagnostic() {
        let fetcher = Arc::new(StaticFetcher::default().with_page("https://other.com/x", PAGE));
        let run = process(&context(fetcher, Box::new(NoopCache)), "https://other.com/x\n").await;

        assert_eq!(run.out, "url\ttitle\n");
        assert_eq!(
            run.err,
            "URL https://other.com/x did not match template url regex: example\\.com/product/.*\n"
        );
        assert_eq!(run.summary.unmatched, 1);
    }

    #[tokio::test]
    async fn test_header_only_for_empty_input() {
        let fetcher = Arc::new(StaticFetcher::default());
        let run = process(&context(fetcher, Box::new(NoopCache)), "\n   \n").await;

        assert_eq!(run.out, "url\ttitle\n");
        assert_eq!(run.err, "");
        assert_eq!(run.summary.total(), 0);
    }

    #[tokio::test]
    async fn test_rows_follow_input_order_and_skip_blank_lines() {
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with_page("https://example.com/product/2", "<h1>Boot</h1>")
                .with_page("https://example.com/product/1", "<h1>Shoe</h1>"),
        );
        let urls = "https://example.com/product/2\n\n  https://example.com/product/1  \n";
        let run = process(&context(fetcher, Box::new(NoopCache)), urls).await;

        assert_eq!(
            run.out,
            "url\ttitle\n\
             https://example.com/product/2\tBoot\n\
             https://example.com/product/1\tShoe\n"
        );
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_run() {
        let fetcher = Arc::new(StaticFetcher::default().with_page(URL, PAGE));
        let urls = "https://example.com/product/missing\nexample.com/product/7\nftp://example.com/product/8\nhttps://example.com/product/42\n";
        let run = process(&context(fetcher, Box::new(NoopCache)), urls).await;

        assert_eq!(run.out, "url\ttitle\nhttps://example.com/product/42\tShoe\n");
        let lines: Vec<_> = run.err.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Failed to fetch HTML from https://example.com/product/missing : "));
        assert!(lines[1].starts_with("URL: example.com/product/7 is not a valid URL: "));
        assert!(lines[2].starts_with("URL: ftp://example.com/product/8 is not a valid URL: "));
        assert_eq!(run.summary, RunSummary { matched: 1, unmatched: 0, failed: 3 });
    }

    #[tokio::test]
    async fn test_cache_does_not_change_output() {
        let urls = "https://example.com/product/42\nhttps://other.com/x\n";
        let dir = tempfile::tempdir().unwrap();
        let online = || {
            Arc::new(
                StaticFetcher::default()
                    .with_page(URL, PAGE)
                    .with_page("https://other.com/x", PAGE),
            )
        };

        let uncached = process(&context(online(), Box::new(NoopCache)), urls).await;
        let cold = process(
            &context(online(), Box::new(DiskCache::new(dir.path()).unwrap())),
            urls,
        )
        .await;

        // Warm run: the fetcher has nothing, so every row must come from disk.
        let offline = Arc::new(StaticFetcher::default());
        let warm = process(
            &context(offline.clone(), Box::new(DiskCache::new(dir.path()).unwrap())),
            urls,
        )
        .await;

        assert_eq!(uncached.out, cold.out);
        assert_eq!(uncached.err, cold.err);
        assert_eq!(warm.out, cold.out);
        assert_eq!(warm.err, cold.err);
        assert_eq!(offline.calls(), 0);
    }

    #[test]
    fn test_run_summary_total() {
        let summary = RunSummary { matched: 2, unmatched: 1, failed: 3 };
        assert_eq!(summary.total(), 6);
    }

    #[tokio::test]
    async fn test_run_fails_on_invalid_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.yaml");
        let urls = dir.path().join("urls.txt");
        std::fs::write(&template, "pattern: \"(\"\ndomain: x\nname: x\ntype: product\nrules:\n  - name: title\n    xPath: //h1\n    output_format: TEXT\n").unwrap();
        std::fs::write(&urls, "https://x/1\n").unwrap();

        let args = RunArgs {
            urls,
            template,
            no_cache: true,
            ..RunArgs::default()
        };
        let err = run(&Config::default(), args).await.unwrap_err();
        assert!(err.is_compile() || err.is_validation(), "unexpected error: {err}");
    }
}
