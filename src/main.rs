//! Auto-Harvest main entry point
//!
//! This is the command-line interface for the Auto-Harvest listing scraper.

use anyhow::Context;
use auto_harvest::config::{resolve_config, Config, ConfigOverrides};
use auto_harvest::crawler::{crawl, probe, CrawlPlan, HttpFetcher};
use auto_harvest::output::{
    load_statistics, merge_partitions, print_report, print_statistics, PartitionWriter,
};
use auto_harvest::ExtractionRules;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Auto-Harvest: a resumable vehicle-listing scraper
///
/// Auto-Harvest walks the paginated listing index of an automotive
/// marketplace, extracts one record per listing and writes one CSV partition
/// per index page. Pages that already have a partition are skipped, so an
/// interrupted crawl is resumed by running it again.
#[derive(Parser, Debug)]
#[command(name = "auto-harvest")]
#[command(version)]
#[command(about = "A resumable vehicle-listing scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listing index URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Number of index pages to crawl
    #[arg(long)]
    pages: Option<u32>,

    /// First index page to crawl (1-based)
    #[arg(long)]
    start_page: Option<u32>,

    /// Maximum number of pages fetched concurrently
    #[arg(long)]
    max_concurrency: Option<u32>,

    /// Directory receiving the page partitions
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "merge"])]
    dry_run: bool,

    /// Show statistics from the partitions on disk and exit
    #[arg(long, conflicts_with_all = ["dry_run", "merge"])]
    stats: bool,

    /// Merge all partitions into a single CSV file and exit
    #[arg(long, value_name = "FILE", conflicts_with_all = ["dry_run", "stats"])]
    merge: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.url.clone(),
            pages: self.pages,
            start_page: self.start_page,
            max_concurrency: self.max_concurrency,
            output_dir: self.output_dir.clone(),
            request_timeout_secs: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration before any network I/O
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = resolve_config(cli.config.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config).await
    } else if cli.stats {
        handle_stats(&config)
    } else if let Some(destination) = &cli.merge {
        handle_merge(&config, destination)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("auto_harvest=info,warn"),
            1 => EnvFilter::new("auto_harvest=debug,info"),
            2 => EnvFilter::new("auto_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: probes the target and shows the resolved plan
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Auto-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Target: {}", config.crawler.base_url);
    println!("  Requested pages: {}", config.crawler.pages);
    println!("  Start page: {}", config.crawler.start_page);
    println!("  Max concurrency: {}", config.crawler.max_concurrency);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Partition prefix: {}", config.output.file_prefix);

    let writer = PartitionWriter::from_config(&config.output);
    let existing = writer.list_pages()?;
    println!("  Partitions already on disk: {}", existing.len());

    let base_url = Url::parse(&config.crawler.base_url)?;
    let rules = ExtractionRules::compile(&config.rules)?;
    let fetcher = HttpFetcher::new(&config.crawler)?;

    println!("\nProbing {} ...", base_url);
    let total_pages = match probe(&fetcher, &base_url, &rules).await {
        Ok(pages) => pages,
        Err(auto_harvest::HarvestError::PaginationUnavailable(reason)) => {
            println!("  Pagination unavailable ({}); assuming 1 page", reason);
            1
        }
        Err(e) => return Err(e).context("Target probe failed"),
    };
    println!("  Target reports {} pages", total_pages);

    println!("\n✓ Configuration is valid");
    match CrawlPlan::resolve(
        base_url,
        config.crawler.start_page,
        config.crawler.pages,
        config.crawler.max_concurrency,
        total_pages,
    ) {
        Some(plan) => {
            let pending = plan.pages().filter(|p| !writer.exists(*p)).count();
            println!(
                "✓ Would crawl pages {}..={} with {} workers ({} without a partition yet)",
                plan.start_page,
                plan.end_page(),
                plan.effective_concurrency(),
                pending
            );
        }
        None => println!("✓ Nothing to crawl: start page is past the last page"),
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the partitions on disk
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let writer = PartitionWriter::from_config(&config.output);
    println!("Directory: {}\n", writer.directory().display());

    let stats = load_statistics(&writer).context("Failed to read partitions")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --merge mode: concatenates all partitions into one file
fn handle_merge(config: &Config, destination: &Path) -> anyhow::Result<()> {
    let writer = PartitionWriter::from_config(&config.output);
    let summary = merge_partitions(&writer, destination)
        .with_context(|| format!("Failed to merge partitions into {}", destination.display()))?;

    println!(
        "✓ Merged {} partitions ({} records) into {}",
        summary.partitions,
        summary.records,
        destination.display()
    );
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl of {} ({} pages from page {}, up to {} concurrent)",
        config.crawler.base_url,
        config.crawler.pages,
        config.crawler.start_page,
        config.crawler.max_concurrency
    );

    // Run the crawler
    match crawl(config).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
