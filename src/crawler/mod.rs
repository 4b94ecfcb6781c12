//! Crawler module for listing retrieval
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - Pagination probing and crawl plan resolution
//! - Per-page listing retrieval
//! - The bounded worker pool and overall crawl coordination

mod coordinator;
mod fetcher;
mod listing;
mod pagination;
mod plan;
mod pool;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, PageFailure};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use listing::{fetch_page, page_url, ListingFailure, PageOutcome};
pub use pagination::{probe, probe_document};
pub use plan::CrawlPlan;
pub use pool::WorkerPool;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Check that the target is reachable
/// 2. Probe the total page count
/// 3. Resolve the crawl plan
/// 4. Fetch pages concurrently, skipping pages already on disk
/// 5. Write one partition per page as each page completes
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished; individual page failures are in the report
/// * `Err(HarvestError)` - The target was unreachable or setup failed
pub async fn crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    run_crawl(&config).await
}
