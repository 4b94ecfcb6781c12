//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one crawl run:
//! - Checking that the target answers and probing its page count
//! - Resolving the crawl plan
//! - Submitting one task per page to the bounded worker pool
//! - Writing each page's partition as soon as its task completes
//! - Aggregating the run report

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::listing::{fetch_page, ListingFailure, PageOutcome};
use crate::crawler::pagination::probe_document;
use crate::crawler::plan::CrawlPlan;
use crate::crawler::pool::WorkerPool;
use crate::extract::ExtractionRules;
use crate::output::PartitionWriter;
use crate::state::CrawlPhase;
use crate::HarvestError;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// A page whose task produced no partition because of an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page: u32,

    /// The URL that failed, when the error names one
    pub url: Option<String>,
    pub reason: String,
}

/// Outcome of a crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Resolved plan; `None` when nothing was scheduled
    pub plan: Option<CrawlPlan>,

    /// Page total reported by the target (1 after a pagination fallback)
    pub total_pages: u32,

    /// The pagination control could not be read
    pub pagination_fallback: bool,

    /// Pages written this run, in completion order
    pub pages_written: Vec<u32>,

    /// Pages skipped because their partition already existed
    pub pages_skipped: Vec<u32>,

    /// Pages fetched without yielding a single record
    pub pages_empty: Vec<u32>,

    pub page_failures: Vec<PageFailure>,
    pub listing_failures: Vec<ListingFailure>,
    pub records_written: usize,

    /// Distinct listing URLs discovered across all pages
    pub links: BTreeSet<String>,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Pages that a rerun would fetch again
    pub fn pages_to_retry(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .page_failures
            .iter()
            .map(|f| f.page)
            .chain(self.pages_empty.iter().copied())
            .collect();
        pages.sort_unstable();
        pages
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: PageFetcher + 'static> {
    settings: CrawlerConfig,
    fetcher: Arc<F>,
    rules: Arc<ExtractionRules>,
    writer: PartitionWriter,
    phase: CrawlPhase,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The validated run configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid rules or HTTP client construction failed
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let rules = ExtractionRules::compile(&config.rules)?;
        let fetcher = HttpFetcher::new(&config.crawler)?;
        let writer = PartitionWriter::from_config(&config.output);
        Ok(Self::with_fetcher(config.crawler.clone(), fetcher, rules, writer))
    }
}

impl<F: PageFetcher + 'static> Coordinator<F> {
    /// Creates a coordinator around any document source
    pub fn with_fetcher(
        settings: CrawlerConfig,
        fetcher: F,
        rules: ExtractionRules,
        writer: PartitionWriter,
    ) -> Self {
        Self {
            settings,
            fetcher: Arc::new(fetcher),
            rules: Arc::new(rules),
            writer,
            phase: CrawlPhase::Initializing,
        }
    }

    /// Current phase of the run
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to completion
    ///
    /// Only an unreachable target fails the run. Individual page failures are
    /// logged and listed in the report; their partitions stay missing so the
    /// next run retries them. Calling it again starts a fresh run.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        let start_time = Instant::now();
        self.phase = CrawlPhase::Initializing;
        let base_url = Url::parse(&self.settings.base_url)?;

        tracing::info!("Checking target {}", base_url);
        let landing = match self.fetcher.fetch(&base_url).await {
            Ok(body) => body,
            Err(e) => {
                self.phase.transition(CrawlPhase::Failed)?;
                tracing::error!("Target {} is unreachable: {}", base_url, e);
                return Err(HarvestError::TargetUnreachable {
                    url: base_url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        self.phase.transition(CrawlPhase::Probing)?;
        let mut report = CrawlReport::default();
        report.total_pages = match probe_document(&landing, &self.rules) {
            Ok(pages) => {
                tracing::info!("Target reports {} pages", pages);
                pages
            }
            Err(e) => {
                tracing::warn!("{}; falling back to a single page", e);
                report.pagination_fallback = true;
                1
            }
        };

        self.phase.transition(CrawlPhase::Scheduling)?;
        let Some(plan) = CrawlPlan::resolve(
            base_url,
            self.settings.start_page,
            self.settings.pages,
            self.settings.max_concurrency,
            report.total_pages,
        ) else {
            tracing::warn!(
                "Start page {} is beyond the last page {}; nothing to crawl",
                self.settings.start_page,
                report.total_pages
            );
            self.phase.transition(CrawlPhase::Done)?;
            report.elapsed = start_time.elapsed();
            return Ok(report);
        };

        let workers = plan.effective_concurrency();
        tracing::info!(
            "Crawling pages {}..={} ({} pages) with {} workers",
            plan.start_page,
            plan.end_page(),
            plan.page_count,
            workers
        );

        let mut pool = WorkerPool::new(workers);
        let mut pending = BTreeSet::new();
        for page in plan.pages() {
            let fetcher = Arc::clone(&self.fetcher);
            let rules = Arc::clone(&self.rules);
            let writer = self.writer.clone();
            let base_url = plan.base_url.clone();
            pool.submit(async move {
                let result = fetch_page(fetcher.as_ref(), &rules, &writer, &base_url, page).await;
                (page, result)
            });
            pending.insert(page);
        }

        self.phase.transition(CrawlPhase::Running)?;
        let mut completed = 0;
        let mut aborted = Vec::new();
        while let Some(joined) = pool.next_completed().await {
            completed += 1;
            match joined {
                Ok((page, result)) => {
                    pending.remove(&page);
                    self.handle_page_result(page, result, &mut report);
                }
                Err(e) => {
                    let err = HarvestError::from(e);
                    tracing::error!("{}", err);
                    aborted.push(err);
                }
            }
            tracing::info!("Progress: {}/{} pages complete", completed, plan.page_count);
        }

        self.phase.transition(CrawlPhase::Draining)?;
        // Whatever is still pending belongs to a task that panicked
        for (page, err) in pending.into_iter().zip(aborted) {
            report.page_failures.push(PageFailure {
                page,
                url: None,
                reason: err.to_string(),
            });
        }

        report.plan = Some(plan);
        report.elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl completed: {} pages written, {} skipped, {} failed, {} listings discovered in {:?}",
            report.pages_written.len(),
            report.pages_skipped.len(),
            report.page_failures.len(),
            report.links.len(),
            report.elapsed
        );

        self.phase.transition(CrawlPhase::Done)?;
        Ok(report)
    }

    /// Persists or records the result of one finished page task
    fn handle_page_result(
        &self,
        page: u32,
        result: Result<PageOutcome, HarvestError>,
        report: &mut CrawlReport,
    ) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(page, url = e.url().unwrap_or("-"), "Page failed: {}", e);
                report.page_failures.push(PageFailure {
                    page,
                    url: e.url().map(str::to_string),
                    reason: e.to_string(),
                });
                return;
            }
        };

        if outcome.already_done {
            tracing::debug!("Page {} already has a partition", page);
            report.pages_skipped.push(page);
            return;
        }

        report.links.extend(outcome.links);
        report.listing_failures.extend(outcome.failures);

        match self.writer.write(page, &outcome.records) {
            Ok(Some(path)) => {
                tracing::info!(
                    "Page {}: wrote {} records to {}",
                    page,
                    outcome.records.len(),
                    path.display()
                );
                report.records_written += outcome.records.len();
                report.pages_written.push(page);
            }
            Ok(None) => {
                tracing::warn!(page, "Page produced no records; it will be retried on the next run");
                report.pages_empty.push(page);
            }
            Err(e) => {
                let path = self.writer.partition_path(page);
                tracing::error!(page, "Failed to write {}: {}", path.display(), e);
                report.page_failures.push(PageFailure {
                    page,
                    url: None,
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Runs the main crawl operation over HTTP
///
/// # Example
///
/// ```no_run
/// use auto_harvest::config::{resolve_config, ConfigOverrides};
/// use auto_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = resolve_config(None, &ConfigOverrides::default())?;
/// let report = run_crawl(&config).await?;
/// println!("{} listings", report.links.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlReport, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
