//! Crawl plan resolution
//!
//! The requested page range is clamped to what the target actually has, so
//! `start_page + page_count - 1` never exceeds the probed page total.

use std::ops::RangeInclusive;
use url::Url;

/// Resolved run parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlPlan {
    pub base_url: Url,
    pub start_page: u32,
    pub page_count: u32,
    pub max_concurrency: u32,
}

impl CrawlPlan {
    /// Resolves a plan against the probed page total
    ///
    /// # Arguments
    ///
    /// * `base_url` - The listing index URL
    /// * `start_page` - First requested page (1-based)
    /// * `requested_pages` - Number of pages requested
    /// * `max_concurrency` - Configured worker bound
    /// * `total_pages` - Pages the target reports
    ///
    /// # Returns
    ///
    /// * `Some(CrawlPlan)` - Plan covering at least one page
    /// * `None` - Nothing to crawl (start page past the last page)
    pub fn resolve(
        base_url: Url,
        start_page: u32,
        requested_pages: u32,
        max_concurrency: u32,
        total_pages: u32,
    ) -> Option<Self> {
        if start_page == 0 || requested_pages == 0 || start_page > total_pages {
            return None;
        }

        let available = total_pages - start_page + 1;
        let page_count = requested_pages.min(available);
        if page_count < requested_pages {
            tracing::info!(
                "Requested {} pages from page {}, only {} available; clamping",
                requested_pages,
                start_page,
                page_count
            );
        }

        Some(Self {
            base_url,
            start_page,
            page_count,
            max_concurrency: max_concurrency.max(1),
        })
    }

    /// Last page covered by this plan
    pub fn end_page(&self) -> u32 {
        self.start_page + self.page_count - 1
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start_page..=self.end_page()
    }

    /// Worker count: never more workers than pages
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.min(self.page_count) as usize
    }
}
