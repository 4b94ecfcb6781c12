//! Pagination prober

use crate::crawler::fetcher::PageFetcher;
use crate::extract::{page_count, ExtractionRules};
use crate::HarvestError;
use scraper::Html;
use url::Url;

/// Fetches the index at `base_url` and reads its total page count
///
/// A fetch failure propagates as `FetchFailed`. A missing or non-numeric
/// pagination control is `PaginationUnavailable`; callers fall back to a
/// single page.
pub async fn probe<F: PageFetcher + ?Sized>(
    fetcher: &F,
    base_url: &Url,
    rules: &ExtractionRules,
) -> Result<u32, HarvestError> {
    let body = fetcher.fetch(base_url).await?;
    probe_document(&body, rules)
}

/// Reads the total page count from an already fetched index document
pub fn probe_document(html: &str, rules: &ExtractionRules) -> Result<u32, HarvestError> {
    let document = Html::parse_document(html);
    page_count(&document, rules)
}
