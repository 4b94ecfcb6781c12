//! Listing-page fetcher
//!
//! One call handles one index page: skip it if its partition already exists,
//! otherwise fetch the index, collect the listing-card links and fetch every
//! detail page in card order.

use crate::crawler::fetcher::PageFetcher;
use crate::extract::{extract_html, listing_links, ExtractionRules};
use crate::output::PartitionWriter;
use crate::record::ListingRecord;
use crate::HarvestError;
use scraper::Html;
use url::Url;

/// A listing that was discovered but could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFailure {
    pub page: u32,
    pub url: String,
    pub reason: String,
}

/// Result of one page task
#[derive(Debug, Clone, Default)]
pub struct PageOutcome {
    pub page: u32,

    /// Extracted records in listing-card order
    pub records: Vec<ListingRecord>,

    /// Every listing URL found on the index page
    pub links: Vec<String>,

    /// Listings skipped because their detail fetch or extraction failed
    pub failures: Vec<ListingFailure>,

    /// The partition already existed; nothing was fetched
    pub already_done: bool,
}

impl PageOutcome {
    fn already_done(page: u32) -> Self {
        Self {
            page,
            already_done: true,
            ..Self::default()
        }
    }
}

/// Builds the URL of index page `page` by setting the `page` query parameter
pub fn page_url(base_url: &Url, page: u32) -> Url {
    let mut url = base_url.clone();
    let retained: Vec<(String, String)> = base_url
        .query_pairs()
        .filter(|(key, _)| *key != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string());
    url
}

/// Fetches one index page and all of its listings
///
/// # Arguments
///
/// * `fetcher` - Document source
/// * `rules` - Extraction ruleset
/// * `writer` - Partition writer, consulted for the resume check only
/// * `base_url` - The listing index URL
/// * `page` - Index page number
///
/// # Returns
///
/// * `Ok(PageOutcome)` - With `already_done` set when the partition exists
/// * `Err(HarvestError::FetchFailed)` - The index page itself could not be fetched
///
/// A failing detail page only drops that listing; it is recorded in
/// `PageOutcome::failures`.
pub async fn fetch_page<F: PageFetcher + ?Sized>(
    fetcher: &F,
    rules: &ExtractionRules,
    writer: &PartitionWriter,
    base_url: &Url,
    page: u32,
) -> Result<PageOutcome, HarvestError> {
    if writer.exists(page) {
        tracing::debug!("Partition for page {} exists, skipping", page);
        return Ok(PageOutcome::already_done(page));
    }

    let url = page_url(base_url, page);
    let body = fetcher.fetch(&url).await?;
    let links = {
        let document = Html::parse_document(&body);
        listing_links(&document, &url, rules)
    };
    tracing::debug!("Page {} lists {} listings", page, links.len());

    let mut outcome = PageOutcome {
        page,
        ..PageOutcome::default()
    };

    for link in &links {
        match fetch_listing(fetcher, rules, link).await {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                tracing::warn!(page, url = %link, "Skipping listing: {}", e);
                outcome.failures.push(ListingFailure {
                    page,
                    url: link.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome.links = links;
    Ok(outcome)
}

async fn fetch_listing<F: PageFetcher + ?Sized>(
    fetcher: &F,
    rules: &ExtractionRules,
    link: &str,
) -> Result<ListingRecord, HarvestError> {
    let url = Url::parse(link)?;
    let body = fetcher.fetch(&url).await?;
    extract_html(&body, link, rules)
}
