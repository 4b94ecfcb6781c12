//! Index page parsing: listing-card links and the pagination bar

use super::{element_text, ExtractionRules};
use crate::HarvestError;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Collects the detail URL of every listing card, in document order
///
/// Relative hrefs are resolved against `page_url`. Cards without an anchor,
/// non-HTTP(S) targets and repeats of an already collected URL are skipped.
pub fn listing_links(document: &Html, page_url: &Url, rules: &ExtractionRules) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for card in document.select(&rules.listing_card) {
        let Some(href) = card
            .select(&rules.listing_link)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
        else {
            tracing::trace!("Listing card without a link on {}", page_url);
            continue;
        };

        match page_url.join(href.trim()) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            Ok(url) => tracing::debug!("Skipping non-HTTP listing link {}", url),
            Err(e) => tracing::debug!("Skipping unparsable listing link {:?}: {}", href, e),
        }
    }

    links
}

/// Reads the total page count from the last pagination control
///
/// # Returns
///
/// * `Ok(n)` - The label of the last page control, `n >= 1`
/// * `Err(HarvestError::PaginationUnavailable)` - No control, or a non-numeric label
pub fn page_count(document: &Html, rules: &ExtractionRules) -> Result<u32, HarvestError> {
    let last = document.select(&rules.pagination_item).last().ok_or_else(|| {
        HarvestError::PaginationUnavailable("no pagination control found".to_string())
    })?;

    let label = element_text(last);
    label
        .parse::<u32>()
        .ok()
        .filter(|pages| *pages >= 1)
        .ok_or_else(|| {
            HarvestError::PaginationUnavailable(format!(
                "last page control label {:?} is not a page number",
                label
            ))
        })
}
