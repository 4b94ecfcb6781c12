//! HTML extraction for index and detail documents
//!
//! This module contains the pure parsing side of the scraper:
//! - The injectable extraction ruleset
//! - Listing-card and pagination parsing on index pages
//! - Record extraction from detail pages

mod detail;
mod index;
pub mod rules;

pub use detail::{extract, extract_html};
pub use index::{listing_links, page_count};
pub use rules::{AttributeField, ExtractionRules, RulesConfig};

use scraper::ElementRef;

/// Text content of an element, trimmed once at both ends
///
/// Descendant text nodes are concatenated as they appear, so inline markup
/// such as `cm<sup>3</sup>` keeps the document's own spacing.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
