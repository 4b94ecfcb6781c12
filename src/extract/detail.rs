//! Detail extractor
//!
//! Turns a parsed detail page into a `ListingRecord`. Missing attributes are
//! recorded as `None`; only a missing description container is an error,
//! because the description is what the downstream classifier trains on.

use super::{element_text, ExtractionRules};
use crate::record::ListingRecord;
use crate::HarvestError;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements that start a new line in the description text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "section", "article", "blockquote", "tr", "h1", "h2", "h3",
    "h4", "h5", "h6",
];

/// Extracts a listing record from a parsed detail document
///
/// # Arguments
///
/// * `document` - The parsed detail page
/// * `url` - The detail page URL, stored verbatim as the record identity
/// * `rules` - The extraction ruleset
///
/// # Returns
///
/// * `Ok(ListingRecord)` - Possibly partial record
/// * `Err(HarvestError::MalformedDocument)` - The description container is absent
pub fn extract(
    document: &Html,
    url: &str,
    rules: &ExtractionRules,
) -> Result<ListingRecord, HarvestError> {
    let description = document
        .select(&rules.description)
        .next()
        .map(description_text)
        .ok_or_else(|| HarvestError::MalformedDocument {
            url: url.to_string(),
            reason: "description container missing".to_string(),
        })?;

    let mut record = ListingRecord::new(url, description);

    for (field, marker) in &rules.attributes {
        *field.slot(&mut record) = attribute_value(document, marker, &rules.attribute_value);
    }

    record.title = first_text(document, &rules.title);
    record.price = first_text(document, &rules.price);
    record.price_net_info = first_text(document, &rules.price_net_info);
    record.location = first_text(document, &rules.location);
    record.posted_date = first_text(document, &rules.posted_date);
    record.equipment = document
        .select(&rules.equipment_container)
        .next()
        .map(|container| {
            container
                .select(&rules.equipment_item)
                .map(element_text)
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(record)
}

/// Parses `html` and extracts a record from it
///
/// The parsed document never outlives this call, so callers on async tasks
/// can use it between await points.
pub fn extract_html(
    html: &str,
    url: &str,
    rules: &ExtractionRules,
) -> Result<ListingRecord, HarvestError> {
    let document = Html::parse_document(html);
    extract(&document, url, rules)
}

/// Reads the value node nested inside the first element matching `marker`
fn attribute_value(document: &Html, marker: &Selector, value: &Selector) -> Option<String> {
    document
        .select(marker)
        .next()
        .and_then(|container| container.select(value).next())
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Description text with `<br>` and block elements turned into line breaks
///
/// Source whitespace is collapsed; empty lines are dropped.
fn description_text(container: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_block_text(container, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_block_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(el) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_TAGS.contains(&el.name());
                if is_block {
                    out.push('\n');
                }
                collect_block_text(child_element, out);
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
