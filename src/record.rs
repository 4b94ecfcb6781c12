//! The scraped listing record
//!
//! A `ListingRecord` is built once per detail page and never mutated after it
//! has been handed to the partition writer. All values are the trimmed text
//! found in the document; numeric normalization is left to whoever consumes
//! the partitions.

use serde::{Deserialize, Serialize};

/// One scraped vehicle listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub seat_count: Option<String>,
    pub year: Option<String>,
    pub fuel_type: Option<String>,
    pub engine_capacity: Option<String>,
    pub engine_power: Option<String>,
    pub body_type: Option<String>,
    pub gearbox_type: Option<String>,
    pub mileage: Option<String>,
    pub condition: Option<String>,
    pub accident_free: Option<String>,
    pub country_of_origin: Option<String>,
    pub title: Option<String>,

    /// Raw price text, e.g. "129 900 PLN"
    pub price: Option<String>,
    pub price_net_info: Option<String>,
    pub location: Option<String>,

    /// Equipment entries in document order
    pub equipment: Vec<String>,
    pub posted_date: Option<String>,

    /// Listing description with block separators turned into line breaks
    pub description: String,

    /// Detail page URL; identifies the record
    pub url: String,
}

impl ListingRecord {
    /// Creates a record carrying only its identity and description
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}
