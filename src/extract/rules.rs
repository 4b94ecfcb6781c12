//! Extraction ruleset
//!
//! The marketplace markup contract lives here and nowhere else: every
//! semantic field maps to a CSS selector strategy. `RulesConfig` is the
//! serializable form (it can be overridden from the `[rules]` section of the
//! configuration file); `ExtractionRules` is the compiled form handed to the
//! extractors.

use crate::record::ListingRecord;
use crate::ConfigError;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute fields located by a per-field marker plus a nested value node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeField {
    Brand,
    Model,
    Color,
    SeatCount,
    Year,
    FuelType,
    EngineCapacity,
    EnginePower,
    BodyType,
    GearboxType,
    Mileage,
    Condition,
    AccidentFree,
    CountryOfOrigin,
}

impl AttributeField {
    pub const ALL: [AttributeField; 14] = [
        Self::Brand,
        Self::Model,
        Self::Color,
        Self::SeatCount,
        Self::Year,
        Self::FuelType,
        Self::EngineCapacity,
        Self::EnginePower,
        Self::BodyType,
        Self::GearboxType,
        Self::Mileage,
        Self::Condition,
        Self::AccidentFree,
        Self::CountryOfOrigin,
    ];

    /// Key used for this field under `[rules.attributes]`
    pub fn key(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Color => "color",
            Self::SeatCount => "seat-count",
            Self::Year => "year",
            Self::FuelType => "fuel-type",
            Self::EngineCapacity => "engine-capacity",
            Self::EnginePower => "engine-power",
            Self::BodyType => "body-type",
            Self::GearboxType => "gearbox-type",
            Self::Mileage => "mileage",
            Self::Condition => "condition",
            Self::AccidentFree => "accident-free",
            Self::CountryOfOrigin => "country-of-origin",
        }
    }

    /// Looks a field up by its config key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }

    /// Marker selector used by the built-in otomoto ruleset
    pub fn default_marker(&self) -> &'static str {
        match self {
            Self::Brand => r#"[data-testid="make"]"#,
            Self::Model => r#"[data-testid="model"]"#,
            Self::Color => r#"[data-testid="color"]"#,
            Self::SeatCount => r#"[data-testid="nr_seats"]"#,
            Self::Year => r#"[data-testid="year"]"#,
            Self::FuelType => r#"[data-testid="fuel_type"]"#,
            Self::EngineCapacity => r#"[data-testid="engine_capacity"]"#,
            Self::EnginePower => r#"[data-testid="engine_power"]"#,
            Self::BodyType => r#"[data-testid="body_type"]"#,
            Self::GearboxType => r#"[data-testid="gearbox"]"#,
            Self::Mileage => r#"[data-testid="mileage"]"#,
            Self::Condition => r#"[data-testid="new_used"]"#,
            Self::AccidentFree => r#"[data-testid="no_accident"]"#,
            Self::CountryOfOrigin => r#"[data-testid="country_origin"]"#,
        }
    }

    /// The record slot this attribute is written to
    pub fn slot<'a>(&self, record: &'a mut ListingRecord) -> &'a mut Option<String> {
        match self {
            Self::Brand => &mut record.brand,
            Self::Model => &mut record.model,
            Self::Color => &mut record.color,
            Self::SeatCount => &mut record.seat_count,
            Self::Year => &mut record.year,
            Self::FuelType => &mut record.fuel_type,
            Self::EngineCapacity => &mut record.engine_capacity,
            Self::EnginePower => &mut record.engine_power,
            Self::BodyType => &mut record.body_type,
            Self::GearboxType => &mut record.gearbox_type,
            Self::Mileage => &mut record.mileage,
            Self::Condition => &mut record.condition,
            Self::AccidentFree => &mut record.accident_free,
            Self::CountryOfOrigin => &mut record.country_of_origin,
        }
    }
}

/// Serializable ruleset, as written in the `[rules]` config section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RulesConfig {
    /// Repeated listing-card heading on index pages
    pub listing_card: String,

    /// Anchor inside a card heading that carries the detail URL
    pub listing_link: String,

    /// Page-number controls of the pagination bar (last = highest)
    pub pagination_item: String,

    /// Value node nested inside an attribute marker
    pub attribute_value: String,

    /// Per-attribute marker overrides; unlisted fields keep their default
    pub attributes: BTreeMap<String, String>,

    pub title: String,
    pub price: String,
    pub price_net_info: String,
    pub location: String,
    pub posted_date: String,
    pub equipment_container: String,
    pub equipment_item: String,
    pub description: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            listing_card: "article h2".to_string(),
            listing_link: "a[href]".to_string(),
            pagination_item: r#"li[data-testid="pagination-list-item"]"#.to_string(),
            attribute_value: "p:nth-of-type(2)".to_string(),
            attributes: BTreeMap::new(),
            title: "h1.offer-title".to_string(),
            price: "h3.offer-price__number".to_string(),
            price_net_info: "p.offer-price__net-info".to_string(),
            location: r#"[data-testid="ad-location"]"#.to_string(),
            posted_date: r#"[data-testid="ad-posted-date"]"#.to_string(),
            equipment_container: r#"[data-testid="content-equipments-section"]"#.to_string(),
            equipment_item: "li".to_string(),
            description: r#"[data-testid="content-description-section"]"#.to_string(),
        }
    }
}

impl RulesConfig {
    /// Marker selector for `field`, falling back to the built-in one
    pub fn marker(&self, field: AttributeField) -> &str {
        self.attributes
            .get(field.key())
            .map(String::as_str)
            .unwrap_or_else(|| field.default_marker())
    }
}

/// Compiled ruleset used by the extractors
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub listing_card: Selector,
    pub listing_link: Selector,
    pub pagination_item: Selector,
    pub attribute_value: Selector,
    pub attributes: Vec<(AttributeField, Selector)>,
    pub title: Selector,
    pub price: Selector,
    pub price_net_info: Selector,
    pub location: Selector,
    pub posted_date: Selector,
    pub equipment_container: Selector,
    pub equipment_item: Selector,
    pub description: Selector,
}

impl ExtractionRules {
    /// Compiles every selector of `config`
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractionRules)` - All selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that failed
    /// * `Err(ConfigError::Validation)` - An attribute override names no known field
    pub fn compile(config: &RulesConfig) -> Result<Self, ConfigError> {
        if let Some(unknown) = config
            .attributes
            .keys()
            .find(|key| AttributeField::from_key(key).is_none())
        {
            return Err(ConfigError::Validation(format!(
                "unknown attribute field '{}' in [rules.attributes]",
                unknown
            )));
        }

        let attributes = AttributeField::ALL
            .iter()
            .map(|field| Ok((*field, parse_selector(config.marker(*field))?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            listing_card: parse_selector(&config.listing_card)?,
            listing_link: parse_selector(&config.listing_link)?,
            pagination_item: parse_selector(&config.pagination_item)?,
            attribute_value: parse_selector(&config.attribute_value)?,
            attributes,
            title: parse_selector(&config.title)?,
            price: parse_selector(&config.price)?,
            price_net_info: parse_selector(&config.price_net_info)?,
            location: parse_selector(&config.location)?,
            posted_date: parse_selector(&config.posted_date)?,
            equipment_container: parse_selector(&config.equipment_container)?,
            equipment_item: parse_selector(&config.equipment_item)?,
            description: parse_selector(&config.description)?,
        })
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self::compile(&RulesConfig::default()).expect("built-in selectors are valid")
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
