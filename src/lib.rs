//! Auto-Harvest: a resumable vehicle-listing scraper
//!
//! This crate crawls the paginated index of an automotive marketplace, fetches
//! every listing's detail page, extracts a structured record from it and
//! persists one CSV partition per index page. A partition that already exists
//! is never fetched again, so rerunning a crawl only retries missing pages.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for Auto-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Target unreachable at {url}: {reason}")]
    TargetUnreachable { url: String, reason: String },

    #[error("Pagination unavailable: {0}")]
    PaginationUnavailable(String),

    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Malformed document at {url}: {reason}")]
    MalformedDocument { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page task failed to complete: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

impl HarvestError {
    /// Returns the URL a fetch or extraction error refers to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::TargetUnreachable { url, .. }
            | Self::FetchFailed { url, .. }
            | Self::MalformedDocument { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in rules: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Auto-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlPlan, CrawlReport};
pub use extract::ExtractionRules;
pub use output::PartitionWriter;
pub use record::ListingRecord;
pub use state::CrawlPhase;
