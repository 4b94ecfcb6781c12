use crate::extract::RulesConfig;
use serde::Deserialize;

/// Main configuration structure for Auto-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

/// Crawl target and worker pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listing index URL; page `n` is fetched as `<base-url>?page=n`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of index pages to scrape
    pub pages: u32,

    /// First index page to scrape
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Upper bound on concurrently running page tasks
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.otomoto.pl/dostawcze".to_string(),
            pages: 50,
            start_page: 1,
            max_concurrency: 50,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding one partition file per page
    pub directory: String,

    /// Partition file name prefix (`<prefix>_007.csv`)
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "data/pages".to_string(),
            file_prefix: "page".to_string(),
        }
    }
}
