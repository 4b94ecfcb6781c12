use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Run parameters supplied on the command line
///
/// Every `Some` value replaces the corresponding file (or default) value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub pages: Option<u32>,
    pub start_page: Option<u32>,
    pub max_concurrency: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Applies the overrides to `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.crawler.base_url = url.clone();
        }
        if let Some(pages) = self.pages {
            config.crawler.pages = pages;
        }
        if let Some(start_page) = self.start_page {
            config.crawler.start_page = start_page;
        }
        if let Some(max_concurrency) = self.max_concurrency {
            config.crawler.max_concurrency = max_concurrency;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.to_string_lossy().into_owned();
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.crawler.request_timeout_secs = timeout;
        }
    }
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use auto_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Pages: {}", config.crawler.pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Resolves the effective configuration for a run
///
/// Starts from the file at `path` (or the built-in defaults when `None`),
/// applies `overrides`, then validates the result. Nothing touches the
/// network before this succeeds.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => Config::default(),
    };
    overrides.apply(&mut config);
    validate(&config)?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
