//! Configuration module for Auto-Harvest
//!
//! This module handles loading, parsing, and validating run configuration.
//! Values come from built-in defaults, an optional TOML file, and command
//! line overrides, in that order.
//!
//! # Example
//!
//! ```no_run
//! use auto_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will scrape {} pages", config.crawler.pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig};

// Re-export parser functions
pub use parser::{load_config, resolve_config, ConfigOverrides};
pub use validation::validate;
