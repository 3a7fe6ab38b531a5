//! Configuration module for Section-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration is validated once at startup and never mutated afterwards.
//!
//! # Example
//!
//! ```no_run
//! use section_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling at most {} pages", config.crawl.max_pages);
//! ```

mod parser;
mod presets;
mod types;
mod validation;

// Re-export types
pub use presets::{apply_preset, LanguagePreset};
pub use types::{
    CrawlConfig, CrawlSettings, OutputConfig, PolitenessConfig, DEFAULT_BLOCKED_EXTENSIONS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_preset, parse_config};
