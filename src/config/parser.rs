use crate::config::presets::{apply_preset, LanguagePreset};
use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// A `preset` named in the file is applied before validation.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use section_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max pages: {}", config.crawl.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    load_config_with_preset(path, None)
}

/// Loads a configuration, applying `preset` (or the file's own preset) before validation
///
/// A preset given here takes precedence over the one named in the file.
pub fn load_config_with_preset(
    path: &Path,
    preset: Option<LanguagePreset>,
) -> Result<CrawlConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, preset)
}

/// Parses configuration text, applies presets and validates the result
pub fn parse_config(
    content: &str,
    preset: Option<LanguagePreset>,
) -> Result<CrawlConfig, ConfigError> {
    let mut config: CrawlConfig = toml::from_str(content)?;

    let preset = match preset {
        Some(p) => Some(p),
        None => config
            .crawl
            .preset
            .as_deref()
            .map(str::parse::<LanguagePreset>)
            .transpose()?,
    };
    if let Some(preset) = preset {
        apply_preset(&mut config, preset);
    }

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs over the same state directory can be compared.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
