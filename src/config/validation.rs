use crate::config::types::{CrawlConfig, CrawlSettings, OutputConfig, PolitenessConfig};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_crawl_settings(&config.crawl)?;
    validate_politeness(&config.politeness)?;
    validate_output(&config.output)?;
    Ok(())
}

fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    validate_domain_string(&settings.target_domain)?;

    if settings.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required (set seeds or a preset)".to_string(),
        ));
    }

    for seed in &settings.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use HTTP or HTTPS",
                seed
            )));
        }
    }

    if settings.allow_paths.iter().all(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "at least one non-empty allow-path is required".to_string(),
        ));
    }

    if settings.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    if settings.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(
            "checkpoint-interval must be >= 1".to_string(),
        ));
    }

    if settings.max_content_bytes < 1 {
        return Err(ConfigError::Validation(
            "max-content-bytes must be >= 1".to_string(),
        ));
    }

    if let Some(ext) = settings
        .blocked_extensions
        .iter()
        .find(|ext| !ext.starts_with('.') || ext.len() < 2)
    {
        return Err(ConfigError::Validation(format!(
            "blocked extension '{}' must look like '.ext'",
            ext
        )));
    }

    Ok(())
}

fn validate_politeness(politeness: &PolitenessConfig) -> Result<(), ConfigError> {
    if politeness.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if !(politeness.rate.is_finite() && politeness.rate > 0.0) {
        return Err(ConfigError::Validation(format!(
            "rate must be a positive number of requests per second, got {}",
            politeness.rate
        )));
    }

    validate_seconds("timeout", politeness.timeout)?;
    if politeness.timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout must be > 0 seconds, got {}",
            politeness.timeout
        )));
    }

    if politeness.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max-retries must be >= 1".to_string(),
        ));
    }

    validate_seconds("backoff-base", politeness.backoff_base)?;
    validate_seconds("jitter", politeness.jitter)?;

    Ok(())
}

/// Rejects second counts that are negative, NaN or too large for a `Duration`
fn validate_seconds(name: &str, secs: f64) -> Result<(), ConfigError> {
    Duration::try_from_secs_f64(secs).map(|_| ()).map_err(|_| {
        ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds within range, got {}",
            name, secs
        ))
    })
}

fn validate_output(output: &OutputConfig) -> Result<(), ConfigError> {
    if output.records_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "records-path cannot be empty".to_string(),
        ));
    }

    if output.state_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "state-dir cannot be empty".to_string(),
        ));
    }

    if matches!(&output.mirror_dir, Some(dir) if dir.as_os_str().is_empty()) {
        return Err(ConfigError::Validation(
            "mirror-dir cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the target domain
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidDomain(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidDomain(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.org')",
            domain
        )));
    }

    Ok(())
}
