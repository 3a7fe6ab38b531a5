use crate::config::types::CrawlConfig;
use crate::ConfigError;
use std::str::FromStr;

/// Language presets for the EPFL education section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguagePreset {
    French,
    English,
}

impl LanguagePreset {
    pub fn seeds(&self) -> &'static [&'static str] {
        match self {
            Self::French => &["https://www.epfl.ch/education/fr/"],
            Self::English => &["https://www.epfl.ch/education/"],
        }
    }

    pub fn allow_paths(&self) -> &'static [&'static str] {
        match self {
            Self::French => &["/education/fr"],
            Self::English => &["/education/"],
        }
    }
}

impl FromStr for LanguagePreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Self::French),
            "en" => Ok(Self::English),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Fills seeds and allow-paths the configuration leaves empty
///
/// Explicit values always win over the preset.
pub fn apply_preset(config: &mut CrawlConfig, preset: LanguagePreset) {
    if config.crawl.seeds.is_empty() {
        config.crawl.seeds = preset.seeds().iter().map(|s| s.to_string()).collect();
    }
    if config.crawl.allow_paths.is_empty() {
        config.crawl.allow_paths = preset.allow_paths().iter().map(|s| s.to_string()).collect();
    }
}
