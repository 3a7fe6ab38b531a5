use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Extensions never worth fetching for a text corpus (binary and media formats)
pub const DEFAULT_BLOCKED_EXTENSIONS: &[&str] = &[
    ".pdf", ".zip", ".tar", ".gz", ".bz2", ".xz", ".7z", ".rar", ".png", ".jpg", ".jpeg",
    ".gif", ".webp", ".svg", ".mp4", ".mp3", ".wav", ".avi", ".mov", ".mkv", ".woff",
    ".woff2", ".ttf", ".otf",
];

/// Main configuration structure for Section-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    pub output: OutputConfig,
}

/// What to crawl and how much of it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlSettings {
    /// Start URLs used when no frontier checkpoint exists
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Path prefixes a URL must start with to be in scope
    #[serde(default)]
    pub allow_paths: Vec<String>,

    /// Hosts must equal this domain or be a subdomain of it
    #[serde(default = "default_target_domain")]
    pub target_domain: String,

    /// Label copied onto every emitted record
    #[serde(default = "default_section")]
    pub section: String,

    /// Stop after this many records have been emitted
    #[serde(default = "default_max_pages")]
    pub max_pages: u64,

    /// Frontier checkpoint and progress report every N emitted records
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: u64,

    /// Bodies larger than this are reported without text
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,

    /// Path extensions (with leading dot) that are never in scope
    #[serde(default = "default_blocked_extensions")]
    pub blocked_extensions: Vec<String>,

    /// Optional language preset filling empty seeds / allow-paths
    #[serde(default)]
    pub preset: Option<String>,
}

/// Politeness and retry behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolitenessConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Target request rate (requests per second, process-wide)
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// Maximum number of attempts per URL
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff in seconds
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Upper bound of the uniform jitter added to every sleep, in seconds
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    #[serde(default = "default_true")]
    pub obey_robots: bool,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// JSONL file receiving one record per extracted page
    pub records_path: PathBuf,

    /// Directory receiving one plain-text mirror per page
    #[serde(default)]
    pub mirror_dir: Option<PathBuf>,

    /// Directory holding the visited log and the frontier checkpoint
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            rate: default_rate(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            backoff_base: default_backoff_base(),
            jitter: default_jitter(),
            obey_robots: true,
        }
    }
}

impl PolitenessConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::MAX)
    }
}

impl OutputConfig {
    /// Path of the append-only visited log
    pub fn visited_file(&self) -> PathBuf {
        self.state_dir.join("visited_urls.txt")
    }

    /// Path of the frontier checkpoint
    pub fn frontier_file(&self) -> PathBuf {
        self.state_dir.join("frontier.txt")
    }

    /// Creates every directory the crawl writes into
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(mirror_dir) = &self.mirror_dir {
            std::fs::create_dir_all(mirror_dir)?;
        }
        if let Some(parent) = self.records_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&self.state_dir)
    }
}

fn default_target_domain() -> String {
    "epfl.ch".to_string()
}

fn default_section() -> String {
    "education".to_string()
}

fn default_max_pages() -> u64 {
    5000
}

fn default_checkpoint_interval() -> u64 {
    100
}

fn default_max_content_bytes() -> usize {
    5_000_000
}

fn default_blocked_extensions() -> Vec<String> {
    DEFAULT_BLOCKED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_user_agent() -> String {
    "EPFL-RAG-Crawler/0.1 (+contact@example.com)".to_string()
}

fn default_rate() -> f64 {
    1.0
}

fn default_timeout() -> f64 {
    20.0
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base() -> f64 {
    1.0
}

fn default_jitter() -> f64 {
    0.2
}

fn default_true() -> bool {
    true
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".crawler_state")
}
