use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One extracted page, serialized as a single JSON line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// The URL that was requested (canonical form)
    pub url: String,

    /// Final URL after redirects, only when it differs from `url`
    pub canonical_url: Option<String>,

    pub fetched_at: DateTime<Utc>,

    pub status_code: u16,

    pub content_type: Option<String>,

    pub title: Option<String>,

    /// Primary language subtag, when declared by the page
    pub lang: Option<String>,

    pub text: String,

    /// SHA-256 of `text`, lowercase hex
    pub checksum: String,

    pub section: String,
}

impl PageRecord {
    /// Builds a record for freshly extracted text and computes its checksum
    ///
    /// `fetched_at` is the time the response arrived, not the time of extraction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: &str,
        final_url: &str,
        status_code: u16,
        fetched_at: DateTime<Utc>,
        content_type: Option<String>,
        title: Option<String>,
        lang: Option<String>,
        text: String,
        section: &str,
    ) -> Self {
        let canonical_url = (final_url != url).then(|| final_url.to_string());
        let checksum = sha256_hex(&text);
        Self {
            url: url.to_string(),
            canonical_url,
            fetched_at,
            status_code,
            content_type,
            title,
            lang,
            text,
            checksum,
            section: section.to_string(),
        }
    }

    /// URL the content was actually served from
    pub fn source_url(&self) -> &str {
        self.canonical_url.as_deref().unwrap_or(&self.url)
    }
}

/// Lowercase hex SHA-256 of a UTF-8 string
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
