//! Content extraction
//!
//! HTML in, `(text, title, language)` out. The readability path runs first; when
//! it finds nothing substantial the deterministic fallback takes over. Both are
//! pure functions of the input.

mod fallback;
mod metadata;
mod readability;

pub use fallback::fallback_extract;
pub use metadata::{extract_language, extract_title, primary_subtag};
pub use readability::{extract_main_text, MIN_TEXT_CHARS};

use scraper::Html;

/// Result of extracting a page; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
}

/// Extracts text, title and declared language from an HTML document
///
/// `url` is only used for diagnostics.
pub fn extract(html: &str, url: &str) -> Extracted {
    let document = Html::parse_document(html);
    let language = extract_language(&document);

    if let Some(text) = extract_main_text(&document) {
        return Extracted {
            text: Some(text),
            title: extract_title(&document),
            language,
        };
    }

    tracing::debug!("Primary extraction found no content for {}, using fallback", url);
    let (text, title) = fallback_extract(&document);
    Extracted {
        text,
        title,
        language,
    }
}
