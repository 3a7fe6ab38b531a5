//! Link discovery
//!
//! Pulls anchor targets out of an HTML page and keeps the canonical, in-scope ones.

use crate::config::CrawlConfig;
use crate::url::normalize::canonicalize;
use crate::url::scope::is_in_scope;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the canonical, in-scope anchor targets of an HTML page
///
/// # Link Extraction Rules
///
/// - Only `<a href="...">` targets are considered
/// - `javascript:`, `mailto:` and `tel:` hrefs are skipped before resolution
/// - Relative hrefs are resolved against `base_url` (the page's final URL)
/// - Results are canonicalized, filtered through [`is_in_scope`] and deduplicated,
///   keeping first-seen document order
///
/// # Example
///
/// ```no_run
/// use section_harvest::config::load_config;
/// use section_harvest::url::extract_links;
/// use url::Url;
/// use std::path::Path;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// let base = Url::parse("https://www.epfl.ch/education/fr/").unwrap();
/// let links = extract_links(r#"<a href="programs">Programs</a>"#, &base, &config);
/// ```
pub fn extract_links(html: &str, base_url: &Url, config: &CrawlConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    anchor_targets(html, base_url)
        .into_iter()
        .filter(|link| is_in_scope(link, config))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// All canonicalized anchor targets of a page, in document order, unfiltered
pub fn anchor_targets(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to a canonical absolute URL
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - javascript:, mailto:, tel: schemes
/// - hrefs that do not resolve to a valid HTTP(S) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    canonicalize(absolute.as_str()).ok()
}
