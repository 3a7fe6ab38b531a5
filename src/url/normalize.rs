use crate::{UrlError, UrlResult};
use url::Url;

/// Canonicalizes a URL into the dedup key used by the frontier and visited store
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed, not HTTP(S), or host-less
/// 2. Lowercase scheme and host (done by the parser for HTTP(S))
/// 3. Collapse repeated path separators
/// 4. Remove a trailing slash (except for the root path)
/// 5. Remove the fragment
/// 6. Sort query parameters by key (stable for equal keys)
/// 7. Remove an empty query string
///
/// # Examples
///
/// ```
/// use section_harvest::url::canonicalize;
///
/// let a = canonicalize("https://EXAMPLE.org/a//b/?z=1&a=2#top").unwrap();
/// let b = canonicalize("https://example.org/a/b?a=2&z=1").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a, "https://example.org/a/b?a=2&z=1");
/// ```
pub fn canonicalize(raw: &str) -> UrlResult<String> {
    canonicalize_url(raw).map(String::from)
}

/// Same as [`canonicalize`] but keeps the parsed form
pub fn canonicalize_url(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let path = normalize_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = sorted_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Collapses repeated separators and drops the trailing slash except for the root
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Query parameters sorted by key; `sort_by` is stable so equal keys keep their order
fn sorted_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}
