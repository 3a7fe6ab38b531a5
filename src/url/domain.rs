use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use section_harvest::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.org:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.org".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks if a host is the target domain or one of its subdomains
///
/// Both arguments are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use section_harvest::url::is_under_domain;
///
/// assert!(is_under_domain("epfl.ch", "epfl.ch"));
/// assert!(is_under_domain("www.epfl.ch", "epfl.ch"));
/// assert!(!is_under_domain("notepfl.ch", "epfl.ch"));
/// ```
pub fn is_under_domain(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.trim_start_matches("*.").to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    host == domain || host.ends_with(&format!(".{}", domain))
}
