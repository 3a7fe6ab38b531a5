use crate::config::CrawlConfig;
use crate::url::domain::{extract_host, is_under_domain};
use url::Url;

/// Decides whether a URL may be crawled
///
/// Three independent checks must all pass:
/// 1. the host is the target domain or a subdomain of it
/// 2. the path does not end in a blocked extension
/// 3. the path starts with one of the allowed prefixes
///
/// Unparseable URLs are never in scope.
pub fn is_in_scope(url: &str, config: &CrawlConfig) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let in_domain = extract_host(&parsed)
        .is_some_and(|host| is_under_domain(&host, &config.crawl.target_domain));

    in_domain
        && !has_blocked_extension(&parsed, &config.crawl.blocked_extensions)
        && is_allowed_path(&parsed, &config.crawl.allow_paths)
}

/// Checks the extension of the last path segment against the blocklist
pub fn has_blocked_extension(url: &Url, blocked: &[String]) -> bool {
    let last_segment = url.path().rsplit('/').next().unwrap_or("");
    let Some(dot) = last_segment.rfind('.') else {
        return false;
    };
    let ext = last_segment[dot..].to_ascii_lowercase();
    blocked.iter().any(|b| b.eq_ignore_ascii_case(&ext))
}

/// Checks the path against the allowed prefixes
///
/// Prefixes without a leading `/` get one; empty prefixes are ignored.
pub fn is_allowed_path(url: &Url, allow_paths: &[String]) -> bool {
    let path = url.path();
    allow_paths
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .any(|prefix| {
            if prefix.starts_with('/') {
                path.starts_with(prefix)
            } else {
                path.strip_prefix('/')
                    .is_some_and(|rest| rest.starts_with(prefix))
            }
        })
}

/// True for `text/html` and any other HTML flavored type such as `application/xhtml+xml`
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => {
            let ct = ct.trim().to_ascii_lowercase();
            ct.starts_with("text/html") || ct.contains("html")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn config() -> CrawlConfig {
        parse_config(
            r#"
[crawl]
seeds = ["https://example.org/education/fr/"]
allow-paths = ["/education/fr", "research"]
target-domain = "example.org"

[output]
records-path = "out.jsonl"
"#,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_in_scope() {
        let config = config();
        assert!(is_in_scope("https://example.org/education/fr/programs", &config));
        assert!(is_in_scope("https://www.example.org/education/fr", &config));
        assert!(is_in_scope("https://example.org/research/labs", &config));
    }

    #[test]
    fn test_other_domain_out_of_scope() {
        let config = config();
        assert!(!is_in_scope("https://example.com/education/fr", &config));
        assert!(!is_in_scope("https://notexample.org/education/fr", &config));
    }

    #[test]
    fn test_disallowed_path_out_of_scope() {
        let config = config();
        assert!(!is_in_scope("https://example.org/about", &config));
        assert!(!is_in_scope("https://example.org/", &config));
    }

    #[test]
    fn test_blocked_extension_always_out_of_scope() {
        let config = config();
        for ext in ["pdf", "PDF", "zip", "jpg", "mp4", "woff2"] {
            let url = format!("https://example.org/education/fr/file.{}", ext);
            assert!(!is_in_scope(&url, &config), "{} should be blocked", url);
        }
    }

    #[test]
    fn test_dot_in_directory_is_not_an_extension() {
        let config = config();
        assert!(is_in_scope("https://example.org/education/fr/v1.pdf/index", &config));
        assert!(is_in_scope("https://example.org/education/fr/page.html", &config));
    }

    #[test]
    fn test_unparseable_out_of_scope() {
        assert!(!is_in_scope("not a url", &config()));
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type(Some("text/html")));
        assert!(is_html_content_type(Some("text/html; charset=utf-8")));
        assert!(is_html_content_type(Some("application/xhtml+xml")));
        assert!(is_html_content_type(Some("TEXT/HTML")));
        assert!(!is_html_content_type(Some("application/pdf")));
        assert!(!is_html_content_type(Some("text/plain")));
        assert!(!is_html_content_type(None));
    }
}
