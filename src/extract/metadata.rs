//! Page title and declared language

use crate::extract::readability::collapse_whitespace;
use scraper::{Html, Selector};

/// Title from `og:title`, then `<title>`, then the first `<h1>`
pub fn extract_title(document: &Html) -> Option<String> {
    meta_by(document, "property", "og:title")
        .or_else(|| first_text(document, "title"))
        .or_else(|| first_text(document, "h1"))
}

/// Declared language as a lowercase primary subtag (`fr-CH` → `fr`)
///
/// Looks at `<html lang>`, then `Content-Language` / `language` meta tags, then `og:locale`.
pub fn extract_language(document: &Html) -> Option<String> {
    let html_lang = Selector::parse("html[lang]").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(str::to_string)
    });

    html_lang
        .and_then(|l| primary_subtag(&l))
        .or_else(|| meta_by(document, "http-equiv", "content-language").and_then(|l| primary_subtag(&l)))
        .or_else(|| meta_by(document, "name", "language").and_then(|l| primary_subtag(&l)))
        .or_else(|| meta_by(document, "property", "og:locale").and_then(|l| primary_subtag(&l)))
}

/// Reduces a language tag to its primary subtag; `None` unless 2-3 ASCII letters
pub fn primary_subtag(tag: &str) -> Option<String> {
    let first = tag
        .trim()
        .split([',', ';'])
        .next()?
        .split(['-', '_'])
        .next()?
        .trim();

    if (2..=3).contains(&first.len()) && first.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(first.to_ascii_lowercase())
    } else {
        None
    }
}

/// Content of the first `<meta>` whose `attr` equals `value`, ignoring ASCII case
fn meta_by(document: &Html, attr: &str, value: &str) -> Option<String> {
    let selector = Selector::parse("meta[content]").ok()?;
    document
        .select(&selector)
        .filter(|el| {
            el.value()
                .attr(attr)
                .map_or(false, |v| v.trim().eq_ignore_ascii_case(value))
        })
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|content| !content.is_empty())
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}
