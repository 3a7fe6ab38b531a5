//! Deterministic fallback extraction
//!
//! Title from `<title>`; text from headings, paragraphs and list items under the
//! first `<main>` or `<article>` (or the whole document), skipping anything inside
//! script, style, noscript, header, footer, nav or form. Never infers a language.

use crate::extract::readability::collapse_whitespace;
use scraper::{ElementRef, Html, Node};

const REMOVED_TAGS: &[&str] = &["script", "style", "noscript", "header", "footer", "nav", "form"];

const TEXT_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "li"];

/// Returns `(text, title)`
pub fn fallback_extract(document: &Html) -> (Option<String>, Option<String>) {
    let title = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "title")
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let root = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "main" | "article") && !is_removed(*el))
        .unwrap_or_else(|| document.root_element());

    let chunks: Vec<String> = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| TEXT_TAGS.contains(&el.value().name()))
        .filter(|el| !is_removed(*el))
        .map(spaced_text)
        .filter(|text| !text.is_empty())
        .collect();

    let text = if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n\n"))
    };

    (text, title)
}

/// True if the element sits inside (or is) a removed tag
fn is_removed(el: ElementRef<'_>) -> bool {
    REMOVED_TAGS.contains(&el.value().name())
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| REMOVED_TAGS.contains(&a.value().name()))
}

/// Text nodes joined by single spaces, skipping removed descendants
fn spaced_text(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_parts(el, &mut parts);
    collapse_whitespace(&parts.join(" "))
}

fn collect_parts(el: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(element) if !REMOVED_TAGS.contains(&element.name()) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_parts(child_el, parts);
                }
            }
            _ => {}
        }
    }
}
