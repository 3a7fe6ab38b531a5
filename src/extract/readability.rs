//! Readability-style main content extraction
//!
//! Paragraph-like elements are scored by length and comma count; scores flow to
//! their parent (full) and grandparent (half). The best candidate, penalized by
//! its link density, becomes the content root. Its non-boilerplate blocks are
//! joined with blank lines.

use scraper::{ElementRef, Html, Node};

/// Below this many characters the primary path gives up and the fallback runs
pub const MIN_TEXT_CHARS: usize = 200;

/// Paragraphs shorter than this do not contribute to scoring
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Blocks whose text is mostly anchors are treated as link lists
const MAX_BLOCK_LINK_DENSITY: f64 = 0.5;

const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "svg",
    "button", "template", "select", "object",
];

const BOILERPLATE_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "complementary", "search"];

/// Class or id tokens that mark page chrome rather than content
const BOILERPLATE_TOKENS: &[&str] = &[
    "nav", "navbar", "navigation", "menu", "footer", "header", "sidebar", "breadcrumb",
    "breadcrumbs", "cookie", "cookies", "banner", "ad", "ads", "advert", "advertisement", "social",
    "share", "sharing", "comment", "comments", "related", "promo", "popup", "modal", "skip",
];

const SCORED_TAGS: &[&str] = &["p", "pre", "td", "blockquote"];

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "pre", "blockquote", "td", "dt", "dd",
    "figcaption",
];

/// Extracts the main text of a parsed document, or `None` if nothing substantial is found
pub fn extract_main_text(document: &Html) -> Option<String> {
    let root = best_candidate(document)?;

    let blocks: Vec<String> = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| BLOCK_TAGS.contains(&el.value().name()))
        .filter(|el| !nested_in_block(*el, root))
        .filter(|el| !in_boilerplate(*el))
        .filter(|el| link_density(*el) <= MAX_BLOCK_LINK_DENSITY)
        .map(visible_text)
        .filter(|text| !text.is_empty())
        .collect();

    let text = blocks.join("\n\n");
    if text.chars().count() >= MIN_TEXT_CHARS {
        Some(text)
    } else {
        None
    }
}

/// Picks the element with the highest link-penalized score
///
/// Candidates are kept in discovery order so that ties resolve to the first one.
fn best_candidate(document: &Html) -> Option<ElementRef<'_>> {
    let mut candidates: Vec<(ElementRef<'_>, f64)> = Vec::new();

    let paragraphs = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| SCORED_TAGS.contains(&el.value().name()));

    for paragraph in paragraphs {
        if in_boilerplate(paragraph) {
            continue;
        }

        let text = visible_text(paragraph);
        let len = text.chars().count();
        if len < MIN_PARAGRAPH_CHARS {
            continue;
        }

        let commas = text.matches(',').count() as f64;
        let score = 1.0 + commas + ((len / 100) as f64).min(3.0);

        if let Some(parent) = parent_element(paragraph) {
            add_score(&mut candidates, parent, score);
            if let Some(grandparent) = parent_element(parent) {
                add_score(&mut candidates, grandparent, score / 2.0);
            }
        }
    }

    let mut best: Option<(ElementRef<'_>, f64)> = None;
    for (el, score) in candidates {
        let adjusted = score * (1.0 - link_density(el));
        if best.map_or(true, |(_, top)| adjusted > top) {
            best = Some((el, adjusted));
        }
    }

    best.map(|(el, _)| el)
}

fn add_score<'a>(candidates: &mut Vec<(ElementRef<'a>, f64)>, el: ElementRef<'a>, score: f64) {
    match candidates.iter_mut().find(|(candidate, _)| *candidate == el) {
        Some((_, total)) => *total += score,
        None => candidates.push((el, score)),
    }
}

fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// True if an enclosing block (up to and including `root`) will already emit this text
fn nested_in_block(el: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    if el == root {
        return false;
    }
    for ancestor in el.ancestors().filter_map(ElementRef::wrap) {
        if BLOCK_TAGS.contains(&ancestor.value().name()) {
            return true;
        }
        if ancestor == root {
            break;
        }
    }
    false
}

/// True if the element itself looks like page chrome
pub(crate) fn is_boilerplate(el: ElementRef<'_>) -> bool {
    let element = el.value();

    if BOILERPLATE_TAGS.contains(&element.name()) {
        return true;
    }

    if element.attr("hidden").is_some() || element.attr("aria-hidden") == Some("true") {
        return true;
    }

    if let Some(role) = element.attr("role") {
        if BOILERPLATE_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }

    let class_tokens = element.attr("class").unwrap_or("");
    let id_tokens = element.attr("id").unwrap_or("");
    class_tokens
        .split_whitespace()
        .chain(id_tokens.split_whitespace())
        .flat_map(|token| token.split(['-', '_']))
        .any(|part| BOILERPLATE_TOKENS.contains(&part.to_ascii_lowercase().as_str()))
}

/// True if the element or any ancestor is boilerplate
fn in_boilerplate(el: ElementRef<'_>) -> bool {
    is_boilerplate(el) || el.ancestors().filter_map(ElementRef::wrap).any(is_boilerplate)
}

/// Share of an element's visible text that sits inside anchors
fn link_density(el: ElementRef<'_>) -> f64 {
    let total = visible_text(el).chars().count();
    if total == 0 {
        return 0.0;
    }

    let linked: usize = el
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "a")
        .map(|anchor| visible_text(anchor).chars().count())
        .sum();

    (linked as f64 / total as f64).min(1.0)
}

/// Text of the element with boilerplate children skipped and whitespace collapsed
pub(crate) fn visible_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if element.name() == "br" => out.push(' '),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !is_boilerplate(child_el) {
                        collect_text(child_el, out);
                    }
                }
            }
            _ => {}
        }
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
