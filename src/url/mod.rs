//! URL handling module for Section-Harvest
//!
//! This module provides URL canonicalization (the dedup key used everywhere),
//! crawl scope decisions, and link discovery.

mod domain;
mod links;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::{extract_host, is_under_domain};
pub use links::{anchor_targets, extract_links};
pub use normalize::{canonicalize, canonicalize_url};
pub use scope::{has_blocked_extension, is_allowed_path, is_html_content_type, is_in_scope};
