//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of the orchestrator (seeding, running, draining, stopped)
//! - `PageOutcome`: how each dequeued URL was disposed of

mod crawl_state;
mod page_outcome;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_outcome::PageOutcome;
