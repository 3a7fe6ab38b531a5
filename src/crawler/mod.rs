//! Crawler module for fetching and processing pages
//!
//! This module contains the core crawling logic, including:
//! - Process-wide request pacing and retry backoff
//! - HTTP fetching behind the robots.txt gate
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod pacer;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchClient, FetchOutcome, FetchResult};
pub(crate) use fetcher::read_capped_body;
pub use pacer::{sleep_or_cancel, Pacer, RetryPolicy};
