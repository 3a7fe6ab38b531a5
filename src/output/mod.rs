//! Output module for the extracted corpus
//!
//! This module handles:
//! - The `PageRecord` line format
//! - Appending records to the JSONL file and mirroring text by URL hash
//! - Live crawl counters and on-disk corpus statistics

mod record;
mod sink;
pub mod stats;
mod traits;

pub use record::{sha256_hex, PageRecord};
pub use sink::{mirror_file_name, write_mirror, JsonlSink};
pub use stats::{load_statistics, print_statistics, CorpusStatistics, CrawlStats};
pub use traits::{OutputError, OutputResult, RecordSink};
