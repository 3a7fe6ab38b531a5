//! Crawl statistics
//!
//! `CrawlStats` is the live counter set owned by the orchestrator; it is logged at
//! every checkpoint and returned when the crawl stops. `CorpusStatistics` is read
//! back from the files on disk for `--stats`.

use crate::config::CrawlConfig;
use crate::output::PageRecord;
use crate::state::PageOutcome;
use crate::storage::{FrontierCheckpoint, FrontierStore};
use crate::HarvestError;
use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader};
use std::time::{Duration, Instant};

/// Live counters for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Pages that produced a record
    pub processed: u64,

    /// Count of each disposition
    pub outcomes: HashMap<PageOutcome, u64>,

    started: Instant,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            processed: 0,
            outcomes: HashMap::new(),
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: PageOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        if outcome.is_success() {
            self.processed += 1;
        }
    }

    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// URLs marked visited without producing a record
    pub fn skipped(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_skip())
            .map(|(_, count)| *count)
            .sum()
    }

    /// Non-zero outcome counts in declaration order
    pub fn breakdown(&self) -> Vec<(PageOutcome, u64)> {
        PageOutcome::all()
            .into_iter()
            .map(|outcome| (outcome, self.count(outcome)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Processed pages per second since the run started
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }

    /// Emits the progress event
    pub fn log_progress(&self, frontier_len: usize) {
        tracing::info!(
            processed = self.processed,
            skipped = self.skipped(),
            rate = format!("{:.2}", self.rate()),
            frontier = frontier_len,
            "Crawl progress"
        );
    }
}

/// Summary of the corpus and crawl state on disk
#[derive(Debug, Clone, Default)]
pub struct CorpusStatistics {
    /// Records in the JSONL file
    pub total_records: u64,

    /// Distinct text checksums among the records
    pub distinct_checksums: u64,

    /// Lines that failed to parse as records
    pub malformed_lines: u64,

    /// Records per language (`"unknown"` when absent)
    pub records_by_lang: HashMap<String, u64>,

    /// Total extracted text size in bytes
    pub total_text_bytes: u64,

    /// Entries in the visited log
    pub visited_urls: u64,

    /// Entries in the frontier checkpoint
    pub frontier_urls: u64,
}

/// Loads statistics from the configured output and state files
///
/// Missing files count as empty.
pub fn load_statistics(config: &CrawlConfig) -> Result<CorpusStatistics, HarvestError> {
    let mut stats = CorpusStatistics::default();

    match std::fs::File::open(&config.output.records_path) {
        Ok(file) => {
            let mut checksums = HashSet::new();
            for line in BufReader::new(file).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<PageRecord>(&line) {
                    Ok(record) => {
                        stats.total_records += 1;
                        stats.total_text_bytes += record.text.len() as u64;
                        checksums.insert(record.checksum);
                        let lang = record.lang.unwrap_or_else(|| "unknown".to_string());
                        *stats.records_by_lang.entry(lang).or_insert(0) += 1;
                    }
                    Err(_) => stats.malformed_lines += 1,
                }
            }
            stats.distinct_checksums = checksums.len() as u64;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    match std::fs::read_to_string(config.output.visited_file()) {
        Ok(content) => {
            let distinct: HashSet<&str> = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();
            stats.visited_urls = distinct.len() as u64;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let frontier = FrontierStore::new(&config.output.frontier_file());
    stats.frontier_urls = frontier.load()?.len() as u64;

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics ===\n");

    println!("Records:");
    println!("  Total records: {}", stats.total_records);
    println!("  Distinct texts: {}", stats.distinct_checksums);
    println!("  Text size: {} bytes", stats.total_text_bytes);
    if stats.malformed_lines > 0 {
        println!("  Malformed lines: {}", stats.malformed_lines);
    }
    println!();

    if !stats.records_by_lang.is_empty() {
        println!("Records by Language:");
        let mut langs: Vec<_> = stats.records_by_lang.iter().collect();
        langs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (lang, count) in langs {
            let percentage = if stats.total_records > 0 {
                (*count as f64 / stats.total_records as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", lang, count, percentage);
        }
        println!();
    }

    println!("Crawl State:");
    println!("  Visited URLs: {}", stats.visited_urls);
    println!("  Pending in checkpoint: {}", stats.frontier_urls);
}
